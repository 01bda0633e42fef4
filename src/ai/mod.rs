pub mod context;
pub mod emotion;
pub mod pipeline;
pub mod prompts;

pub use context::{ConversationHistory, HistorySnapshot, Role, Turn};
pub use emotion::{parse_reply, CharacterState, Emotion, ParseAnomaly, ParsedReply};
pub use pipeline::TurnPipeline;
