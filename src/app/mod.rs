pub mod event_loop;
pub mod events;
pub mod presenter;

pub use event_loop::{spawn_stdin_reader, CompanionApp};
pub use events::{parse_input, UiEvent};
pub use presenter::{Presenter, TerminalPresenter};
