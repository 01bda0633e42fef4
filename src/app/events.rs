//! Messages drained by the UI loop.

use crate::ai::emotion::ParsedReply;
use crate::llm::LlmError;

#[derive(Debug)]
pub enum UiEvent {
    /// A typed line, already trimmed and non-empty.
    UserInput(String),
    /// `/mic`: run one listen-transcribe cycle.
    MicRequested,
    /// Result of a listen; empty when nothing was recognized.
    Transcribed(String),
    TurnCompleted(ParsedReply),
    TurnFailed(LlmError),
    /// `/chat`: show or hide the transcript.
    ToggleChat,
    /// `/quit` or end of input.
    Quit,
}

/// Map one line of terminal input to an event. Blank lines map to nothing.
pub fn parse_input(line: &str) -> Option<UiEvent> {
    let line = line.trim();
    match line {
        "" => None,
        "/mic" => Some(UiEvent::MicRequested),
        "/chat" => Some(UiEvent::ToggleChat),
        "/quit" | "/exit" => Some(UiEvent::Quit),
        text => Some(UiEvent::UserInput(text.to_string())),
    }
}
