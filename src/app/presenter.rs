//! Presentation surface.
//!
//! The event loop is the only caller. `TerminalPresenter` prints to
//! stdout; logs go to stderr so the two never interleave in a pipe.

use crate::assets::{AssetHandle, AssetKind};
use std::collections::VecDeque;
use std::io::{self, Write};

/// Transcript lines kept while the chat is hidden; older ones are dropped.
pub const MAX_HELD_LINES: usize = 200;

pub trait Presenter {
    fn show_user(&mut self, text: &str);
    fn show_reply(&mut self, speaker: &str, text: &str);
    /// In-conversation error, e.g. a failed completion.
    fn show_error(&mut self, message: &str);
    /// Status line outside the transcript.
    fn show_notice(&mut self, message: &str);
    fn show_asset(&mut self, asset: &AssetHandle);
    fn set_chat_visible(&mut self, visible: bool);
}

/// Writes the conversation to a terminal (or any writer).
///
/// While the chat is hidden, up to `MAX_HELD_LINES` recent transcript
/// lines are held back and printed when it is shown again.
pub struct TerminalPresenter<W: Write> {
    out: W,
    chat_visible: bool,
    held: VecDeque<String>,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            chat_visible: true,
            held: VecDeque::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    fn transcript_line(&mut self, line: String) {
        if self.chat_visible {
            self.write_line(&line);
        } else {
            if self.held.len() == MAX_HELD_LINES {
                self.held.pop_front();
            }
            self.held.push_back(line);
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn show_user(&mut self, text: &str) {
        self.transcript_line(format!("You: {}", text));
    }

    fn show_reply(&mut self, speaker: &str, text: &str) {
        self.transcript_line(format!("{}: {}", speaker, text));
    }

    fn show_error(&mut self, message: &str) {
        self.transcript_line(format!("[error] {}", message));
    }

    fn show_notice(&mut self, message: &str) {
        self.write_line(&format!("* {}", message));
    }

    fn show_asset(&mut self, asset: &AssetHandle) {
        let kind = match asset.kind() {
            AssetKind::Static => "image",
            AssetKind::Animated => "animation",
        };
        self.write_line(&format!(
            "[{}] {} ({})",
            asset.category(),
            asset.path().display(),
            kind
        ));
    }

    fn set_chat_visible(&mut self, visible: bool) {
        self.chat_visible = visible;
        if visible {
            for line in std::mem::take(&mut self.held) {
                self.write_line(&line);
            }
        } else {
            self.write_line("* chat hidden (/chat to show)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::emotion::Emotion;
    use std::path::PathBuf;

    fn output(presenter: TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn transcript_uses_speaker_labels() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.show_user("hi");
        presenter.show_reply("Vai", "Hello!");
        assert_eq!(output(presenter), "You: hi\nVai: Hello!\n");
    }

    #[test]
    fn hidden_chat_holds_lines_until_shown() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.set_chat_visible(false);
        presenter.show_user("secret");
        presenter.show_notice("listening");
        presenter.set_chat_visible(true);
        assert_eq!(
            output(presenter),
            "* chat hidden (/chat to show)\n* listening\nYou: secret\n"
        );
    }

    #[test]
    fn hidden_chat_keeps_only_recent_lines() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.set_chat_visible(false);
        for i in 0..MAX_HELD_LINES + 50 {
            presenter.show_user(&i.to_string());
        }
        presenter.set_chat_visible(true);

        let out = output(presenter);
        let lines: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(lines.len(), MAX_HELD_LINES);
        assert_eq!(lines[0], "You: 50");
        assert_eq!(lines[MAX_HELD_LINES - 1], format!("You: {}", MAX_HELD_LINES + 49));
    }

    #[test]
    fn asset_line_names_category_and_kind() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.show_asset(&AssetHandle::new(
            Emotion::Happy,
            PathBuf::from("assets/happy/jump.gif"),
        ));
        assert_eq!(output(presenter), "[happy] assets/happy/jump.gif (animation)\n");
    }
}
