use crate::llm::openai::Message;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation. Fields are private so a turn cannot
/// change after it is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Preallocation ceiling; larger windows grow on demand.
const PREALLOCATED_TURNS: usize = 64;

/// Rolling window of the most recent turns.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl ConversationHistory {
    pub fn new(max_turns: usize) -> Self {
        let max_turns = max_turns.max(1);
        Self {
            turns: VecDeque::with_capacity(max_turns.min(PREALLOCATED_TURNS)),
            max_turns,
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            if let Some(evicted) = self.turns.pop_front() {
                tracing::debug!(
                    role = %evicted.role,
                    created_at = %evicted.created_at,
                    "evicted oldest turn"
                );
            }
        }
    }

    /// Oldest-first copy of the retained turns.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            turns: self.turns.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}

/// Context handed to the model for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    turns: Vec<Turn>,
}

impl HistorySnapshot {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Transcript with one speaker label per turn, e.g. `User: hi`.
    /// Multi-line turns keep their line breaks.
    pub fn to_transcript(&self, character_name: &str) -> String {
        self.turns
            .iter()
            .map(|t| match t.role {
                Role::User => format!("User: {}", t.content),
                Role::Assistant => format!("{}: {}", character_name, t.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One chat message per turn.
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns
            .iter()
            .map(|t| Message::text(t.role.as_str(), t.content.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_last_twenty_of_twenty_five() {
        let mut history = ConversationHistory::new(20);
        for i in 0..25 {
            history.append(Turn::user(format!("turn {}", i)));
        }
        let snapshot = history.snapshot();
        assert_eq!(snapshot.turns().len(), 20);
        let contents: Vec<&str> = snapshot.turns().iter().map(|t| t.content()).collect();
        let expected: Vec<String> = (5..25).map(|i| format!("turn {}", i)).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn eviction_never_splits_multiline_turns() {
        let mut history = ConversationHistory::new(2);
        history.append(Turn::user("first"));
        history.append(Turn::assistant("line a\nline b\nline c"));
        history.append(Turn::user("third"));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.turns()[0].content(), "line a\nline b\nline c");
        assert_eq!(snapshot.turns()[1].content(), "third");
    }

    #[test]
    fn transcript_labels_speakers() {
        let mut history = ConversationHistory::new(20);
        history.append(Turn::user("hello"));
        history.append(Turn::assistant("hi there"));
        assert_eq!(
            history.snapshot().to_transcript("Vai"),
            "User: hello\nVai: hi there"
        );
    }

    #[test]
    fn messages_carry_roles() {
        let mut history = ConversationHistory::new(20);
        history.append(Turn::user("hello"));
        history.append(Turn::assistant("hi"));
        let messages = history.snapshot().to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].content, "hi");
    }

    #[test]
    fn zero_cap_is_clamped_to_one() {
        let mut history = ConversationHistory::new(0);
        history.append(Turn::user("a"));
        history.append(Turn::user("b"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.max_turns(), 1);
    }

    #[test]
    fn huge_cap_does_not_preallocate() {
        let mut history = ConversationHistory::new(usize::MAX / 2);
        history.append(Turn::user("a"));
        history.append(Turn::assistant("b"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.max_turns(), usize::MAX / 2);
    }

    #[test]
    fn turns_are_stamped_in_order() {
        let first = Turn::user("a");
        let second = Turn::assistant("b");
        assert!(first.created_at() <= second.created_at());
        assert!(second.created_at() <= Utc::now());
    }

    #[test]
    fn snapshot_is_detached_from_buffer() {
        let mut history = ConversationHistory::new(5);
        history.append(Turn::user("a"));
        let snapshot = history.snapshot();
        history.append(Turn::user("b"));
        assert_eq!(snapshot.turns().len(), 1);
        assert_eq!(history.len(), 2);
    }

    proptest! {
        #[test]
        fn retains_most_recent(cap in 1usize..30, count in 0usize..80) {
            let mut history = ConversationHistory::new(cap);
            for i in 0..count {
                history.append(Turn::user(i.to_string()));
            }
            let snapshot = history.snapshot();
            prop_assert_eq!(snapshot.turns().len(), count.min(cap));
            let first = count.saturating_sub(cap);
            for (offset, turn) in snapshot.turns().iter().enumerate() {
                prop_assert_eq!(turn.content(), (first + offset).to_string());
            }
        }
    }
}
