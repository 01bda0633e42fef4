//! Emotion set and reply-tag parsing.
//!
//! Replies from the model are expected to end with a single bracketed
//! marker such as `[happy]`. Parsing runs in two phases: `locate_marker`
//! finds the first `[...]` pair, then `parse_reply` validates the token
//! against the closed `Emotion` set and strips the marker from the text.
//! A bad or missing marker never fails the turn; it degrades to `neutral`
//! and is reported as a `ParseAnomaly` for logging.

use crate::assets::AssetHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Emotion ────────────────────────────────────────────────

/// The six expressions the character can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Thinking,
    Confused,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Thinking,
        Emotion::Confused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Thinking => "thinking",
            Emotion::Confused => "confused",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEmotion(pub String);

impl fmt::Display for UnknownEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown emotion: {:?}", self.0)
    }
}

impl std::error::Error for UnknownEmotion {}

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    /// Exact, case-sensitive match against the six names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

// ── Parsed Reply ───────────────────────────────────────────

/// Why a reply fell back to `neutral`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAnomaly {
    /// No `[` ... `]` pair in the reply.
    MissingTag,
    /// A marker was present but named something outside the emotion set.
    UnknownEmotion(String),
}

impl fmt::Display for ParseAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAnomaly::MissingTag => write!(f, "reply has no emotion marker"),
            ParseAnomaly::UnknownEmotion(tag) => {
                write!(f, "reply marker [{}] is not an emotion", tag)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Text to show and speak, marker removed.
    pub text: String,
    pub emotion: Emotion,
    pub anomaly: Option<ParseAnomaly>,
}

/// Byte span of the first bracket pair in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    /// Index of `[`.
    open: usize,
    /// Index of the first `]` after `open`.
    close: usize,
}

impl Marker {
    fn token<'a>(&self, raw: &'a str) -> &'a str {
        &raw[self.open + 1..self.close]
    }
}

fn locate_marker(raw: &str) -> Option<Marker> {
    let open = raw.find('[')?;
    let close = open + 1 + raw[open + 1..].find(']')?;
    Some(Marker { open, close })
}

/// Split a raw model reply into display text and emotion.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(marker) = locate_marker(raw) else {
        return ParsedReply {
            text: raw.to_string(),
            emotion: Emotion::Neutral,
            anomaly: Some(ParseAnomaly::MissingTag),
        };
    };

    let token = marker.token(raw);
    let text = raw[..marker.open].trim_end().to_string();

    match token.parse::<Emotion>() {
        Ok(emotion) => ParsedReply {
            text,
            emotion,
            anomaly: None,
        },
        Err(UnknownEmotion(tag)) => ParsedReply {
            text,
            emotion: Emotion::Neutral,
            anomaly: Some(ParseAnomaly::UnknownEmotion(tag)),
        },
    }
}

// ── Character State ────────────────────────────────────────

/// What the character is currently showing. Owned by the UI loop.
#[derive(Debug, Clone, Default)]
pub struct CharacterState {
    emotion: Emotion,
    asset: Option<AssetHandle>,
}

impl CharacterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn asset(&self) -> Option<&AssetHandle> {
        self.asset.as_ref()
    }

    pub fn set_emotion(&mut self, emotion: Emotion) {
        self.emotion = emotion;
    }

    /// Swap artwork. `None` keeps whatever is on screen.
    pub fn set_asset(&mut self, asset: Option<AssetHandle>) -> bool {
        match asset {
            Some(asset) => {
                self.asset = Some(asset);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trailing_tag_is_split_off() {
        let parsed = parse_reply("I am so excited to meet you! [happy]");
        assert_eq!(parsed.text, "I am so excited to meet you!");
        assert_eq!(parsed.emotion, Emotion::Happy);
        assert_eq!(parsed.anomaly, None);
    }

    #[test]
    fn reply_without_brackets_is_unchanged() {
        let parsed = parse_reply("Hmm, let me think about that.");
        assert_eq!(parsed.text, "Hmm, let me think about that.");
        assert_eq!(parsed.emotion, Emotion::Neutral);
        assert_eq!(parsed.anomaly, Some(ParseAnomaly::MissingTag));
    }

    #[test]
    fn unknown_tag_falls_back_to_neutral_and_is_stripped() {
        let parsed = parse_reply("That's strange. [zzz]");
        assert_eq!(parsed.text, "That's strange.");
        assert_eq!(parsed.emotion, Emotion::Neutral);
        assert_eq!(
            parsed.anomaly,
            Some(ParseAnomaly::UnknownEmotion("zzz".to_string()))
        );
    }

    #[test]
    fn only_first_pair_counts() {
        let parsed = parse_reply("Well [sad] actually [happy]");
        assert_eq!(parsed.text, "Well");
        assert_eq!(parsed.emotion, Emotion::Sad);
    }

    #[test]
    fn tag_only_reply_has_empty_text() {
        let parsed = parse_reply("[thinking]");
        assert_eq!(parsed.text, "");
        assert_eq!(parsed.emotion, Emotion::Thinking);
    }

    #[test]
    fn unclosed_bracket_is_treated_as_missing() {
        let parsed = parse_reply("Look at this [happy");
        assert_eq!(parsed.text, "Look at this [happy");
        assert_eq!(parsed.emotion, Emotion::Neutral);
        assert_eq!(parsed.anomaly, Some(ParseAnomaly::MissingTag));
    }

    #[test]
    fn close_before_open_is_ignored() {
        let parsed = parse_reply("a] b [angry]");
        assert_eq!(parsed.text, "a] b");
        assert_eq!(parsed.emotion, Emotion::Angry);
    }

    #[test]
    fn nested_brackets_use_first_close() {
        let parsed = parse_reply("Odd [[happy]]");
        assert_eq!(parsed.text, "Odd");
        assert_eq!(parsed.emotion, Emotion::Neutral);
        assert_eq!(
            parsed.anomaly,
            Some(ParseAnomaly::UnknownEmotion("[happy".to_string()))
        );
    }

    #[test]
    fn matching_is_case_sensitive() {
        let parsed = parse_reply("Hi! [Happy]");
        assert_eq!(parsed.emotion, Emotion::Neutral);
        assert_eq!(parsed.text, "Hi!");
    }

    #[test]
    fn multiline_text_before_tag_is_kept() {
        let parsed = parse_reply("Line one.\nLine two.\n[confused]");
        assert_eq!(parsed.text, "Line one.\nLine two.");
        assert_eq!(parsed.emotion, Emotion::Confused);
    }

    #[test]
    fn emotion_names_round_trip() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.to_string().parse::<Emotion>(), Ok(emotion));
        }
        assert!("excited".parse::<Emotion>().is_err());
    }

    #[test]
    fn emotion_serializes_lowercase() {
        let json = serde_json::to_string(&Emotion::Thinking).unwrap();
        assert_eq!(json, "\"thinking\"");
    }

    #[test]
    fn character_starts_neutral_and_keeps_asset_on_miss() {
        let mut state = CharacterState::new();
        assert_eq!(state.emotion(), Emotion::Neutral);
        assert!(state.asset().is_none());

        let handle = AssetHandle::new(Emotion::Happy, "happy/wave.gif".into());
        assert!(state.set_asset(Some(handle.clone())));
        assert!(!state.set_asset(None));
        assert_eq!(state.asset(), Some(&handle));
    }

    fn emotion_strategy() -> impl Strategy<Value = Emotion> {
        prop::sample::select(Emotion::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn well_formed_tag_round_trips(
            body in "[^\\[\\]]{0,80}",
            pad in "[ \t\n]{0,3}",
            emotion in emotion_strategy(),
        ) {
            let raw = format!("{}{}[{}]", body, pad, emotion);
            let parsed = parse_reply(&raw);
            prop_assert_eq!(parsed.emotion, emotion);
            prop_assert_eq!(parsed.text, body.trim_end().to_string());
            prop_assert!(parsed.anomaly.is_none());
        }

        #[test]
        fn bracketless_text_is_untouched(body in "[^\\[\\]]{0,80}") {
            let parsed = parse_reply(&body);
            prop_assert_eq!(parsed.emotion, Emotion::Neutral);
            prop_assert_eq!(parsed.text, body);
        }

        #[test]
        fn invalid_tag_is_neutral(body in "[^\\[\\]]{0,40}", tag in "[a-z]{1,10}") {
            prop_assume!(tag.parse::<Emotion>().is_err());
            let raw = format!("{} [{}]", body, tag);
            let parsed = parse_reply(&raw);
            prop_assert_eq!(parsed.emotion, Emotion::Neutral);
            prop_assert_eq!(parsed.text, body.trim_end().to_string());
        }
    }
}
