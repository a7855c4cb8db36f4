use crate::error::{BeanError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Tag segment after which the topic name follows (`.../anki/<topic>/...`).
pub const DEFAULT_TOPIC_MARKER: &str = "anki";
/// Topic for notes whose tag names no segment after the marker.
pub const MISC_TOPIC: &str = "misc";

pub const INITIAL_EFACTOR: f64 = 2.5;
pub const MIN_EFACTOR: f64 = 1.3;
pub const MAX_QUALITY: u8 = 5;

/// A note as exposed by the note corpus. Read-only from bean's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub tag: String,
    pub key: String,
    pub title: String,
    pub text: String,
}

impl Note {
    pub fn new(
        tag: impl Into<String>,
        key: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            key: key.into(),
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of(self.text.as_bytes())
    }
}

/// topic -> note key -> note
pub type NotesByTopic = BTreeMap<String, BTreeMap<String, Note>>;

/// Derives the topic a tag belongs to.
///
/// The topic is the segment right after the first segment equal to `marker`.
/// A tag with no such segment (no marker, marker last, or an empty segment
/// after it) falls back to [`MISC_TOPIC`].
pub fn topic_for_tag(tag: &str, marker: &str) -> String {
    let mut segments = tag.split('/');
    if segments.by_ref().any(|segment| segment == marker) {
        if let Some(next) = segments.next() {
            if !next.is_empty() {
                return next.to_string();
            }
        }
    }
    MISC_TOPIC.to_string()
}

/// Whether `marker` is one of the tag's `/`-separated segments. Notes whose
/// tags fail this are not part of the corpus.
pub fn has_marker(tag: &str, marker: &str) -> bool {
    tag.split('/').any(|segment| segment == marker)
}

/// Groups notes by the topic derived from their tag. A note reached twice
/// through the same topic is kept once.
pub fn group_notes<I>(notes: I, marker: &str) -> NotesByTopic
where
    I: IntoIterator<Item = Note>,
{
    let mut grouped = NotesByTopic::new();
    for note in notes {
        let topic = topic_for_tag(&note.tag, marker);
        grouped
            .entry(topic)
            .or_default()
            .insert(note.key.clone(), note);
    }
    grouped
}

pub fn validate_topic(topic: &str) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(BeanError::invalid("topic cannot be empty"));
    }
    if topic.starts_with('.') {
        return Err(BeanError::invalid(format!(
            "topic {:?} cannot start with '.'",
            topic
        )));
    }
    if topic
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(BeanError::invalid(format!(
            "topic {:?} contains a path separator or control character",
            topic
        )));
    }
    Ok(())
}

pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(BeanError::invalid("card key cannot be empty"));
    }
    if key.chars().any(char::is_control) {
        return Err(BeanError::invalid(format!(
            "card key {:?} contains a control character",
            key
        )));
    }
    Ok(())
}

/// Self-reported recall grade: 0 is a blackout, 5 a perfect recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_QUALITY {
            return Err(BeanError::invalid(format!(
                "quality must be between 0 and {}, got {}",
                MAX_QUALITY, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Quality {
    type Error = BeanError;

    fn try_from(value: i64) -> Result<Self> {
        let value = u8::try_from(value).map_err(|_| {
            BeanError::invalid(format!(
                "quality must be between 0 and {}, got {}",
                MAX_QUALITY, value
            ))
        })?;
        Quality::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// MD5 digest of a note's text, persisted as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&encoded, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// Spaced-repetition state of one note within one topic.
///
/// `(topic, key)` is the identity; the topic is the bucket the card lives in
/// and is not repeated in the record. Every field is required on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Card {
    pub key: String,
    /// Consecutive successful recalls, reset on a poor grade.
    pub attempt: u32,
    /// Last submitted grade.
    pub quality: u8,
    /// Ease factor, never below [`MIN_EFACTOR`].
    pub efactor: f64,
    pub days_interval: u32,
    pub next_rehearsal: DateTime<Utc>,
    /// Digest of the note text this card was last synchronized against.
    pub content_hash: ContentHash,
}

impl Card {
    /// A fresh card for `note`, due immediately.
    pub fn for_note(note: &Note, now: DateTime<Utc>) -> Self {
        Self {
            key: note.key.clone(),
            attempt: 0,
            quality: 0,
            efactor: INITIAL_EFACTOR,
            days_interval: 0,
            next_rehearsal: now,
            content_hash: note.content_hash(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_rehearsal <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_follows_marker_segment() {
        assert_eq!(topic_for_tag("learning/anki/rust", "anki"), "rust");
        assert_eq!(topic_for_tag("anki/rust/lifetimes", "anki"), "rust");
        assert_eq!(topic_for_tag("a/b/anki/go/c", "anki"), "go");
    }

    #[test]
    fn marker_at_end_falls_back_to_misc() {
        assert_eq!(topic_for_tag("learning/anki", "anki"), MISC_TOPIC);
        assert_eq!(topic_for_tag("anki", "anki"), MISC_TOPIC);
        assert_eq!(topic_for_tag("learning/anki/", "anki"), MISC_TOPIC);
    }

    #[test]
    fn missing_marker_falls_back_to_misc() {
        assert_eq!(topic_for_tag("learning/rust", "anki"), MISC_TOPIC);
        assert_eq!(topic_for_tag("", "anki"), MISC_TOPIC);
        // partial segment matches do not count
        assert_eq!(topic_for_tag("ankify/rust", "anki"), MISC_TOPIC);
    }

    #[test]
    fn custom_marker() {
        assert_eq!(topic_for_tag("srs/math", "srs"), "math");
    }

    #[test]
    fn marker_must_be_a_whole_segment() {
        assert!(has_marker("learning/anki/rust", "anki"));
        assert!(has_marker("anki", "anki"));
        assert!(!has_marker("ankify/rust", "anki"));
        assert!(!has_marker("ANKI/rust", "anki"));
        assert!(!has_marker("journal", "anki"));
    }

    #[test]
    fn group_notes_by_topic_and_key() {
        let notes = vec![
            Note::new("anki/rust", "k1", "Ownership", "text"),
            Note::new("anki/rust/borrowing", "k1", "Ownership", "text"),
            Note::new("anki/go", "k2", "Channels", "text"),
            Note::new("anki", "k3", "Loose", "text"),
        ];
        let grouped = group_notes(notes, "anki");

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped["rust"].len(), 1);
        assert!(grouped["go"].contains_key("k2"));
        assert!(grouped[MISC_TOPIC].contains_key("k3"));
    }

    #[test]
    fn quality_range_is_enforced() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(5).is_ok());
        assert!(Quality::new(6).is_err());
        assert!(Quality::try_from(-1).is_err());
        assert_eq!(Quality::try_from(4).unwrap().value(), 4);
    }

    #[test]
    fn topic_validation() {
        assert!(validate_topic("rust").is_ok());
        assert!(validate_topic("data science").is_ok());
        assert!(validate_topic("").is_err());
        assert!(validate_topic("..").is_err());
        assert!(validate_topic("a/b").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("7D3E-11AA").is_ok());
    }

    #[test]
    fn new_card_matches_creation_rule() {
        let now = Utc::now();
        let note = Note::new("anki/rust", "k1", "Title", "body");
        let card = Card::for_note(&note, now);

        assert_eq!(card.key, "k1");
        assert_eq!(card.attempt, 0);
        assert_eq!(card.efactor, INITIAL_EFACTOR);
        assert_eq!(card.next_rehearsal, now);
        assert_eq!(card.content_hash, ContentHash::of(b"body"));
        assert!(card.is_due(now));
    }

    #[test]
    fn card_json_is_strict() {
        let card = Card::for_note(&Note::new("t", "k", "T", "x"), Utc::now());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(
            json["content_hash"],
            serde_json::json!("9dd4e461268c8034f5c8564e155c67a6")
        );

        let mut missing = json.clone();
        missing.as_object_mut().unwrap().remove("efactor");
        assert!(serde_json::from_value::<Card>(missing).is_err());

        let mut extra = json;
        extra["legacy"] = serde_json::json!(1);
        assert!(serde_json::from_value::<Card>(extra).is_err());
    }
}
