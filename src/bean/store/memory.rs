use super::{CardBatch, CardStore};
use crate::error::{BeanError, Result};
use crate::model::Card;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

type Buckets = BTreeMap<String, BTreeMap<String, Card>>;

/// In-memory card storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryCardStore {
    buckets: RwLock<Buckets>,
    failing_topics: RwLock<BTreeSet<String>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `topic` fail until cleared, for error-path tests.
    pub fn set_simulate_write_error(&self, topic: &str, simulate: bool) {
        let mut failing = self.failing_topics.write();
        if simulate {
            failing.insert(topic.to_string());
        } else {
            failing.remove(topic);
        }
    }

    fn check_writable(&self, topic: &str) -> Result<()> {
        if self.failing_topics.read().contains(topic) {
            return Err(BeanError::StoreUnavailable(format!(
                "simulated write error for topic {:?}",
                topic
            )));
        }
        Ok(())
    }
}

impl CardStore for InMemoryCardStore {
    fn topic_list(&self) -> Result<Vec<String>> {
        Ok(self.buckets.read().keys().cloned().collect())
    }

    fn cards_in_topic(&self, topic: &str) -> Result<Vec<Card>> {
        Ok(self
            .buckets
            .read()
            .get(topic)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get_card(&self, topic: &str, key: &str) -> Result<Card> {
        self.buckets
            .read()
            .get(topic)
            .and_then(|bucket| bucket.get(key))
            .cloned()
            .ok_or_else(|| BeanError::CardNotFound {
                topic: topic.to_string(),
                key: key.to_string(),
            })
    }

    fn put_card(&self, topic: &str, card: &Card) -> Result<()> {
        self.check_writable(topic)?;
        self.buckets
            .write()
            .entry(topic.to_string())
            .or_default()
            .insert(card.key.clone(), card.clone());
        Ok(())
    }

    fn delete_card(&self, topic: &str, key: &str) -> Result<()> {
        self.check_writable(topic)?;
        let mut buckets = self.buckets.write();
        let removed = buckets
            .get_mut(topic)
            .and_then(|bucket| bucket.remove(key))
            .is_some();
        if !removed {
            return Err(BeanError::CardNotFound {
                topic: topic.to_string(),
                key: key.to_string(),
            });
        }
        if buckets.get(topic).is_some_and(BTreeMap::is_empty) {
            buckets.remove(topic);
        }
        Ok(())
    }

    fn apply(&self, topic: &str, batch: &CardBatch) -> Result<()> {
        self.check_writable(topic)?;
        let mut buckets = self.buckets.write();
        let mut bucket = buckets.remove(topic).unwrap_or_default();
        for key in &batch.deletes {
            bucket.remove(key);
        }
        for card in &batch.puts {
            bucket.insert(card.key.clone(), card.clone());
        }
        if !bucket.is_empty() {
            buckets.insert(topic.to_string(), bucket);
        }
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::Note;
    use chrono::{DateTime, Duration, Utc};

    pub struct StoreFixture {
        pub store: InMemoryCardStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryCardStore::new(),
            }
        }

        /// A card for `key` in `topic`, due `days` from `now` (negative = overdue).
        pub fn with_card_due(self, topic: &str, key: &str, now: DateTime<Utc>, days: i64) -> Self {
            let note = Note::new(format!("anki/{}", topic), key, key, format!("text of {}", key));
            let mut card = Card::for_note(&note, now);
            card.next_rehearsal = now + Duration::days(days);
            self.store.put_card(topic, &card).unwrap();
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;
    use chrono::Utc;

    fn card(key: &str) -> Card {
        Card::for_note(&Note::new("anki/t", key, "Title", "text"), Utc::now())
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = InMemoryCardStore::new();
        let card = card("k1");
        store.put_card("rust", &card).unwrap();
        assert_eq!(store.get_card("rust", "k1").unwrap(), card);
    }

    #[test]
    fn topics_are_isolated() {
        let store = InMemoryCardStore::new();
        store.put_card("rust", &card("k1")).unwrap();
        store.put_card("go", &card("k2")).unwrap();

        assert_eq!(store.topic_list().unwrap(), vec!["go", "rust"]);
        assert!(store.get_card("go", "k1").unwrap_err().is_not_found());
        assert_eq!(store.cards_in_topic("rust").unwrap().len(), 1);
    }

    #[test]
    fn deleting_last_card_drops_topic() {
        let store = InMemoryCardStore::new();
        store.put_card("rust", &card("k1")).unwrap();
        store.delete_card("rust", "k1").unwrap();

        assert!(store.topic_list().unwrap().is_empty());
        assert!(store.delete_card("rust", "k1").unwrap_err().is_not_found());
    }

    #[test]
    fn unknown_topic_has_no_cards() {
        let store = InMemoryCardStore::new();
        assert!(store.cards_in_topic("nope").unwrap().is_empty());
    }

    #[test]
    fn apply_is_all_or_nothing_under_write_error() {
        let store = InMemoryCardStore::new();
        store.put_card("rust", &card("old")).unwrap();
        store.set_simulate_write_error("rust", true);

        let batch = CardBatch {
            puts: vec![card("new")],
            deletes: vec!["old".to_string()],
        };
        assert!(store.apply("rust", &batch).is_err());
        assert!(store.get_card("rust", "old").is_ok());

        store.set_simulate_write_error("rust", false);
        store.apply("rust", &batch).unwrap();
        assert!(store.get_card("rust", "old").is_err());
        assert!(store.get_card("rust", "new").is_ok());
    }
}
