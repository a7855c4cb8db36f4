//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for every bean operation, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the appropriate command function
//! - **Owns the topic locks** shared by every operation
//! - **Stamps the clock**: commands take `now` explicitly, the facade passes `Utc::now()`
//!
//! `BeanApi<S: CardStore, N: NoteSource>` is generic over both adapters:
//! - Production: `BeanApi<FileCardStore, BearNoteSource>`
//! - Testing: `BeanApi<InMemoryCardStore, InMemoryNoteSource>`
//!
//! All methods take `&self`; a `BeanApi` can be shared across threads behind an `Arc`.

use crate::commands;
use crate::error::Result;
use crate::lock::TopicLocks;
use crate::notes::NoteSource;
use crate::store::CardStore;
use chrono::Utc;
use std::time::Duration;

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{BeanPaths, CmdMessage, CmdResult, MessageLevel, NextCard, ReviewItem};

pub struct BeanApi<S: CardStore, N: NoteSource> {
    store: S,
    notes: N,
    paths: BeanPaths,
    locks: TopicLocks,
}

impl<S: CardStore, N: NoteSource> BeanApi<S, N> {
    pub fn new(store: S, notes: N, paths: BeanPaths, lock_timeout: Duration) -> Self {
        Self {
            store,
            notes,
            paths,
            locks: TopicLocks::new(lock_timeout),
        }
    }

    /// Bring the card store in line with the note corpus.
    pub fn reconcile(&self) -> Result<CmdResult> {
        commands::sync::run(&self.store, &self.notes, &self.locks, Utc::now())
    }

    pub fn list_topics(&self) -> Result<CmdResult> {
        commands::topics::run(&self.store)
    }

    pub fn next_card(&self, topic: &str) -> Result<CmdResult> {
        commands::next::run(&self.store, &self.notes, &self.locks, topic, Utc::now())
    }

    /// Record a review grade (0..=5) for a card.
    pub fn reflect(&self, topic: &str, key: &str, quality: i64) -> Result<CmdResult> {
        commands::reflect::run(&self.store, &self.locks, topic, key, quality, Utc::now())
    }

    pub fn cards(&self, topic: &str) -> Result<CmdResult> {
        commands::cards::run(&self.store, &self.locks, topic, Utc::now())
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::Note;
    use crate::notes::memory::InMemoryNoteSource;
    use crate::store::memory::InMemoryCardStore;
    use std::sync::Arc;
    use std::thread;

    fn api(notes: Vec<Note>) -> BeanApi<InMemoryCardStore, InMemoryNoteSource> {
        BeanApi::new(
            InMemoryCardStore::new(),
            InMemoryNoteSource::with_notes(notes),
            BeanPaths::new(std::env::temp_dir().join("bean-api-tests")),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn reconcile_then_review_then_grade() {
        let api = api(vec![Note::new("anki/rust", "k1", "Ownership", "borrow")]);

        api.reconcile().unwrap();
        assert_eq!(api.list_topics().unwrap().topics, vec!["rust"]);

        let next = api.next_card("rust").unwrap().next.unwrap();
        let NextCard::Due(item) = next else {
            panic!("expected a due card");
        };
        assert_eq!(item.key, "k1");
        assert_eq!(item.content, "borrow");

        let graded = api.reflect("rust", "k1", 5).unwrap();
        assert_eq!(graded.affected_cards[0].days_interval, 1);
        assert_eq!(
            api.next_card("rust").unwrap().next,
            Some(NextCard::NothingDue)
        );
    }

    #[test]
    fn reflect_on_unknown_card_is_not_found() {
        let api = api(vec![]);
        let err = api.reflect("rust", "k1", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn concurrent_grading_of_one_card_applies_every_grade() {
        let api = Arc::new(api(vec![Note::new("anki/rust", "k1", "T", "x")]));
        api.reconcile().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let api = Arc::clone(&api);
                thread::spawn(move || api.reflect("rust", "k1", 4).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let card = api.store().get_card("rust", "k1").unwrap();
        assert_eq!(card.attempt, 8);
    }

    #[test]
    fn concurrent_operations_across_topics() {
        let notes: Vec<_> = ["rust", "go", "zig", "c"]
            .iter()
            .map(|t| Note::new(format!("anki/{}", t), format!("{}-1", t), "T", "x"))
            .collect();
        let api = Arc::new(api(notes));
        api.reconcile().unwrap();

        let handles: Vec<_> = ["rust", "go", "zig", "c"]
            .iter()
            .map(|topic| {
                let api = Arc::clone(&api);
                let topic = topic.to_string();
                thread::spawn(move || {
                    api.next_card(&topic).unwrap();
                    api.reflect(&topic, &format!("{}-1", topic), 5).unwrap();
                    api.reconcile().unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for topic in ["rust", "go", "zig", "c"] {
            let card = api.store().get_card(topic, &format!("{}-1", topic)).unwrap();
            assert_eq!(card.attempt, 1);
        }
    }
}
