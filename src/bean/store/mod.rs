//! # Card Storage
//!
//! The [`CardStore`] trait is bean's view of the persistent card database: a
//! mapping from topic to a bucket of cards keyed by note key. Business logic
//! only talks to the trait, so tests run against [`memory::InMemoryCardStore`]
//! and the binary against [`fs::FileCardStore`].
//!
//! ## Consistency
//!
//! Every method is safe to call from several threads at once. A read observes
//! a consistent snapshot of a bucket and a write is atomic per call: a reader
//! never sees a half-written card. [`CardStore::apply`] extends that to a whole
//! batch for one topic, which is what reconciliation relies on to leave a
//! topic either fully reconciled or untouched.
//!
//! ## Topics
//!
//! - Enumerating an unknown topic yields no cards rather than an error.
//! - A topic exists only while it holds at least one card; deleting the last
//!   card removes it from [`CardStore::topic_list`].
//!
//! ## Storage Layout
//!
//! For `FileCardStore`:
//! ```text
//! <data>/cards/
//! ├── .lock              # advisory process lock
//! ├── rust.json          # one versioned bucket per topic
//! └── misc.json
//! ```

use crate::error::Result;
use crate::model::Card;

pub mod fs;
pub mod memory;

/// Puts and deletes for a single topic, applied as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardBatch {
    pub puts: Vec<Card>,
    pub deletes: Vec<String>,
}

impl CardBatch {
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }
}

/// Abstract interface for card persistence.
pub trait CardStore: Send + Sync {
    /// Every topic currently holding cards, sorted.
    fn topic_list(&self) -> Result<Vec<String>>;

    /// All cards of a topic; empty for an unknown topic.
    fn cards_in_topic(&self, topic: &str) -> Result<Vec<Card>>;

    /// A single card, `CardNotFound` if absent.
    fn get_card(&self, topic: &str, key: &str) -> Result<Card>;

    /// Insert or replace, keyed by `card.key`.
    fn put_card(&self, topic: &str, card: &Card) -> Result<()>;

    /// Remove a card, `CardNotFound` if absent.
    fn delete_card(&self, topic: &str, key: &str) -> Result<()>;

    /// Apply a batch for one topic. Deletes of missing keys are ignored.
    ///
    /// The default replays the batch call by call; adapters that can do so
    /// override it to commit the batch atomically.
    fn apply(&self, topic: &str, batch: &CardBatch) -> Result<()> {
        for key in &batch.deletes {
            match self.delete_card(topic, key) {
                Err(e) if e.is_not_found() => {}
                other => other?,
            }
        }
        for card in &batch.puts {
            self.put_card(topic, card)?;
        }
        Ok(())
    }
}
