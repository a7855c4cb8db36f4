//! # Reconciliation
//!
//! Brings the card store in line with the note corpus. The corpus is read
//! once, then every topic known to either side is reconciled on its own:
//!
//! 1. **Orphan cleanup**: a card whose key has no note in the topic is deleted.
//! 2. **Change detection**: a card whose stored content hash differs from the
//!    hash of its note's current text is replaced by a fresh card, so an
//!    edited note starts its schedule over.
//! 3. **Unchanged notes** keep their card and schedule untouched.
//! 4. **New notes** (no card in the topic yet) get a fresh card, due now.
//!
//! Each topic is planned from a snapshot and committed as one
//! [`CardBatch`], under the topic's exclusive lock. A failure aborts the run
//! with [`BeanError::Reconciliation`] naming the topic; topics committed before
//! it stay reconciled and the failing topic keeps its previous state, so the
//! whole run can simply be retried. Running twice on an unchanged corpus is a
//! no-op the second time.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{BeanError, Context, Result};
use crate::lock::TopicLocks;
use crate::model::{validate_key, validate_topic, Card, Note, NotesByTopic};
use crate::notes::NoteSource;
use crate::store::{CardBatch, CardStore};

/// What reconciliation did to one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicReport {
    pub created: usize,
    pub reset: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl TopicReport {
    pub fn changed(&self) -> bool {
        self.created + self.reset + self.deleted > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub topics: BTreeMap<String, TopicReport>,
    /// Topics or keys from the corpus that were not valid identifiers.
    pub skipped: Vec<String>,
}

impl SyncReport {
    pub fn totals(&self) -> TopicReport {
        self.topics
            .values()
            .fold(TopicReport::default(), |acc, r| TopicReport {
                created: acc.created + r.created,
                reset: acc.reset + r.reset,
                deleted: acc.deleted + r.deleted,
                unchanged: acc.unchanged + r.unchanged,
            })
    }
}

/// The changes needed to reconcile one topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicPlan {
    pub batch: CardBatch,
    pub report: TopicReport,
}

/// Diffs a topic's persisted cards against its current notes. Pure.
pub fn plan_topic(
    cards: Vec<Card>,
    notes: &BTreeMap<String, Note>,
    now: DateTime<Utc>,
) -> TopicPlan {
    let mut plan = TopicPlan::default();
    let mut seen = BTreeSet::new();

    for card in cards {
        seen.insert(card.key.clone());
        match notes.get(&card.key) {
            None => {
                plan.report.deleted += 1;
                plan.batch.deletes.push(card.key);
            }
            Some(note) if note.content_hash() != card.content_hash => {
                plan.report.reset += 1;
                plan.batch.puts.push(Card::for_note(note, now));
            }
            Some(_) => plan.report.unchanged += 1,
        }
    }

    for (key, note) in notes {
        if !seen.contains(key) {
            plan.report.created += 1;
            plan.batch.puts.push(Card::for_note(note, now));
        }
    }

    plan
}

pub struct SyncEngine<'a, S: CardStore, N: NoteSource> {
    store: &'a S,
    notes: &'a N,
    locks: &'a TopicLocks,
}

impl<'a, S: CardStore, N: NoteSource> SyncEngine<'a, S, N> {
    pub fn new(store: &'a S, notes: &'a N, locks: &'a TopicLocks) -> Self {
        Self {
            store,
            notes,
            locks,
        }
    }

    pub fn reconcile(&self, now: DateTime<Utc>) -> Result<SyncReport> {
        let corpus = self
            .notes
            .all_notes_by_topic()
            .with_context(|| "load note corpus".to_string())?;
        let stored = self
            .store
            .topic_list()
            .with_context(|| "list stored topics".to_string())?;

        let (corpus, mut skipped) = valid_corpus(corpus);
        let topics: BTreeSet<String> = corpus.keys().cloned().chain(stored).collect();
        let empty = BTreeMap::new();
        let mut report = SyncReport::default();

        for topic in topics {
            if validate_topic(&topic).is_err() {
                // only possible for store-side names the corpus never produced
                tracing::warn!(topic = %topic, "skipping invalid stored topic");
                skipped.push(topic);
                continue;
            }
            let notes = corpus.get(&topic).unwrap_or(&empty);
            let topic_report = self
                .reconcile_topic(&topic, notes, now)
                .map_err(|e| BeanError::Reconciliation {
                    topic: topic.clone(),
                    source: Box::new(e),
                })?;

            tracing::info!(
                topic = %topic,
                created = topic_report.created,
                reset = topic_report.reset,
                deleted = topic_report.deleted,
                unchanged = topic_report.unchanged,
                "reconciled topic"
            );
            report.topics.insert(topic, topic_report);
        }

        report.skipped = skipped;
        Ok(report)
    }

    fn reconcile_topic(
        &self,
        topic: &str,
        notes: &BTreeMap<String, Note>,
        now: DateTime<Utc>,
    ) -> Result<TopicReport> {
        self.locks.with_write(topic, || {
            let cards = self
                .store
                .cards_in_topic(topic)
                .with_context(|| format!("get cards in topic {:?}", topic))?;
            let plan = plan_topic(cards, notes, now);

            for key in &plan.batch.deletes {
                tracing::debug!(topic, key = %key, "dropping card without note");
            }
            for card in &plan.batch.puts {
                tracing::debug!(topic, key = %card.key, "materializing fresh card");
            }

            if !plan.batch.is_empty() {
                self.store
                    .apply(topic, &plan.batch)
                    .with_context(|| format!("commit cards for topic {:?}", topic))?;
            }
            Ok(plan.report)
        })
    }
}

/// Drops topics and keys that cannot be stored, returning what was dropped.
fn valid_corpus(corpus: NotesByTopic) -> (NotesByTopic, Vec<String>) {
    let mut skipped = Vec::new();
    let mut valid = NotesByTopic::new();

    for (topic, notes) in corpus {
        if validate_topic(&topic).is_err() {
            tracing::warn!(topic = %topic, "skipping topic with invalid name");
            skipped.push(topic);
            continue;
        }
        let mut kept = BTreeMap::new();
        for (key, note) in notes {
            if validate_key(&key).is_err() {
                tracing::warn!(topic = %topic, key = %key, "skipping note with invalid key");
                skipped.push(format!("{}/{}", topic, key));
                continue;
            }
            kept.insert(key, note);
        }
        valid.insert(topic, kept);
    }

    (valid, skipped)
}
