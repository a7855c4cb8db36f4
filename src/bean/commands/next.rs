use crate::commands::{CmdMessage, CmdResult, NextCard, ReviewItem};
use crate::error::{Context, Result};
use crate::lock::TopicLocks;
use crate::model::validate_topic;
use crate::notes::NoteSource;
use crate::selector;
use crate::store::CardStore;
use chrono::{DateTime, Utc};

pub fn run<S: CardStore, N: NoteSource>(
    store: &S,
    notes: &N,
    locks: &TopicLocks,
    topic: &str,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    validate_topic(topic)?;

    locks.with_read(topic, || {
        let cards = store
            .cards_in_topic(topic)
            .with_context(|| format!("get cards in topic {:?}", topic))?;

        let Some(card) = selector::next_due(&cards, now) else {
            let mut result = CmdResult::default().with_next(NextCard::NothingDue);
            result.add_message(CmdMessage::info(format!("Nothing due in {}", topic)));
            return Ok(result);
        };

        let note = notes
            .note_by_key(&card.key)
            .with_context(|| format!("get note {:?} for topic {:?}", card.key, topic))?;

        Ok(CmdResult::default()
            .with_next(NextCard::Due(ReviewItem {
                topic: topic.to_string(),
                key: card.key.clone(),
                title: note.title,
                content: note.text,
            }))
            .with_affected_cards(vec![card.clone()]))
    })
}
