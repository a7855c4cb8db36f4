use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Context, Result};
use crate::lock::TopicLocks;
use crate::model::validate_topic;
use crate::selector::{due_count, due_order};
use crate::store::CardStore;
use chrono::{DateTime, Utc};

/// Every card of a topic in review order.
pub fn run<S: CardStore>(
    store: &S,
    locks: &TopicLocks,
    topic: &str,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    validate_topic(topic)?;

    let mut cards = locks.with_read(topic, || {
        store
            .cards_in_topic(topic)
            .with_context(|| format!("get cards in topic {:?}", topic))
    })?;
    cards.sort_by(due_order);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "{} card(s), {} due",
        cards.len(),
        due_count(&cards, now)
    )));
    Ok(result.with_listed_cards(cards))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn lists_cards_in_due_order() {
        let now = Utc::now();
        let fixture = StoreFixture::new()
            .with_card_due("rust", "b", now, 4)
            .with_card_due("rust", "a", now, -1)
            .with_card_due("rust", "c", now, 0);

        let result = run(&fixture.store, &TopicLocks::default(), "rust", now).unwrap();
        let keys: Vec<_> = result.listed_cards.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
        assert_eq!(result.messages[0].content, "3 card(s), 2 due");
    }
}
