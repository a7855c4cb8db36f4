use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Context, Result};
use crate::lock::TopicLocks;
use crate::model::{validate_key, validate_topic, Quality};
use crate::scheduler;
use crate::store::CardStore;
use chrono::{DateTime, Utc};

/// Grade a card and persist its new schedule.
///
/// Input is validated before the topic is locked, so a bad quality or
/// identifier never touches the store.
pub fn run<S: CardStore>(
    store: &S,
    locks: &TopicLocks,
    topic: &str,
    key: &str,
    quality: i64,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    validate_topic(topic)?;
    validate_key(key)?;
    let quality = Quality::try_from(quality)?;

    locks.with_write(topic, || {
        let card = store
            .get_card(topic, key)
            .with_context(|| format!("get card {:?} from topic {:?}", key, topic))?;

        let updated = scheduler::update(&card, quality, now);
        store
            .put_card(topic, &updated)
            .with_context(|| format!("update card {:?} in topic {:?}", key, topic))?;

        tracing::debug!(
            topic,
            key,
            quality = quality.value(),
            days = updated.days_interval,
            efactor = updated.efactor,
            "rescheduled card"
        );

        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success(format!(
            "Next rehearsal of {} in {} day(s)",
            key, updated.days_interval
        )));
        Ok(result.with_affected_cards(vec![updated]))
    })
}
