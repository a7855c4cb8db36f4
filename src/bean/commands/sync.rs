use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::lock::TopicLocks;
use crate::notes::NoteSource;
use crate::store::CardStore;
use crate::sync::SyncEngine;
use chrono::{DateTime, Utc};

pub fn run<S: CardStore, N: NoteSource>(
    store: &S,
    notes: &N,
    locks: &TopicLocks,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let report = SyncEngine::new(store, notes, locks).reconcile(now)?;
    let totals = report.totals();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Synced {} topic(s): {} new, {} reset, {} removed, {} unchanged",
        report.topics.len(),
        totals.created,
        totals.reset,
        totals.deleted,
        totals.unchanged
    )));
    for skipped in &report.skipped {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {:?}: not a valid topic or key",
            skipped
        )));
    }
    Ok(result.with_sync_report(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;
    use crate::notes::memory::InMemoryNoteSource;
    use crate::store::memory::InMemoryCardStore;

    #[test]
    fn reports_totals() {
        let store = InMemoryCardStore::new();
        let notes = InMemoryNoteSource::with_notes(vec![
            Note::new("anki/rust", "r1", "A", "a"),
            Note::new("anki/go", "g1", "B", "b"),
        ]);

        let result = run(&store, &notes, &TopicLocks::default(), Utc::now()).unwrap();
        let report = result.sync_report.unwrap();
        assert_eq!(report.totals().created, 2);
        assert!(result.messages[0].content.contains("2 new"));
    }
}
