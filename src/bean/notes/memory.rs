use super::NoteSource;
use crate::error::{BeanError, Result};
use crate::model::{group_notes, has_marker, Note, NotesByTopic, DEFAULT_TOPIC_MARKER};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory note corpus for tests. Notes are kept in insertion order; one
/// key may appear under several tags. Like the Bear query, the corpus only
/// holds notes whose tag carries the marker segment.
pub struct InMemoryNoteSource {
    notes: RwLock<Vec<Note>>,
    marker: String,
    unavailable: AtomicBool,
}

impl Default for InMemoryNoteSource {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_MARKER)
    }
}

impl InMemoryNoteSource {
    pub fn new(marker: &str) -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            marker: marker.to_string(),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let source = Self::default();
        source.notes.write().extend(notes);
        source
    }

    pub fn insert(&self, note: Note) {
        self.notes.write().push(note);
    }

    /// Replace the text of every copy of `key`.
    pub fn edit(&self, key: &str, text: &str) {
        for note in self.notes.write().iter_mut().filter(|n| n.key == key) {
            note.text = text.to_string();
        }
    }

    pub fn remove(&self, key: &str) {
        self.notes.write().retain(|n| n.key != key);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BeanError::StoreUnavailable(
                "simulated unavailable note source".to_string(),
            ));
        }
        Ok(())
    }
}

impl NoteSource for InMemoryNoteSource {
    fn all_notes_by_topic(&self) -> Result<NotesByTopic> {
        self.check_available()?;
        let notes = self.notes.read();
        let marked = notes
            .iter()
            .filter(|n| has_marker(&n.tag, &self.marker))
            .cloned();
        Ok(group_notes(marked, &self.marker))
    }

    fn note_by_key(&self, key: &str) -> Result<Note> {
        self.check_available()?;
        self.notes
            .read()
            .iter()
            .find(|n| n.key == key)
            .cloned()
            .ok_or_else(|| BeanError::NoteNotFound(key.to_string()))
    }
}
