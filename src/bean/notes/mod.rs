//! # Note Corpus
//!
//! Notes are owned by an external application; bean only reads them. The
//! [`NoteSource`] trait exposes the two queries the core needs:
//!
//! - the whole corpus grouped by topic ([`crate::model::NotesByTopic`]), used
//!   by reconciliation
//! - a single note by key, used to show the content of the selected card
//!
//! ## Implementations
//!
//! - [`bear::BearNoteSource`]: the Bear notes sqlite database, opened read-only
//! - [`memory::InMemoryNoteSource`]: for tests

use crate::error::Result;
use crate::model::{Note, NotesByTopic};

pub mod bear;
pub mod memory;

pub trait NoteSource: Send + Sync {
    /// Every note of the corpus, grouped by topic then key.
    fn all_notes_by_topic(&self) -> Result<NotesByTopic>;

    /// One note by its stable key, `NoteNotFound` if absent.
    fn note_by_key(&self, key: &str) -> Result<Note>;
}
