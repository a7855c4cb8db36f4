//! # Bean Architecture
//!
//! Bean keeps a spaced-repetition schedule next to a personal notes corpus. Notes
//! tagged under a marker segment (`anki/rust`, `lang/anki/go`) become flashcards,
//! grouped into topics. The notes stay the source of truth for content; bean only
//! owns the schedule.
//!
//! Like any library with a CLI client, the core makes no terminal assumptions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns the topic locks          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, sync.rs)                     │
//! │  - Review selection, grading, reconciliation                │
//! │  - Scheduling itself is pure (scheduler.rs, selector.rs)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Adapters (store/, notes/)                                  │
//! │  - CardStore: FileCardStore, InMemoryCardStore              │
//! │  - NoteSource: BearNoteSource, InMemoryNoteSource           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Every operation is safe to call from many threads at once. Operations on one
//! topic are serialized by a per-topic reader/writer lock ([`lock::TopicLocks`]):
//! reviews share it, grading and reconciliation take it exclusively. Topics never
//! contend with each other. Lock acquisition is bounded and fails with
//! [`error::ErrorKind::StoreUnavailable`] instead of blocking forever.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per operation
//! - [`sync`]: Corpus-to-schedule reconciliation
//! - [`scheduler`]: The SM-2 update rule
//! - [`selector`]: Picking the next due card
//! - [`model`]: Cards, notes, qualities, the topic rule
//! - [`store`]: Card persistence and implementations
//! - [`notes`]: Note corpus access and implementations
//! - [`lock`]: Per-topic locking
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod notes;
pub mod scheduler;
pub mod selector;
pub mod store;
pub mod sync;
