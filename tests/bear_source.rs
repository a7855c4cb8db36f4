use bean::error::ErrorKind;
use bean::notes::bear::BearNoteSource;
use bean::notes::NoteSource;
use std::time::Duration;

mod common;
use common::BearDb;

const TIMEOUT: Duration = Duration::from_secs(1);

#[test]
fn groups_marked_notes_by_topic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");
    let mut db = BearDb::create(&path);

    let rust = db.tag("anki/rust");
    let nested = db.tag("lang/anki/go");
    let bare = db.tag("anki");
    let shouting = db.tag("ANKI/rust");
    let other = db.tag("journal");

    db.note(1, "r1", "Ownership", "move semantics", &[rust]);
    db.note(2, "g1", "Goroutines", "go func()", &[nested]);
    db.note(3, "m1", "Loose", "no topic", &[bare]);
    db.note(4, "j1", "Diary", "not a card", &[other]);
    db.note(5, "x1", "Case", "wrong case", &[shouting]);
    db.note(6, "r2", "Trashed", "gone", &[rust]);
    db.trash("r2");

    let source = BearNoteSource::open(&path, "anki", TIMEOUT).unwrap();
    let corpus = source.all_notes_by_topic().unwrap();

    let topics: Vec<_> = corpus.keys().cloned().collect();
    assert_eq!(topics, vec!["go", "misc", "rust"]);
    let rust_keys: Vec<_> = corpus["rust"].keys().cloned().collect();
    assert_eq!(rust_keys, vec!["r1"]);
    assert_eq!(corpus["rust"]["r1"].text, "move semantics");
    assert!(corpus["misc"].contains_key("m1"));
}

#[test]
fn note_with_two_topic_tags_appears_in_both() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");
    let mut db = BearDb::create(&path);
    let rust = db.tag("anki/rust");
    let go = db.tag("anki/go");
    db.note(1, "k1", "Shared", "both", &[rust, go]);

    let source = BearNoteSource::open(&path, "anki", TIMEOUT).unwrap();
    let corpus = source.all_notes_by_topic().unwrap();
    assert!(corpus["rust"].contains_key("k1"));
    assert!(corpus["go"].contains_key("k1"));
}

#[test]
fn note_by_key_reads_current_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.sqlite");
    let mut db = BearDb::create(&path);
    let rust = db.tag("anki/rust");
    db.note(1, "k1", "Lifetimes", "before", &[rust]);

    let source = BearNoteSource::open(&path, "anki", TIMEOUT).unwrap();
    db.edit("k1", "after");

    let note = source.note_by_key("k1").unwrap();
    assert_eq!(note.title, "Lifetimes");
    assert_eq!(note.text, "after");

    let err = source.note_by_key("missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn missing_database_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = BearNoteSource::open(dir.path().join("nope.sqlite"), "anki", TIMEOUT)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}
