use super::NoteSource;
use crate::error::{BeanError, Context, Result};
use crate::model::{group_notes, Note, NotesByTopic};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location of Bear's database relative to the user's home directory.
pub const BEAR_DB_SUFFIX: &str =
    "Library/Group Containers/9K33E3U3T4.net.shinyfrog.bear/Application Data/database.sqlite";

// Notes carrying a tag whose path contains the marker as a whole segment.
// GLOB, unlike LIKE, matches case-sensitively like `topic_for_tag`.
const ALL_NOTES_SQL: &str = "
SELECT DISTINCT T.ZTITLE, N.ZUNIQUEIDENTIFIER, N.ZTITLE, N.ZTEXT
FROM ZSFNOTE N
    JOIN Z_7TAGS T7 ON N.Z_PK = T7.Z_7NOTES
    JOIN ZSFNOTETAG T ON T7.Z_14TAGS = T.Z_PK
WHERE N.ZTRASHED = 0
    AND (T.ZTITLE = ?1
        OR T.ZTITLE GLOB ?1 || '/*'
        OR T.ZTITLE GLOB '*/' || ?1
        OR T.ZTITLE GLOB '*/' || ?1 || '/*')";

const NOTE_BY_KEY_SQL: &str = "SELECT ZTITLE, ZTEXT FROM ZSFNOTE WHERE ZUNIQUEIDENTIFIER = ?1";

/// Read-only view of the Bear notes database.
pub struct BearNoteSource {
    conn: Mutex<Connection>,
    path: PathBuf,
    marker: String,
    timeout: Duration,
}

impl BearNoteSource {
    pub fn open(path: impl Into<PathBuf>, marker: &str, timeout: Duration) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(BeanError::StoreUnavailable(format!(
                "notes database not found at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("open notes database {}", path.display()))?;
        conn.busy_timeout(timeout)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            marker: marker.to_string(),
            timeout,
        })
    }

    /// Default database location for the given home directory.
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(BEAR_DB_SUFFIX)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.try_lock_for(self.timeout).ok_or_else(|| {
            BeanError::StoreUnavailable(format!(
                "timed out after {:?} waiting for notes database",
                self.timeout
            ))
        })?;
        f(&conn)
    }
}

impl NoteSource for BearNoteSource {
    fn all_notes_by_topic(&self) -> Result<NotesByTopic> {
        let notes = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare(ALL_NOTES_SQL)?;
                let rows = stmt.query_map([&self.marker], |row| {
                    Ok(Note {
                        tag: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                        key: row.get(1)?,
                        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    })
                })?;
                let notes = rows.collect::<rusqlite::Result<Vec<Note>>>()?;
                Ok(notes)
            })
            .with_context(|| format!("select notes from {}", self.path.display()))?;

        tracing::debug!(count = notes.len(), "loaded notes from bear");
        Ok(group_notes(notes, &self.marker))
    }

    fn note_by_key(&self, key: &str) -> Result<Note> {
        let found = self
            .with_conn(|conn| {
                let row = conn
                    .query_row(NOTE_BY_KEY_SQL, [key], |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, Option<String>>(1)?,
                        ))
                    })
                    .optional()?;
                Ok(row)
            })
            .with_context(|| format!("select note {:?}", key))?;

        let (title, text) = found.ok_or_else(|| BeanError::NoteNotFound(key.to_string()))?;
        Ok(Note {
            tag: String::new(),
            key: key.to_string(),
            title: title.unwrap_or_default(),
            text: text.unwrap_or_default(),
        })
    }
}
