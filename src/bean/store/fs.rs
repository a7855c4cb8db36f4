use super::{CardBatch, CardStore};
use crate::error::{BeanError, Context, Result};
use crate::model::{validate_topic, Card};
use fs2::FileExt;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Version of the on-disk bucket format.
pub const BUCKET_VERSION: u32 = 1;
const BUCKET_EXT: &str = "json";
const LOCK_FILENAME: &str = ".lock";
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Bucket {
    version: u32,
    cards: BTreeMap<String, Card>,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// File-based card storage: one JSON bucket per topic.
///
/// The store holds an advisory lock on its directory for as long as it is
/// open, so a second process fails fast instead of interleaving writes.
pub struct FileCardStore {
    root: PathBuf,
    timeout: Duration,
    guard: RwLock<()>,
    _process_lock: File,
}

impl FileCardStore {
    /// Open (creating if needed) the store rooted at `root`, waiting at most
    /// `timeout` for any lock.
    pub fn open(root: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create card store directory {}", root.display()))?;
        let process_lock = acquire_process_lock(&root.join(LOCK_FILENAME), timeout)?;
        tracing::debug!(root = %root.display(), "opened card store");
        Ok(Self {
            root,
            timeout,
            guard: RwLock::new(()),
            _process_lock: process_lock,
        })
    }

    fn bucket_path(&self, topic: &str) -> Result<PathBuf> {
        validate_topic(topic)?;
        Ok(self.root.join(format!("{}.{}", topic, BUCKET_EXT)))
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, ()>> {
        self.guard.try_read_for(self.timeout).ok_or_else(|| {
            BeanError::StoreUnavailable(format!(
                "timed out after {:?} waiting to read {}",
                self.timeout,
                self.root.display()
            ))
        })
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, ()>> {
        self.guard.try_write_for(self.timeout).ok_or_else(|| {
            BeanError::StoreUnavailable(format!(
                "timed out after {:?} waiting to write {}",
                self.timeout,
                self.root.display()
            ))
        })
    }

    fn load_bucket(&self, topic: &str) -> Result<BTreeMap<String, Card>> {
        let path = self.bucket_path(topic)?;
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("read bucket {}", path.display()))?;
        decode_bucket(&path, &content)
    }

    /// Atomically replace the bucket for `topic`; an empty bucket is removed.
    fn save_bucket(&self, topic: &str, cards: BTreeMap<String, Card>) -> Result<()> {
        let path = self.bucket_path(topic)?;
        if cards.is_empty() {
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("remove bucket {}", path.display()))?;
            }
            return Ok(());
        }

        let bucket = Bucket {
            version: BUCKET_VERSION,
            cards,
        };
        let content = serde_json::to_string_pretty(&bucket)?;

        // Atomic write
        let tmp_path = self.root.join(format!(".{}-{}.tmp", topic, Uuid::new_v4()));
        let written = fs::write(&tmp_path, content)
            .with_context(|| format!("write {}", tmp_path.display()))
            .and_then(|()| {
                fs::rename(&tmp_path, &path)
                    .with_context(|| format!("replace bucket {}", path.display()))
            });
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written
    }
}

impl CardStore for FileCardStore {
    fn topic_list(&self) -> Result<Vec<String>> {
        let _guard = self.read_guard()?;
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("list {}", self.root.display()))?;

        let mut topics = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(BUCKET_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    topics.push(stem.to_string());
                }
            }
        }
        topics.sort();
        Ok(topics)
    }

    fn cards_in_topic(&self, topic: &str) -> Result<Vec<Card>> {
        let _guard = self.read_guard()?;
        Ok(self.load_bucket(topic)?.into_values().collect())
    }

    fn get_card(&self, topic: &str, key: &str) -> Result<Card> {
        let _guard = self.read_guard()?;
        self.load_bucket(topic)?
            .remove(key)
            .ok_or_else(|| BeanError::CardNotFound {
                topic: topic.to_string(),
                key: key.to_string(),
            })
    }

    fn put_card(&self, topic: &str, card: &Card) -> Result<()> {
        let _guard = self.write_guard()?;
        let mut cards = self.load_bucket(topic)?;
        cards.insert(card.key.clone(), card.clone());
        self.save_bucket(topic, cards)
    }

    fn delete_card(&self, topic: &str, key: &str) -> Result<()> {
        let _guard = self.write_guard()?;
        let mut cards = self.load_bucket(topic)?;
        if cards.remove(key).is_none() {
            return Err(BeanError::CardNotFound {
                topic: topic.to_string(),
                key: key.to_string(),
            });
        }
        self.save_bucket(topic, cards)
    }

    fn apply(&self, topic: &str, batch: &CardBatch) -> Result<()> {
        let _guard = self.write_guard()?;
        let mut cards = self.load_bucket(topic)?;
        for key in &batch.deletes {
            cards.remove(key);
        }
        for card in &batch.puts {
            cards.insert(card.key.clone(), card.clone());
        }
        self.save_bucket(topic, cards)
    }
}

fn decode_bucket(path: &Path, content: &str) -> Result<BTreeMap<String, Card>> {
    let schema_error = |detail: String| BeanError::Schema {
        location: path.display().to_string(),
        detail,
    };

    let header: VersionHeader =
        serde_json::from_str(content).map_err(|e| schema_error(e.to_string()))?;
    if header.version != BUCKET_VERSION {
        return Err(schema_error(format!(
            "unsupported bucket version {} (expected {})",
            header.version, BUCKET_VERSION
        )));
    }

    let bucket: Bucket = serde_json::from_str(content).map_err(|e| schema_error(e.to_string()))?;
    for (key, card) in &bucket.cards {
        if key != &card.key {
            return Err(schema_error(format!(
                "card stored under {:?} carries key {:?}",
                key, card.key
            )));
        }
    }
    Ok(bucket.cards)
}

fn acquire_process_lock(path: &Path, timeout: Duration) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("open lock file {}", path.display()))?;

    let deadline = Instant::now() + timeout;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(file),
            Err(e) if Instant::now() >= deadline => {
                tracing::warn!(lock = %path.display(), error = %e, "card store is locked");
                return Err(BeanError::StoreUnavailable(format!(
                    "card store {} is locked by another process: {}",
                    path.display(),
                    e
                )));
            }
            Err(_) => std::thread::sleep(LOCK_RETRY_INTERVAL),
        }
    }
}
