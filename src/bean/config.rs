use crate::error::{BeanError, Result};
use crate::model::DEFAULT_TOPIC_MARKER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

/// Configuration for bean, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeanConfig {
    /// Path to the notes database. `None` means Bear's default location.
    #[serde(default)]
    pub notes_db: Option<PathBuf>,

    /// Tag segment after which the topic name follows
    #[serde(default = "default_topic_marker")]
    pub topic_marker: String,

    /// How long store operations wait for a lock before failing
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_topic_marker() -> String {
    DEFAULT_TOPIC_MARKER.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for BeanConfig {
    fn default() -> Self {
        Self {
            notes_db: None,
            topic_marker: default_topic_marker(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl BeanConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: BeanConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// The notes database path, falling back to Bear's location under `home`.
    pub fn notes_db_path(&self, home: &Path) -> PathBuf {
        self.notes_db
            .clone()
            .unwrap_or_else(|| crate::notes::bear::BearNoteSource::default_path(home))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "notes-db" => Some(
                self.notes_db
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(bear default)".to_string()),
            ),
            "topic-marker" => Some(self.topic_marker.clone()),
            "lock-timeout-ms" => Some(self.lock_timeout_ms.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "notes-db" => {
                self.notes_db = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "topic-marker" => {
                if value.is_empty() || value.contains('/') {
                    return Err(BeanError::invalid(format!(
                        "topic-marker must be a single non-empty tag segment, got {:?}",
                        value
                    )));
                }
                self.topic_marker = value.to_string();
            }
            "lock-timeout-ms" => {
                let ms: u64 = value.parse().map_err(|_| {
                    BeanError::invalid(format!("lock-timeout-ms must be a number, got {:?}", value))
                })?;
                if ms == 0 {
                    return Err(BeanError::invalid("lock-timeout-ms must be positive"));
                }
                self.lock_timeout_ms = ms;
            }
            _ => return Err(BeanError::invalid(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["notes-db", "topic-marker", "lock-timeout-ms"]
    }
}
