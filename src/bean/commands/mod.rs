use crate::config::BeanConfig;
use crate::model::Card;
use crate::sync::SyncReport;
use std::path::PathBuf;

pub mod cards;
pub mod config;
pub mod next;
pub mod reflect;
pub mod sync;
pub mod topics;

#[derive(Debug, Clone)]
pub struct BeanPaths {
    pub data: PathBuf,
}

impl BeanPaths {
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self { data: data.into() }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.data.clone()
    }

    pub fn cards_dir(&self) -> PathBuf {
        self.data.join("cards")
    }
}

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// The card picked for review, resolved against the note corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub topic: String,
    pub key: String,
    pub title: String,
    pub content: String,
}

/// Outcome of asking for the next card of a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextCard {
    Due(ReviewItem),
    /// The topic has no card due (or no card at all).
    NothingDue,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub topics: Vec<String>,
    pub next: Option<NextCard>,
    pub affected_cards: Vec<Card>,
    pub listed_cards: Vec<Card>,
    pub sync_report: Option<SyncReport>,
    pub config: Option<BeanConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_next(mut self, next: NextCard) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_affected_cards(mut self, cards: Vec<Card>) -> Self {
        self.affected_cards = cards;
        self
    }

    pub fn with_listed_cards(mut self, cards: Vec<Card>) -> Self {
        self.listed_cards = cards;
        self
    }

    pub fn with_sync_report(mut self, report: SyncReport) -> Self {
        self.sync_report = Some(report);
        self
    }

    pub fn with_config(mut self, config: BeanConfig) -> Self {
        self.config = Some(config);
        self
    }
}
