use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeanError {
    #[error("Card not found: {key:?} in topic {topic:?}")]
    CardNotFound { topic: String, key: String },

    #[error("Note not found: {0:?}")]
    NoteNotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Schema mismatch in {location}: {detail}")]
    Schema { location: String, detail: String },

    #[error("Reconciliation of topic {topic:?} failed: {source}")]
    Reconciliation {
        topic: String,
        #[source]
        source: Box<BeanError>,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<BeanError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Notes database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Coarse classification of a [`BeanError`], independent of how many
/// context layers wrap it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A card, note or topic is absent. Expected, shown as "nothing to show".
    NotFound,
    /// The persistence engine or the notes database could not be reached.
    StoreUnavailable,
    /// Rejected before any state was touched.
    InvalidInput,
    /// A topic failed mid-reconciliation; its prior state is intact.
    Reconciliation,
    /// A persisted record did not match the expected schema.
    SchemaMismatch,
}

impl BeanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BeanError::CardNotFound { .. } | BeanError::NoteNotFound(_) => ErrorKind::NotFound,
            BeanError::StoreUnavailable(_) | BeanError::Io(_) | BeanError::Sqlite(_) => {
                ErrorKind::StoreUnavailable
            }
            BeanError::InvalidInput(_) => ErrorKind::InvalidInput,
            BeanError::Schema { .. } | BeanError::Serialization(_) => ErrorKind::SchemaMismatch,
            BeanError::Reconciliation { .. } => ErrorKind::Reconciliation,
            BeanError::Context { source, .. } => source.kind(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        BeanError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BeanError>;

/// Wraps a failure with the operation and identifiers that were in flight.
pub trait Context<T> {
    fn with_context<F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Into<BeanError>,
{
    fn with_context<F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BeanError::Context {
            context: context(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_looks_through_context_layers() {
        let err: Result<()> = Err(BeanError::CardNotFound {
            topic: "rust".into(),
            key: "k1".into(),
        });
        let wrapped = err
            .with_context(|| "load card".to_string())
            .with_context(|| "reflect".to_string())
            .unwrap_err();

        assert_eq!(wrapped.kind(), ErrorKind::NotFound);
        assert!(wrapped.is_not_found());
        assert_eq!(
            wrapped.to_string(),
            "reflect: load card: Card not found: \"k1\" in topic \"rust\""
        );
    }

    #[test]
    fn io_errors_count_as_store_unavailable() {
        let err: BeanError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn reconciliation_kind_is_kept_even_for_not_found_sources() {
        let err = BeanError::Reconciliation {
            topic: "rust".into(),
            source: Box::new(BeanError::NoteNotFound("k".into())),
        };
        assert_eq!(err.kind(), ErrorKind::Reconciliation);
    }
}
