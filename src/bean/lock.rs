//! Per-topic serialization of review traffic against reconciliation.
//!
//! Reads of a topic (selecting the next card) share the topic lock; anything
//! that mutates a topic (grading a card, reconciling the topic) holds it
//! exclusively. Acquisition is bounded: on timeout the operation fails with
//! `StoreUnavailable` instead of waiting forever.

use crate::error::{BeanError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

pub struct TopicLocks {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
    timeout: Duration,
}

impl Default for TopicLocks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

impl TopicLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn lock_for(&self, topic: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(topic.to_string()).or_default())
    }

    /// Run `f` while holding the topic lock shared.
    pub fn with_read<T>(&self, topic: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_for(topic);
        let _guard = lock
            .try_read_for(self.timeout)
            .ok_or_else(|| self.timed_out(topic))?;
        f()
    }

    /// Run `f` while holding the topic lock exclusively.
    pub fn with_write<T>(&self, topic: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_for(topic);
        let _guard = lock
            .try_write_for(self.timeout)
            .ok_or_else(|| self.timed_out(topic))?;
        f()
    }

    fn timed_out(&self, topic: &str) -> BeanError {
        tracing::warn!(topic, timeout = ?self.timeout, "topic lock acquisition timed out");
        BeanError::StoreUnavailable(format!(
            "timed out after {:?} waiting for topic {:?}",
            self.timeout, topic
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn readers_share_the_topic() {
        let locks = TopicLocks::new(Duration::from_millis(50));
        let value = locks
            .with_read("rust", || {
                thread::scope(|s| s.spawn(|| locks.with_read("rust", || Ok(7))).join().unwrap())
            })
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn writer_times_out_while_topic_is_held() {
        let locks = Arc::new(TopicLocks::new(Duration::from_millis(50)));
        let (held_tx, held_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let holder = {
            let locks = Arc::clone(&locks);
            thread::spawn(move || {
                locks
                    .with_write("rust", || {
                        held_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                        Ok(())
                    })
                    .unwrap();
            })
        };

        held_rx.recv().unwrap();
        let err = locks.with_write("rust", || Ok(())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        // other topics are unaffected
        assert!(locks.with_write("go", || Ok(())).is_ok());

        release_tx.send(()).unwrap();
        holder.join().unwrap();
        assert!(locks.with_write("rust", || Ok(())).is_ok());
    }
}
