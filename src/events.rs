//! Append-only event logs with pull-based cursors
//!
//! Every component records what it did in an [`EventLog`]. Readers never
//! subscribe; they ask for the next batch after a [`Cursor`] they keep
//! themselves, which lets the same consumer run as a polling service or be
//! driven by a push notifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::EventSource;

/// Position in an event stream
///
/// For in-memory logs this is an index; for chain-backed sources it is the
/// next block number to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(u64);

impl Cursor {
    pub const START: Self = Self(0);

    #[inline]
    pub const fn new(position: u64) -> Self {
        Self(position)
    }

    #[inline]
    pub const fn position(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An append-only, cursor-addressed log
#[derive(Debug)]
pub struct EventLog<E> {
    entries: RwLock<Vec<E>>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Clone> EventLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns its position
    pub fn push(&self, event: E) -> Cursor {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(event);
        Cursor::new(entries.len() as u64 - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursor just past the last event
    pub fn head(&self) -> Cursor {
        Cursor::new(self.len() as u64)
    }

    /// Copies out every event; intended for tests and diagnostics
    pub fn snapshot(&self) -> Vec<E> {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Synchronous form of [`EventSource::next_batch`]
    pub fn read_from(&self, from: Cursor, limit: usize) -> (Vec<E>, Cursor) {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let start = usize::try_from(from.position())
            .unwrap_or(usize::MAX)
            .min(entries.len());
        let end = start.saturating_add(limit).min(entries.len());
        (entries[start..end].to_vec(), Cursor::new(end as u64))
    }
}

#[async_trait]
impl<E> EventSource<E> for EventLog<E>
where
    E: Clone + Send + Sync,
{
    async fn next_batch(&self, from: Cursor, limit: usize) -> Result<(Vec<E>, Cursor)> {
        Ok(self.read_from(from, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_positions() {
        let log = EventLog::new();
        assert_eq!(log.push("a"), Cursor::new(0));
        assert_eq!(log.push("b"), Cursor::new(1));
        assert_eq!(log.head(), Cursor::new(2));
    }

    #[tokio::test]
    async fn test_batches_resume_from_cursor() {
        let log = EventLog::new();
        for i in 0..5u32 {
            log.push(i);
        }

        let (first, cursor) = log.next_batch(Cursor::START, 3).await.unwrap();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(cursor, Cursor::new(3));

        let (rest, cursor) = log.next_batch(cursor, 10).await.unwrap();
        assert_eq!(rest, vec![3, 4]);
        assert_eq!(cursor, Cursor::new(5));

        let (empty, same) = log.next_batch(cursor, 10).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(same, cursor);
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let log = EventLog::new();
        log.push(1u8);
        let (events, cursor) = log.read_from(Cursor::new(10), 5);
        assert!(events.is_empty());
        assert_eq!(cursor, Cursor::new(1));
    }
}
