//! Bounded in-memory event log
//!
//! Holds the most recent postings in arrival order. Once full, every push
//! evicts the oldest entry.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

/// Default number of retained events
pub const DEFAULT_CAPACITY: usize = 100;

/// A posted event after stamping: the poster's object plus `id` and `timestamp`
pub type StoredEvent = Map<String, Value>;

#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<StoredEvent>,
    capacity: usize,
    total_received: u64,
}

/// Counters served by `GET /api/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub retained: usize,
    pub capacity: usize,
    pub total_received: u64,
}

impl EventLog {
    /// `capacity` is clamped to at least one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            total_received: 0,
        }
    }

    pub fn push(&mut self, event: StoredEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            trace!(capacity = self.capacity, "Evicted oldest event");
        }
        self.events.push_back(event);
        self.total_received += 1;
    }

    /// Retained events, oldest first
    pub fn snapshot(&self) -> Vec<StoredEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn stats(&self) -> LogStats {
        LogStats {
            retained: self.events.len(),
            capacity: self.capacity,
            total_received: self.total_received,
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(n: usize) -> StoredEvent {
        let Value::Object(map) = json!({"id": n.to_string(), "timestamp": n}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut log = EventLog::new(3);
        for n in 0..5 {
            log.push(stored(n));
        }

        let ids: Vec<_> = log
            .snapshot()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["2", "3", "4"]);
        assert_eq!(
            log.stats(),
            LogStats {
                retained: 3,
                capacity: 3,
                total_received: 5
            }
        );
    }

    #[test]
    fn test_default_capacity() {
        let mut log = EventLog::default();
        for n in 0..150 {
            log.push(stored(n));
        }
        assert_eq!(log.len(), DEFAULT_CAPACITY);
        assert_eq!(log.snapshot()[0]["id"], "50");
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut log = EventLog::new(0);
        log.push(stored(1));
        assert_eq!(log.len(), 1);
    }
}
