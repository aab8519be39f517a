//! Poll-cycle bookkeeping
//!
//! The collector always returns its whole retained window, so every cycle is
//! diffed against the ids already seen. The seen-set is trimmed back to the
//! most recent ids once it grows past a threshold.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use super::events::{Event, EventId};

/// Fixed poll period
pub const POLL_INTERVAL_MS: f64 = 1000.0;
/// Trim the seen-set once it holds more than this many ids
pub const SEEN_TRIM_THRESHOLD: usize = 1000;
/// Number of most recent ids kept after a trim
pub const SEEN_RETAIN: usize = 500;

/// Insertion-ordered set of processed event ids
#[derive(Debug, Default)]
pub struct SeenIds {
    order: VecDeque<EventId>,
    set: HashSet<EventId>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id, returns false if it was already present
    pub fn insert(&mut self, id: &str) -> bool {
        if self.set.contains(id) {
            return false;
        }
        self.set.insert(id.to_string());
        self.order.push_back(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keep only the most recent [`SEEN_RETAIN`] ids once past the threshold
    pub fn trim(&mut self) {
        if self.order.len() <= SEEN_TRIM_THRESHOLD {
            return;
        }
        let excess = self.order.len() - SEEN_RETAIN;
        for id in self.order.drain(..excess) {
            self.set.remove(&id);
        }
        debug!(dropped = excess, retained = self.order.len(), "Trimmed seen-id set");
    }
}

/// Diff successive event windows into newly observed events
#[derive(Debug, Default)]
pub struct Poller {
    seen: SeenIds,
    last_poll: Option<f64>,
    in_flight: bool,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a poll is due at `now` (ms); the first poll is due immediately
    pub fn is_due(&self, now: f64) -> bool {
        if self.in_flight {
            return false;
        }
        match self.last_poll {
            None => true,
            Some(last) => now - last >= POLL_INTERVAL_MS,
        }
    }

    /// Mark a fetch as started at `now`
    pub fn begin(&mut self, now: f64) {
        self.last_poll = Some(now);
        self.in_flight = true;
    }

    /// Mark the in-flight fetch as finished, successful or not
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    /// Filter a fetched window down to unseen events, in the order received
    pub fn observe(&mut self, window: Vec<Event>) -> Vec<Event> {
        let fresh: Vec<Event> = window
            .into_iter()
            .filter(|event| self.seen.insert(&event.id))
            .collect();
        trace!(fresh = fresh.len(), seen = self.seen.len(), "Poll window diffed");
        self.seen.trim();
        fresh
    }

    pub fn seen(&self) -> &SeenIds {
        &self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventDetails;

    fn event(id: usize) -> Event {
        Event::new(format!("ev-{id}"), id as i64, EventDetails::new("a", "b", "send"))
    }

    #[test]
    fn test_observe_filters_seen() {
        let mut poller = Poller::new();
        let first = poller.observe(vec![event(1), event(2)]);
        assert_eq!(first.len(), 2);

        let second = poller.observe(vec![event(1), event(2), event(3)]);
        let ids: Vec<_> = second.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ev-3"]);
    }

    #[test]
    fn test_observe_dedups_within_window() {
        let mut poller = Poller::new();
        let fresh = poller.observe(vec![event(1), event(1)]);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_seen_set_is_bounded() {
        let mut poller = Poller::new();
        // 100-event windows, like the collector's retained buffer
        for batch in 0..12 {
            let window = (batch * 100..(batch + 1) * 100).map(event).collect();
            poller.observe(window);
            assert!(poller.seen().len() <= SEEN_TRIM_THRESHOLD);
        }

        // 1200 distinct ids processed; after the trim at 1100 only 500 were
        // kept and 100 more arrived since.
        assert_eq!(poller.seen().len(), SEEN_RETAIN + 100);
        assert!(poller.seen().contains("ev-1199"));
        assert!(!poller.seen().contains("ev-0"));
    }

    #[test]
    fn test_trim_keeps_most_recent() {
        let mut seen = SeenIds::new();
        for i in 0..=SEEN_TRIM_THRESHOLD {
            seen.insert(&i.to_string());
        }
        seen.trim();
        assert_eq!(seen.len(), SEEN_RETAIN);
        assert!(seen.contains(&SEEN_TRIM_THRESHOLD.to_string()));
        assert!(!seen.contains("0"));
    }

    #[test]
    fn test_poll_timer() {
        let mut poller = Poller::new();
        assert!(poller.is_due(0.0));
        poller.begin(0.0);
        assert!(!poller.is_due(5000.0), "in-flight fetch blocks the next poll");
        poller.finish();
        assert!(!poller.is_due(999.0));
        assert!(poller.is_due(1000.0));
    }
}
