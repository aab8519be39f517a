//! "In flight" and "Completed" event logs
//!
//! Both lists are most-recent-first. An entry is presented into the in-flight
//! list as soon as its event is accepted and promoted to the completed list
//! when its animation finishes.

use std::collections::VecDeque;

use tracing::trace;

use super::events::{Event, EventId};
use super::surface::RenderSurface;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub event: Event,
    pub source_node: String,
    pub target_node: String,
    /// Connecting edge, if the diagram has one
    pub edge_id: Option<String>,
    /// Whether the extra-fields block is shown
    pub expanded: bool,
}

impl LogEntry {
    pub fn id(&self) -> &str {
        &self.event.id
    }

    /// Node and edge ids associated with this entry
    fn elements(&self) -> impl Iterator<Item = &str> {
        [Some(self.source_node.as_str()), Some(self.target_node.as_str()), self.edge_id.as_deref()]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Default)]
pub struct LogPanel {
    current: VecDeque<LogEntry>,
    completed: VecDeque<LogEntry>,
    hovered: Option<EventId>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the head of the in-flight list
    pub fn present(&mut self, entry: LogEntry) {
        trace!(event_id = %entry.event.id, "Presenting event");
        self.current.push_front(entry);
    }

    /// Move an entry from in-flight to the head of completed
    ///
    /// Returns false if the id is not in flight.
    pub fn promote(&mut self, event_id: &str) -> bool {
        let Some(idx) = self.current.iter().position(|e| e.id() == event_id) else {
            return false;
        };
        if let Some(entry) = self.current.remove(idx) {
            trace!(event_id, "Promoting event to completed");
            self.completed.push_front(entry);
        }
        true
    }

    /// Flip the extra-fields block of an entry in either list
    pub fn toggle_expanded(&mut self, event_id: &str) {
        if let Some(entry) = self
            .current
            .iter_mut()
            .chain(self.completed.iter_mut())
            .find(|e| e.id() == event_id)
        {
            entry.expanded = !entry.expanded;
        }
    }

    /// Track the hovered entry and highlight its node/edge pair
    ///
    /// Highlights are counted by the surface, so leaving an entry never clears
    /// a running animation's highlight on shared elements.
    pub fn hover(&mut self, event_id: Option<&str>, surface: &mut dyn RenderSurface) {
        if self.hovered.as_deref() == event_id {
            return;
        }
        if let Some(prev) = self.hovered.take() {
            if let Some(entry) = self.find(&prev) {
                for element in entry.elements() {
                    surface.clear_highlight(element);
                }
            }
        }
        if let Some(id) = event_id {
            if let Some(entry) = self.find(id) {
                for element in entry.elements() {
                    surface.highlight(element);
                }
                self.hovered = Some(id.to_string());
            }
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn find(&self, event_id: &str) -> Option<&LogEntry> {
        self.current
            .iter()
            .chain(self.completed.iter())
            .find(|e| e.id() == event_id)
    }

    pub fn is_current(&self, event_id: &str) -> bool {
        self.current.iter().any(|e| e.id() == event_id)
    }

    pub fn is_completed(&self, event_id: &str) -> bool {
        self.completed.iter().any(|e| e.id() == event_id)
    }

    pub fn current(&self) -> impl Iterator<Item = &LogEntry> {
        self.current.iter()
    }

    pub fn completed(&self) -> impl Iterator<Item = &LogEntry> {
        self.completed.iter()
    }

    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }
}
