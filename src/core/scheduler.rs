//! Event-to-animation scheduler
//!
//! Turns an unordered stream of transmission events into marker animations
//! on the shared graph while keeping the in-flight/completed logs in step
//! with what is on screen.
//!
//! Every event moves `Pending → Animating → Completed`. Events whose
//! endpoints cannot be resolved are discarded before they become pending.
//!
//! The scheduler is single-threaded and frame-driven: [`Scheduler::tick`] is
//! called once per display refresh with the current time in milliseconds,
//! which is the only point where running animations advance. Two policies
//! decide what starts when the previous work finishes:
//!
//! - [`AnimationMode::Sequential`]: one event at a time, strictly in enqueue
//!   order.
//! - [`AnimationMode::Auto`]: every pending event starts together; the next
//!   batch starts once the whole batch has finished.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::animation::{MarkerAnimation, MarkerId};
use super::events::{Event, EventId};
use super::graph::{EdgeIndex, GraphDescription, NameMapping};
use super::log_panel::{LogEntry, LogPanel};
use super::resolver::NameResolver;
use super::surface::RenderSurface;
use crate::error::{Error, Result};

pub const DEFAULT_SPEED_MS: u32 = 1000;
pub const DEFAULT_ATTENTION_COLOR: &str = "#ff0000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    #[default]
    Sequential,
    Auto,
}

impl AnimationMode {
    pub const ALL: &'static [AnimationMode] = &[AnimationMode::Sequential, AnimationMode::Auto];

    pub fn label(self) -> &'static str {
        match self {
            AnimationMode::Sequential => "sequential",
            AnimationMode::Auto => "auto",
        }
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnimationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(AnimationMode::Sequential),
            "auto" => Ok(AnimationMode::Auto),
            other => Err(Error::config(format!("unknown animation mode {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub mode: AnimationMode,
    /// Marker travel time in milliseconds, always positive
    pub speed_ms: u32,
    /// Edge color while an animation runs on it
    pub attention_color: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: AnimationMode::default(),
            speed_ms: DEFAULT_SPEED_MS,
            attention_color: DEFAULT_ATTENTION_COLOR.to_string(),
        }
    }
}

/// Result of offering an event to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Accepted,
    /// Source or target did not resolve to a node
    Discarded {
        source: String,
        deliver_to: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    Pending,
    Animating,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub accepted: u64,
    pub discarded: u64,
    pub completed: u64,
    /// Completed without a marker because no edge joins the pair
    pub missing_edge: u64,
}

/// Nodes reserved by running animations, counted per node
///
/// Advisory only: starting an animation never waits on it, so two animations
/// may share nodes and edges.
#[derive(Debug, Default)]
pub struct ActiveNodes {
    counts: HashMap<String, usize>,
}

impl ActiveNodes {
    fn acquire(&mut self, node_id: &str) {
        *self.counts.entry(node_id.to_string()).or_default() += 1;
    }

    fn release(&mut self, node_id: &str) {
        if let Some(count) = self.counts.get_mut(node_id) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(node_id);
            }
        }
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.counts.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone)]
struct PendingEvent {
    event_id: EventId,
    source_node: String,
    target_node: String,
}

pub struct Scheduler {
    resolver: NameResolver,
    edges: EdgeIndex,
    config: SchedulerConfig,
    pending: VecDeque<PendingEvent>,
    running: Vec<MarkerAnimation>,
    active: ActiveNodes,
    /// Set while a drain is in progress; re-entrant drains are no-ops
    is_animating: bool,
    log: LogPanel,
    next_marker: MarkerId,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new(graph: &GraphDescription, mapping: &NameMapping, config: SchedulerConfig) -> Self {
        let resolver = NameResolver::new(graph, mapping);
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            log_names = resolver.log_name_count(),
            mode = %config.mode,
            speed_ms = config.speed_ms,
            "Scheduler ready"
        );
        Self {
            resolver,
            edges: EdgeIndex::new(graph),
            config,
            pending: VecDeque::new(),
            running: Vec::new(),
            active: ActiveNodes::default(),
            is_animating: false,
            log: LogPanel::new(),
            next_marker: 0,
            stats: SchedulerStats::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Switch policy; animations already started keep running
    pub fn set_mode(&mut self, mode: AnimationMode) {
        if self.config.mode != mode {
            debug!(from = %self.config.mode, to = %mode, "Animation mode changed");
            self.config.mode = mode;
        }
    }

    /// Change the travel time for animations started from now on
    pub fn set_speed(&mut self, speed_ms: u32) -> Result<()> {
        if speed_ms == 0 {
            return Err(Error::config("animation speed must be a positive number of milliseconds"));
        }
        self.config.speed_ms = speed_ms;
        Ok(())
    }

    /// Accept a newly observed event
    ///
    /// Resolved events are presented in the in-flight log right away, then
    /// queued; a drain starts if the scheduler is idle.
    pub fn enqueue(
        &mut self,
        event: Event,
        surface: &mut dyn RenderSurface,
        now: f64,
    ) -> EnqueueOutcome {
        let source_node = self.resolver.resolve(event.source()).map(str::to_owned);
        let target_node = self.resolver.resolve(event.deliver_to()).map(str::to_owned);

        let (Some(source_node), Some(target_node)) = (source_node, target_node) else {
            warn!(
                event_id = %event.id,
                source = event.source(),
                deliver_to = event.deliver_to(),
                "Nodes not found for event, discarding"
            );
            self.stats.discarded += 1;
            return EnqueueOutcome::Discarded {
                source: event.source().to_string(),
                deliver_to: event.deliver_to().to_string(),
            };
        };

        let edge_id = self
            .edges
            .find(&source_node, &target_node)
            .map(str::to_owned);
        let event_id = event.id.clone();

        debug!(
            event_id = %event_id,
            source_node = %source_node,
            target_node = %target_node,
            "Event accepted"
        );

        self.log.present(LogEntry {
            event,
            source_node: source_node.clone(),
            target_node: target_node.clone(),
            edge_id,
            expanded: false,
        });
        self.pending.push_back(PendingEvent {
            event_id,
            source_node,
            target_node,
        });
        self.stats.accepted += 1;

        self.drain(surface, now);
        EnqueueOutcome::Accepted
    }

    /// Start working through the pending queue
    ///
    /// No-op while a drain is already in progress; the running drain picks
    /// up anything queued in the meantime.
    pub fn drain(&mut self, surface: &mut dyn RenderSurface, now: f64) {
        if self.is_animating {
            return;
        }
        self.is_animating = true;
        self.start_next(surface, now);
    }

    /// Advance running animations to `now`
    pub fn tick(&mut self, surface: &mut dyn RenderSurface, now: f64) {
        if !self.is_animating {
            return;
        }

        let mut finished = Vec::new();
        for anim in &self.running {
            let frame = anim.sample(now);
            surface.move_marker(anim.marker, frame.position);
            if frame.is_final() {
                finished.push(anim.marker);
            }
        }

        if !finished.is_empty() {
            let (done, still_running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.running)
                .into_iter()
                .partition(|anim| finished.contains(&anim.marker));
            self.running = still_running;
            for anim in done {
                self.finish(anim, surface);
            }
        }

        if self.running.is_empty() {
            self.start_next(surface, now);
        }
    }

    /// Start the next unit of work for the current policy, or go idle
    fn start_next(&mut self, surface: &mut dyn RenderSurface, now: f64) {
        loop {
            let batch: Vec<PendingEvent> = match self.config.mode {
                AnimationMode::Sequential => self.pending.pop_front().into_iter().collect(),
                AnimationMode::Auto => self.pending.drain(..).collect(),
            };
            if batch.is_empty() {
                self.is_animating = false;
                return;
            }

            for pending in batch {
                self.animate(pending, surface, now);
            }

            // Batches made only of edgeless events finish instantly.
            if !self.running.is_empty() {
                return;
            }
        }
    }

    /// Begin one event's animation, completing it at once when it has no edge
    fn animate(&mut self, pending: PendingEvent, surface: &mut dyn RenderSurface, now: f64) {
        let PendingEvent {
            event_id,
            source_node,
            target_node,
        } = pending;

        self.active.acquire(&source_node);
        self.active.acquire(&target_node);

        let edge_id = self.edges.find(&source_node, &target_node).map(str::to_owned);
        let positions = (
            surface.rendered_position(&source_node),
            surface.rendered_position(&target_node),
        );

        let (Some(edge_id), (Some(from), Some(to))) = (edge_id, positions) else {
            warn!(
                event_id = %event_id,
                source_node = %source_node,
                target_node = %target_node,
                "Edge not found between nodes"
            );
            self.active.release(&source_node);
            self.active.release(&target_node);
            self.log.promote(&event_id);
            self.stats.missing_edge += 1;
            self.stats.completed += 1;
            return;
        };

        surface.highlight(&source_node);
        surface.highlight(&target_node);
        surface.highlight(&edge_id);
        surface.recolor_edge(&edge_id, &self.config.attention_color);

        let marker = self.next_marker;
        self.next_marker += 1;
        surface.move_marker(marker, from);

        debug!(
            event_id = %event_id,
            edge_id = %edge_id,
            marker,
            duration_ms = self.config.speed_ms,
            "Animation started"
        );

        self.running.push(MarkerAnimation {
            marker,
            event_id,
            edge_id,
            source_node,
            target_node,
            from,
            to,
            started_at: now,
            duration_ms: self.config.speed_ms,
        });
    }

    fn finish(&mut self, anim: MarkerAnimation, surface: &mut dyn RenderSurface) {
        surface.remove_marker(anim.marker);
        surface.restore_edge_color(&anim.edge_id);
        surface.clear_highlight(&anim.source_node);
        surface.clear_highlight(&anim.target_node);
        surface.clear_highlight(&anim.edge_id);

        self.active.release(&anim.source_node);
        self.active.release(&anim.target_node);
        self.log.promote(&anim.event_id);
        self.stats.completed += 1;

        debug!(event_id = %anim.event_id, "Animation completed");
    }

    /// Where an accepted event currently is
    pub fn phase_of(&self, event_id: &str) -> Option<EventPhase> {
        if self.running.iter().any(|a| a.event_id == event_id) {
            Some(EventPhase::Animating)
        } else if self.pending.iter().any(|p| p.event_id == event_id) {
            Some(EventPhase::Pending)
        } else if self.log.is_completed(event_id) {
            Some(EventPhase::Completed)
        } else {
            None
        }
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn running(&self) -> &[MarkerAnimation] {
        &self.running
    }

    pub fn active_nodes(&self) -> &ActiveNodes {
        &self.active
    }

    pub fn log(&self) -> &LogPanel {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut LogPanel {
        &mut self.log
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}
