//! Platform-agnostic core module - shared between the viewer and CLI

pub mod animation;
pub mod events;
pub mod graph;
pub mod log_panel;
pub mod parser;
pub mod poller;
pub mod resolver;
pub mod scheduler;
pub mod surface;

pub use animation::{MarkerAnimation, MarkerId};
pub use events::{Event, EventDetails, EventId};
pub use graph::{
    CurveStyle, EdgeIndex, GraphDescription, GraphEdge, GraphError, GraphNode, NameMapping,
    NodeShape, Position,
};
pub use log_panel::{LogEntry, LogPanel};
pub use parser::parse_events;
pub use poller::Poller;
pub use resolver::NameResolver;
pub use scheduler::{
    AnimationMode, EnqueueOutcome, EventPhase, Scheduler, SchedulerConfig, SchedulerStats,
};
pub use surface::{HeadlessSurface, RenderSurface};
