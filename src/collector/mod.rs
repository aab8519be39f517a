//! Event collector: HTTP ingress and a bounded window of recent events
//!
//! Producers `POST /events`; viewers poll `GET /events` and fetch the graph
//! artifacts from the same origin.

pub mod api;
pub mod config;
pub mod server;
pub mod store;

pub use api::{create_router, ApiState};
pub use config::CollectorConfig;
pub use server::CollectorServer;
pub use store::{EventLog, LogStats, StoredEvent, DEFAULT_CAPACITY};
