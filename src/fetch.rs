//! HTTP access to the collector
//!
//! Shared by the native and WASM clients and by the headless CLI. The graph
//! description and name mapping are fetched once at startup; events are
//! fetched once per poll cycle.

use tracing::{debug, info};

use crate::core::{parse_events, Event, GraphDescription, NameMapping};
use crate::error::{Error, Result};

/// Collector address used when nothing else is configured
pub const DEFAULT_COLLECTOR_URL: &str = "http://127.0.0.1:5000";

/// Diagram plus mapping, as loaded at startup
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: GraphDescription,
    pub mapping: NameMapping,
}

/// Results delivered from a fetch client to the app
#[derive(Debug)]
pub enum FetchMessage {
    Graph(Box<LoadedGraph>),
    GraphFailed(String),
    /// One poll window, in server order
    Events(Vec<Event>),
    PollFailed(String),
}

#[derive(Debug, Clone)]
pub struct CollectorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CollectorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::transport(format!("{url}: {e}")))?;
        response
            .text()
            .await
            .map_err(|e| Error::transport(format!("{url}: {e}")))
    }

    /// Fetch and validate `objects.json` and `mapping.json`
    pub async fn fetch_graph(&self) -> Result<LoadedGraph> {
        let (objects, mapping) = futures_util::try_join!(
            self.get_text("/objects.json"),
            self.get_text("/mapping.json"),
        )?;
        let graph = GraphDescription::from_json(&objects)?;
        let mapping = NameMapping::from_json(&mapping)?;
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            mapping_entries = mapping.len(),
            "Graph loaded"
        );
        Ok(LoadedGraph { graph, mapping })
    }

    /// Fetch the collector's retained window
    pub async fn fetch_events(&self) -> Result<Vec<Event>> {
        let body = self.get_text("/events").await?;
        parse_events(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CollectorClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
