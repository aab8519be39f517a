//! Log name → node id resolution
//!
//! Events name their endpoints by log name. The mapping file translates
//! diagram labels into log names, but authoring is manual and often partial,
//! so resolution falls back to matching the raw label.

use std::collections::HashMap;

use tracing::trace;

use super::graph::{GraphDescription, NameMapping};

#[derive(Debug, Default)]
pub struct NameResolver {
    /// label → node id (last node wins on duplicate labels)
    label_to_id: HashMap<String, String>,
    /// log name → node id
    log_name_to_id: HashMap<String, String>,
    /// (label, node id) in document order, for the fallback scan
    nodes: Vec<(String, String)>,
}

impl NameResolver {
    pub fn new(graph: &GraphDescription, mapping: &NameMapping) -> Self {
        let mut label_to_id = HashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            if !node.label.is_empty() {
                label_to_id.insert(node.label.clone(), node.id.clone());
            }
        }

        // Explicit mapping entries first, so they win over raw labels
        let mut log_name_to_id = HashMap::with_capacity(label_to_id.len());
        for (label, log_name) in mapping.iter().filter(|(_, name)| !name.is_empty()) {
            match label_to_id.get(label) {
                Some(id) => {
                    log_name_to_id.insert(log_name.to_string(), id.clone());
                }
                None => trace!(label, log_name, "Mapping entry has no matching node"),
            }
        }
        for node in graph.nodes.iter().filter(|n| !n.label.is_empty()) {
            if mapping.log_name(&node.label).is_none() {
                log_name_to_id
                    .entry(node.label.clone())
                    .or_insert_with(|| node.id.clone());
            }
        }

        let nodes = graph
            .nodes
            .iter()
            .map(|n| (n.label.clone(), n.id.clone()))
            .collect();

        Self {
            label_to_id,
            log_name_to_id,
            nodes,
        }
    }

    /// Resolve a log name to a node id
    ///
    /// Consults the log-name index first, then scans nodes for an exact label
    /// match. Pure: repeated calls return the same answer.
    pub fn resolve(&self, log_name: &str) -> Option<&str> {
        if let Some(id) = self.log_name_to_id.get(log_name) {
            return Some(id.as_str());
        }
        self.nodes
            .iter()
            .find(|(label, _)| !label.is_empty() && label == log_name)
            .map(|(_, id)| id.as_str())
    }

    /// Node id for an exact diagram label
    pub fn node_for_label(&self, label: &str) -> Option<&str> {
        self.label_to_id.get(label).map(String::as_str)
    }

    pub fn log_name_count(&self) -> usize {
        self.log_name_to_id.len()
    }
}
