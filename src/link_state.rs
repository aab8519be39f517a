//! Shared collector link state
//!
//! Used by both the WASM and native fetch clients.

/// Progress of loading the diagram and polling the collector
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LinkState {
    /// Diagram not loaded yet
    #[default]
    Loading,
    /// Diagram loaded, last poll succeeded
    Ready,
    /// Diagram loaded, last poll failed; polling continues
    Degraded(String),
    /// Diagram could not be loaded; nothing will be drawn
    Failed(String),
}

impl LinkState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LinkState::Ready)
    }

    pub fn label(&self) -> &str {
        match self {
            LinkState::Loading => "Loading",
            LinkState::Ready => "Live",
            LinkState::Degraded(_) => "Poll failed",
            LinkState::Failed(_) => "Load failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LinkState::Degraded(e) | LinkState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_only_on_failure_states() {
        assert!(LinkState::Ready.is_ready());
        assert_eq!(LinkState::default(), LinkState::Loading);
        assert_eq!(LinkState::Loading.error(), None);
        assert_eq!(LinkState::Degraded("timeout".into()).error(), Some("timeout"));
        assert!(!LinkState::Failed("404".into()).is_ready());
    }
}
