//! WASM fetch client for the viewer

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{error, info, warn};

use crate::fetch::{CollectorClient, FetchMessage};
use crate::link_state::LinkState;

/// Shared result buffer: fetch futures push, app drains in update()
pub type MessageBuffer = Rc<RefCell<VecDeque<FetchMessage>>>;

pub struct WasmFetchClient {
    client: CollectorClient,
    buffer: MessageBuffer,
    state: Rc<RefCell<LinkState>>,
}

impl WasmFetchClient {
    /// Start loading the graph from `base_url`
    pub fn connect(base_url: &str, buffer: MessageBuffer, state: Rc<RefCell<LinkState>>) -> Self {
        let client = CollectorClient::new(base_url);
        info!(url = client.base_url(), "Loading graph");

        let loader = client.clone();
        let buf = buffer.clone();
        let state_clone = state.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let message = match loader.fetch_graph().await {
                Ok(loaded) => {
                    *state_clone.borrow_mut() = LinkState::Ready;
                    FetchMessage::Graph(Box::new(loaded))
                }
                Err(e) => {
                    error!(error = %e, "Failed to load graph");
                    *state_clone.borrow_mut() = LinkState::Failed(e.to_string());
                    FetchMessage::GraphFailed(e.to_string())
                }
            };
            buf.borrow_mut().push_back(message);
        });

        Self {
            client,
            buffer,
            state,
        }
    }

    /// Request one events fetch; the result lands in the buffer
    pub fn request_poll(&self) {
        let client = self.client.clone();
        let buf = self.buffer.clone();
        let state = self.state.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let message = match client.fetch_events().await {
                Ok(events) => {
                    *state.borrow_mut() = LinkState::Ready;
                    FetchMessage::Events(events)
                }
                Err(e) => {
                    warn!(error = %e, "Poll failed");
                    *state.borrow_mut() = LinkState::Degraded(e.to_string());
                    FetchMessage::PollFailed(e.to_string())
                }
            };
            buf.borrow_mut().push_back(message);
        });
    }
}
