//! Native fetch client for the viewer
//!
//! Runs a tokio runtime in a background thread. The app asks for a poll
//! through a command channel and drains results from an mpsc receiver.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::fetch::{CollectorClient, FetchMessage};
use crate::link_state::LinkState;

enum Command {
    Poll,
}

pub struct NativeFetchClient {
    /// Receiver for fetch results
    pub rx: Receiver<FetchMessage>,
    /// Shared link state
    pub state: Arc<Mutex<LinkState>>,
    commands: tokio::sync::mpsc::UnboundedSender<Command>,
}

impl NativeFetchClient {
    /// Start loading the graph from `base_url`
    ///
    /// Spawns a background thread with a tokio runtime to perform requests.
    pub fn connect(base_url: &str) -> Self {
        let (tx, rx): (Sender<FetchMessage>, Receiver<FetchMessage>) = mpsc::channel();
        let (commands, command_rx) = tokio::sync::mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(LinkState::Loading));

        let client = CollectorClient::new(base_url);
        let state_clone = state.clone();

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "Failed to create tokio runtime");
                    *state_clone.lock() = LinkState::Failed(e.to_string());
                    return;
                }
            };
            rt.block_on(async move {
                Self::run(client, tx, command_rx, state_clone).await;
            });
        });

        Self {
            rx,
            state,
            commands,
        }
    }

    /// Request one events fetch; the result arrives on `rx`
    pub fn request_poll(&self) {
        if self.commands.send(Command::Poll).is_err() {
            warn!("Fetch thread has exited");
        }
    }

    async fn run(
        client: CollectorClient,
        tx: Sender<FetchMessage>,
        mut commands: tokio::sync::mpsc::UnboundedReceiver<Command>,
        state: Arc<Mutex<LinkState>>,
    ) {
        info!(url = client.base_url(), "Loading graph");

        match client.fetch_graph().await {
            Ok(loaded) => {
                *state.lock() = LinkState::Ready;
                if tx.send(FetchMessage::Graph(Box::new(loaded))).is_err() {
                    return;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to load graph");
                *state.lock() = LinkState::Failed(e.to_string());
                let _ = tx.send(FetchMessage::GraphFailed(e.to_string()));
                return;
            }
        }

        while let Some(Command::Poll) = commands.recv().await {
            let message = match client.fetch_events().await {
                Ok(events) => {
                    *state.lock() = LinkState::Ready;
                    FetchMessage::Events(events)
                }
                Err(e) => {
                    warn!(error = %e, "Poll failed");
                    *state.lock() = LinkState::Degraded(e.to_string());
                    FetchMessage::PollFailed(e.to_string())
                }
            };
            if tx.send(message).is_err() {
                // Receiver dropped, exit
                break;
            }
        }
    }
}
