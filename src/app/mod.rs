//! Shared archflow viewer app
//!
//! This module contains the egui app that runs on both native and WASM
//! platforms. Platform differences are limited to how fetch results reach
//! [`ArchflowApp::process_messages`].

mod canvas;
mod controls;
mod diagnostics;
mod header;
mod log_view;

use eframe::egui;
use tracing::{info, warn};

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::collections::VecDeque;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use parking_lot::Mutex;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

use crate::core::{Poller, Scheduler, SchedulerConfig};
use crate::fetch::{FetchMessage, LoadedGraph};
use crate::link_state::LinkState;
use crate::theme::{colors, minimal_visuals};
use crate::time::now_millis;

#[cfg(not(target_arch = "wasm32"))]
use crate::fetch_native::NativeFetchClient;
#[cfg(target_arch = "wasm32")]
use crate::fetch_wasm::{MessageBuffer, WasmFetchClient};

pub use canvas::{GraphCanvas, ViewTransform};
pub use controls::ViewerSettings;

/// Everything that exists once the diagram has loaded
pub(crate) struct LoadedView {
    pub scheduler: Scheduler,
    pub canvas: GraphCanvas,
}

/// Poll and event counters shown in the diagnostics window
#[derive(Debug, Default)]
pub(crate) struct PollStats {
    pub polls_ok: u64,
    pub polls_failed: u64,
    pub events_observed: u64,
}

/// archflow viewer - runs on both native and WASM
pub struct ArchflowApp {
    #[cfg(target_arch = "wasm32")]
    fetch: WasmFetchClient,
    #[cfg(target_arch = "wasm32")]
    msg_buffer: MessageBuffer,
    #[cfg(target_arch = "wasm32")]
    link: Rc<RefCell<LinkState>>,

    #[cfg(not(target_arch = "wasm32"))]
    fetch: NativeFetchClient,
    #[cfg(not(target_arch = "wasm32"))]
    link: Arc<Mutex<LinkState>>,

    pub(crate) base_url: String,
    pub(crate) view: Option<LoadedView>,
    poller: Poller,
    pub(crate) settings: ViewerSettings,
    pub(crate) fps_counter: header::FpsCounter,
    pub(crate) poll_stats: PollStats,
}

impl ArchflowApp {
    /// Create new app for WASM platform
    #[cfg(target_arch = "wasm32")]
    pub fn new(cc: &eframe::CreationContext<'_>, base_url: String, settings: ViewerSettings) -> Self {
        cc.egui_ctx.set_visuals(minimal_visuals());

        info!(url = %base_url, "Collector URL resolved");
        let link = Rc::new(RefCell::new(LinkState::Loading));
        let msg_buffer: MessageBuffer = Rc::new(RefCell::new(VecDeque::new()));
        let fetch = WasmFetchClient::connect(&base_url, msg_buffer.clone(), link.clone());

        Self {
            fetch,
            msg_buffer,
            link,
            base_url,
            view: None,
            poller: Poller::new(),
            settings,
            fps_counter: header::FpsCounter::new(),
            poll_stats: PollStats::default(),
        }
    }

    /// Create new app for native platform
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(cc: &eframe::CreationContext<'_>, base_url: String, settings: ViewerSettings) -> Self {
        cc.egui_ctx.set_visuals(minimal_visuals());

        info!(url = %base_url, "Collector URL resolved");
        let fetch = NativeFetchClient::connect(&base_url);
        let link = fetch.state.clone();

        Self {
            fetch,
            link,
            base_url,
            view: None,
            poller: Poller::new(),
            settings,
            fps_counter: header::FpsCounter::new(),
            poll_stats: PollStats::default(),
        }
    }

    /// Get the current link state
    pub(crate) fn link_state(&self) -> LinkState {
        #[cfg(target_arch = "wasm32")]
        {
            self.link.borrow().clone()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.link.lock().clone()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn drain_messages(&mut self) -> Vec<FetchMessage> {
        self.fetch.rx.try_iter().collect()
    }

    #[cfg(target_arch = "wasm32")]
    fn drain_messages(&mut self) -> Vec<FetchMessage> {
        self.msg_buffer.borrow_mut().drain(..).collect()
    }

    /// Apply fetch results that arrived since the last frame
    fn process_messages(&mut self, now: f64) {
        for message in self.drain_messages() {
            match message {
                FetchMessage::Graph(loaded) => self.install_graph(*loaded),
                FetchMessage::GraphFailed(e) => warn!(error = %e, "Diagram unavailable"),
                FetchMessage::Events(window) => {
                    self.poller.finish();
                    self.poll_stats.polls_ok += 1;
                    let fresh = self.poller.observe(window);
                    self.poll_stats.events_observed += fresh.len() as u64;
                    if let Some(view) = &mut self.view {
                        for event in fresh {
                            view.scheduler.enqueue(event, &mut view.canvas, now);
                        }
                    }
                }
                FetchMessage::PollFailed(_) => {
                    self.poller.finish();
                    self.poll_stats.polls_failed += 1;
                }
            }
        }
    }

    fn install_graph(&mut self, loaded: LoadedGraph) {
        let config = SchedulerConfig {
            mode: self.settings.mode,
            speed_ms: self.settings.speed_ms,
            ..SchedulerConfig::default()
        };
        let scheduler = Scheduler::new(&loaded.graph, &loaded.mapping, config);
        let canvas = GraphCanvas::new(loaded.graph);
        self.view = Some(LoadedView { scheduler, canvas });
    }

    /// Kick off a poll if one is due; polling starts once the diagram is in
    fn maybe_poll(&mut self, now: f64) {
        if self.view.is_none() || !self.poller.is_due(now) {
            return;
        }
        self.poller.begin(now);
        self.fetch.request_poll();
    }

    /// Push changed controls into the scheduler
    fn apply_settings(&mut self) {
        let Some(view) = &mut self.view else {
            return;
        };
        if view.scheduler.config().speed_ms != self.settings.speed_ms {
            if let Err(e) = view.scheduler.set_speed(self.settings.speed_ms) {
                warn!(error = %e, "Rejected animation speed");
                self.settings.speed_ms = view.scheduler.config().speed_ms;
            }
        }
        view.scheduler.set_mode(self.settings.mode);
    }
}

impl eframe::App for ArchflowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Request continuous repaint for animation
        ctx.request_repaint();

        let now = now_millis();
        self.process_messages(now);
        self.maybe_poll(now);

        if let Some(view) = &mut self.view {
            view.scheduler.tick(&mut view.canvas, now);
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        if self.settings.show_controls {
            self.render_controls(ctx);
        }

        if self.settings.show_log {
            self.render_log(ctx);
        }

        self.draw_diagnostics(ctx);

        let (placeholder, placeholder_color) = match self.link_state() {
            LinkState::Failed(e) => (format!("Could not load diagram: {e}"), colors::ERROR),
            _ => (format!("Loading diagram from {}", self.base_url), colors::TEXT_SECONDARY),
        };

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| match &mut self.view {
                Some(view) => view.canvas.show(ui),
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(placeholder).color(placeholder_color));
                    });
                }
            });

        self.apply_settings();
    }
}
