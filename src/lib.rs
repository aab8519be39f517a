//! archflow - live event flow over an architecture diagram
//!
//! A diagram exported from draw.io is converted into a graph description.
//! The collector buffers posted events, and the viewer (native or browser)
//! polls them and animates each one as a marker travelling along its edge
//! while keeping an "in flight" / "completed" log.

pub mod convert;
pub mod core;
pub mod error;
pub mod fetch;
pub mod link_state;

#[cfg(any(not(target_arch = "wasm32"), feature = "wasm"))]
pub mod time;

#[cfg(all(feature = "cli", not(target_arch = "wasm32")))]
pub mod collector;

#[cfg(any(
    all(feature = "viewer", not(target_arch = "wasm32")),
    all(feature = "wasm", target_arch = "wasm32")
))]
pub mod app;
#[cfg(any(
    all(feature = "viewer", not(target_arch = "wasm32")),
    all(feature = "wasm", target_arch = "wasm32")
))]
pub mod theme;

#[cfg(all(feature = "viewer", not(target_arch = "wasm32")))]
mod fetch_native;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod fetch_wasm;

pub use error::{Error, Result};

// ============================================================================
// Browser entry point
// ============================================================================

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod web {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::{ArchflowApp, ViewerSettings};

    const CANVAS_ID: &str = "archflow_canvas";

    /// `window.__archflow_url` if the page set it, else the page origin
    fn collector_url() -> String {
        let configured = js_sys::eval("window.__archflow_url")
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.is_empty());
        configured
            .or_else(|| web_sys::window().and_then(|w| w.location().origin().ok()))
            .unwrap_or_else(|| crate::fetch::DEFAULT_COLLECTOR_URL.to_string())
    }

    fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(CANVAS_ID)?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .ok()
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        let web_options = eframe::WebOptions::default();
        let url = collector_url();

        wasm_bindgen_futures::spawn_local(async move {
            let Some(canvas) = find_canvas() else {
                tracing::error!(id = CANVAS_ID, "Canvas element not found");
                return;
            };

            let result = eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(move |cc| Ok(Box::new(ArchflowApp::new(cc, url, ViewerSettings::default())))),
                )
                .await;
            if let Err(e) = result {
                tracing::error!(error = ?e, "Failed to start eframe");
            }
        });
    }
}
