//! Browser viewer

use std::sync::Arc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::config::{ws_url_for_page, ReconnectConfig};
use crate::infrastructure::render::{CanvasContext, ElementContainer, RenderSurface, WindowDisplay};
use crate::infrastructure::websocket::{ConnectionManager, PlatformScheduler, PlatformTransport};
use crate::session::Session;

/// Socket URL for the page the viewer is served from.
pub fn page_ws_url() -> Result<String, JsValue> {
    let location = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .location();
    Ok(ws_url_for_page(&location.protocol()?, &location.host()?))
}

/// Mount the viewer onto the `<canvas>` with id `canvas_id`.
///
/// The canvas is sized to its parent element and rescaled whenever the
/// window resizes. The session lives for the rest of the page.
pub fn mount(canvas_id: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id `{canvas_id}`")))?
        .dyn_into()?;
    let parent: HtmlElement = canvas
        .parent_element()
        .ok_or_else(|| JsValue::from_str("canvas has no parent"))?
        .dyn_into()?;
    let container = ElementContainer::new(parent);

    let context = CanvasContext::new(canvas).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let mut surface = RenderSurface::new(Box::new(WindowDisplay));
    surface
        .bind(&container, context)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let connection = ConnectionManager::open(
        page_ws_url()?,
        ReconnectConfig::default(),
        Arc::new(PlatformTransport::new()),
        Arc::new(PlatformScheduler::new()),
    );
    let session = Session::start(connection, surface);

    let on_resize = Closure::<dyn FnMut()>::new(move || {
        if let Err(e) = session.resize(&container) {
            tracing::error!("Failed to rescale surface: {}", e);
        }
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    // The listener (and the session it owns) lives as long as the page.
    on_resize.forget();

    Ok(())
}
