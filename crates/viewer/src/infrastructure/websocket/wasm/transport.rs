//! WASM WebSocket transport using web-sys

use std::cell::RefCell;

use anyhow::Result;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::ports::outbound::{TransportEvents, TransportPort};

/// Storage for WebSocket event closures; dropping them detaches the handlers.
struct WasmClosures {
    #[allow(dead_code)]
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    #[allow(dead_code)]
    onopen: Closure<dyn FnMut()>,
    #[allow(dead_code)]
    onclose: Closure<dyn FnMut(CloseEvent)>,
    #[allow(dead_code)]
    onerror: Closure<dyn FnMut(Event)>,
}

struct Socket {
    ws: WebSocket,
    _closures: WasmClosures,
}

impl Socket {
    fn detach(&self) {
        self.ws.set_onmessage(None);
        self.ws.set_onopen(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
    }
}

/// WebSocket transport for browser builds.
///
/// The browser is single threaded; `SendWrapper` lets the transport satisfy
/// the port's `Send + Sync` bound.
pub struct WebSocketTransport {
    socket: SendWrapper<RefCell<Option<Socket>>>,
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self {
            socket: SendWrapper::new(RefCell::new(None)),
        }
    }
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn drop_socket(&self) -> Option<WebSocket> {
        let socket = self.socket.borrow_mut().take()?;
        socket.detach();
        Some(socket.ws)
    }
}

impl TransportPort for WebSocketTransport {
    fn open(&self, url: &str, events: TransportEvents) -> Result<()> {
        if let Some(previous) = self.drop_socket() {
            let _ = previous.close();
        }

        let ws = WebSocket::new(url)
            .map_err(|e| anyhow::anyhow!("Failed to create WebSocket: {:?}", e))?;

        let on_message_events = events.clone();
        let onmessage = Closure::<dyn FnMut(_)>::new(move |e: MessageEvent| {
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                on_message_events.message(txt.into());
            } else {
                tracing::debug!("Ignoring non-text frame");
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let on_open_events = events.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            on_open_events.opened();
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let on_close_events = events.clone();
        let onclose = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            tracing::info!("WebSocket closed (code {})", e.code());
            on_close_events.closed();
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        let onerror = Closure::<dyn FnMut(_)>::new(move |_e: Event| {
            events.error("WebSocket error".to_string());
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        *self.socket.borrow_mut() = Some(Socket {
            ws,
            _closures: WasmClosures {
                onmessage,
                onopen,
                onclose,
                onerror,
            },
        });
        Ok(())
    }

    fn send(&self, text: String) -> Result<()> {
        let socket = self.socket.borrow();
        let Some(socket) = socket.as_ref() else {
            return Err(anyhow::anyhow!("Not connected"));
        };
        socket
            .ws
            .send_with_str(&text)
            .map_err(|e| anyhow::anyhow!("Failed to send: {:?}", e))
    }

    fn close(&self) {
        if let Some(ws) = self.drop_socket() {
            let _ = ws.close();
        }
    }
}
