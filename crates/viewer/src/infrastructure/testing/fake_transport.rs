//! Scripted transport for testing
//!
//! Records every `open`, `send` and `close` and lets the test play the
//! server's part: accept the handshake, deliver frames, drop the socket.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::ports::outbound::{TransportEvents, TransportPort};

#[derive(Default)]
struct State {
    sockets: Vec<TransportEvents>,
    opened_urls: Vec<String>,
    sent: Vec<String>,
    close_count: usize,
    fail_open: bool,
}

#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<State>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make subsequent `open` calls fail before a socket exists.
    pub fn set_fail_open(&self, fail: bool) {
        self.state().fail_open = fail;
    }

    pub fn open_count(&self) -> usize {
        self.state().opened_urls.len()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.state().opened_urls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state().close_count
    }

    /// Text frames passed to `send`, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    /// Event sink of the most recently opened socket.
    pub fn latest(&self) -> Option<TransportEvents> {
        self.state().sockets.last().cloned()
    }

    // The sink is cloned out so the manager can call back into the transport.
    fn with_latest(&self, f: impl FnOnce(&TransportEvents)) {
        if let Some(events) = self.latest() {
            f(&events);
        }
    }

    /// Complete the handshake of the latest socket.
    pub fn accept(&self) {
        self.with_latest(|events| events.opened());
    }

    /// Deliver a text frame on the latest socket.
    pub fn deliver(&self, text: &str) {
        self.with_latest(|events| events.message(text.to_string()));
    }

    /// Drop the latest socket from the server side.
    pub fn drop_connection(&self) {
        self.with_latest(|events| events.closed());
    }
}

impl TransportPort for FakeTransport {
    fn open(&self, url: &str, events: TransportEvents) -> Result<()> {
        let mut state = self.state();
        state.opened_urls.push(url.to_string());
        if state.fail_open {
            return Err(anyhow::anyhow!("connection refused"));
        }
        state.sockets.push(events);
        Ok(())
    }

    fn send(&self, text: String) -> Result<()> {
        self.state().sent.push(text);
        Ok(())
    }

    fn close(&self) {
        self.state().close_count += 1;
    }
}
