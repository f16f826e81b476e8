//! Transport Port - the duplex socket underneath the connection manager
//!
//! A transport owns at most one live socket. The connection manager opens a
//! socket per connection attempt and passes a fresh [`TransportEvents`] sink
//! with each `open`, so events from an abandoned socket can be told apart
//! from events of the current one.

use std::sync::Arc;

/// Receiver for socket lifecycle events.
///
/// Implemented by the connection manager; called by transport adapters.
pub trait TransportEventSink: Send + Sync {
    /// The socket finished its handshake.
    fn opened(&self);

    /// A text frame arrived.
    fn message(&self, text: String);

    /// The socket reported an error. A `closed` call always follows.
    fn error(&self, message: String);

    /// The socket is gone, whether it ever opened or not.
    fn closed(&self);
}

/// Shared handle to an event sink for one socket.
pub type TransportEvents = Arc<dyn TransportEventSink>;

/// Port for the platform socket
///
/// Implementations must not call into `events` synchronously from inside
/// `open`; every event is delivered later from the platform's event source.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TransportPort: Send + Sync {
    /// Open a new socket to `url`, replacing any previous one.
    fn open(&self, url: &str, events: TransportEvents) -> anyhow::Result<()>;

    /// Send a text frame on the current socket.
    fn send(&self, text: String) -> anyhow::Result<()>;

    /// Close the current socket, if any.
    fn close(&self);
}
