//! Messaging infrastructure.
//!
//! - `connection`: connection lifecycle state
//! - `router`: event-name dispatch table for inbound envelopes

mod connection;
mod router;

pub use connection::ConnectionState;
pub use router::{EventRouter, Handler};
