//! WebSocket client for the simulation server
//!
//! Platform-specific implementations are in submodules:
//! - `desktop`: tokio-tungstenite transport, tokio timer
//! - `wasm`: web-sys WebSocket transport, gloo timer
//! - `core`: platform-agnostic connection state machine and backoff math
//! - `manager`: the connection manager that drives the state machine

mod core;
mod manager;
pub(crate) mod shared;

#[cfg(not(target_arch = "wasm32"))]
mod desktop;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use self::core::{BackoffState, ConnectionMachine, Effect};
pub use manager::ConnectionManager;

// Re-export platform-specific types with unified names
#[cfg(not(target_arch = "wasm32"))]
pub use desktop::{TokioScheduler as PlatformScheduler, TungsteniteTransport as PlatformTransport};

#[cfg(target_arch = "wasm32")]
pub use wasm::{TimeoutScheduler as PlatformScheduler, WebSocketTransport as PlatformTransport};
