//! WASM platform adapters using web-sys

mod scheduler;
mod transport;

pub use scheduler::TimeoutScheduler;
pub use transport::WebSocketTransport;
