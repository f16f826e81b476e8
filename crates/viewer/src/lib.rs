//! Microbiome Viewer.
//!
//! Realtime client for the microbiome simulation: keeps one WebSocket open to
//! the server (reconnecting with exponential backoff), routes `{event, data}`
//! envelopes by name, and paints each `"state"` frame onto a pixel-density
//! aware drawing surface.
//!
//! Multi-platform support is provided via compile-time `cfg` selection:
//! tokio-tungstenite on desktop, `web-sys` WebSocket and canvas on wasm32.

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod ports;
pub mod session;

// Re-export commonly used entrypoints
pub use config::{ws_url_for_page, ReconnectConfig, ViewerConfig};
pub use error::{ClientError, ConfigError, RenderError};
pub use infrastructure::messaging::{ConnectionState, EventRouter};
pub use infrastructure::render::{EntityRenderer, RenderSurface};
pub use infrastructure::websocket::ConnectionManager;
pub use session::Session;
