//! Viewer error types

/// Errors raised on the connection side.
///
/// None of these escape the connection manager's event entry points; they are
/// logged and handed to the `on_issue` observer instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("No handler for event `{event}`")]
    Unhandled { event: String },

    #[error("Max reconnection attempts reached ({attempts})")]
    ReconnectExhausted { attempts: u32 },

    #[error("Not connected")]
    NotConnected,
}

impl ClientError {
    /// Terminal for the connection instance: nothing further is scheduled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::ReconnectExhausted { .. })
    }
}

/// Errors raised by the render surface and its drawing backends.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Render surface is not bound to a drawing context")]
    Unbound,

    #[error("Drawing backend error: {0}")]
    Backend(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid WebSocket URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
