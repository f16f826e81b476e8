//! Infrastructure: platform adapters and the components built on them.

pub mod messaging;
pub mod platform;
pub mod render;
pub mod testing;
pub mod websocket;
