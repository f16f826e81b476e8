//! Microbiome Protocol - wire types for the viewer connection
//!
//! This crate contains the types exchanged over the viewer WebSocket:
//! - The `{event, data}` envelope wrapping every message
//! - Entity and frame snapshots published under the `"state"` event
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **WASM compatible** - Must compile for both native and wasm32 targets

pub mod entity;
pub mod envelope;

pub use entity::{Attribute, Entity, FrameData, Position};
pub use envelope::{Envelope, STATE_EVENT};
