//! Platform entry points used by the binary
//!
//! - `desktop`: headless viewer on tokio, configured from the environment
//! - `web`: mounts the viewer onto a `<canvas>` in the page

#[cfg(not(target_arch = "wasm32"))]
pub mod desktop;

#[cfg(target_arch = "wasm32")]
pub mod web;
