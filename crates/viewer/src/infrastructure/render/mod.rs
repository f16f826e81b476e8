//! Rendering: the pixel-density aware surface and the entity painter.
//!
//! Backends implement [`DrawingContextPort`](crate::ports::outbound::DrawingContextPort):
//! - `canvas`: `<canvas>` 2D context (wasm32 only)
//! - `recording`: in-memory command log for headless runs and tests

mod entity_renderer;
mod headless;
mod recording;
mod surface;

#[cfg(target_arch = "wasm32")]
mod canvas;

pub use entity_renderer::EntityRenderer;
pub use headless::{StaticContainer, StaticDisplay};
pub use recording::{DrawCommand, FilledCircle, RecordingContext};
pub use surface::RenderSurface;

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasContext, ElementContainer, WindowDisplay};
