//! Render surface
//!
//! Owns one drawing context and keeps its backing buffer in step with the
//! container size and the display's pixel density. Callers work in logical
//! units; the context transform maps them to device pixels.

use microbiome_protocol::FrameData;

use super::entity_renderer::EntityRenderer;
use crate::error::RenderError;
use crate::ports::outbound::{
    ContainerPort, DisplayMetricsPort, DrawingContextPort, LogicalSize, PhysicalSize,
};

/// Density used when the display reports a non-finite or non-positive ratio.
const FALLBACK_DENSITY: f64 = 1.0;

pub struct RenderSurface<C: DrawingContextPort> {
    context: Option<C>,
    display: Box<dyn DisplayMetricsPort>,
    logical: LogicalSize,
    physical: PhysicalSize,
    density: f64,
}

impl<C: DrawingContextPort> RenderSurface<C> {
    /// Create an unbound surface reading pixel density from `display`.
    pub fn new(display: Box<dyn DisplayMetricsPort>) -> Self {
        Self {
            context: None,
            display,
            logical: LogicalSize::default(),
            physical: PhysicalSize::default(),
            density: FALLBACK_DENSITY,
        }
    }

    /// Take ownership of `context` and size it to `container`.
    ///
    /// A previously bound context is dropped.
    pub fn bind(&mut self, container: &dyn ContainerPort, context: C) -> Result<(), RenderError> {
        self.context = Some(context);
        self.scale(container)
    }

    /// Re-read the container size and pixel density and resize the buffer.
    ///
    /// The transform is replaced, not multiplied, so calling this repeatedly
    /// with the same inputs leaves the context unchanged.
    pub fn scale(&mut self, container: &dyn ContainerPort) -> Result<(), RenderError> {
        let density = effective_density(self.display.pixel_density());
        let context = self.context.as_mut().ok_or(RenderError::Unbound)?;

        let logical = container.logical_size().sanitized();
        let physical = logical.to_physical(density);
        context.resize(logical, physical)?;
        // The buffer now has the new size even if the transform below fails.
        self.logical = logical;
        self.physical = physical;

        context.set_scale(density)?;
        self.density = density;
        tracing::debug!(
            "Surface scaled to {}x{} logical, {}x{} physical (density {})",
            logical.width,
            logical.height,
            physical.width,
            physical.height,
            density
        );
        Ok(())
    }

    /// Erase the whole logical region.
    pub fn clear(&mut self) -> Result<(), RenderError> {
        let LogicalSize { width, height } = self.logical;
        let context = self.context.as_mut().ok_or(RenderError::Unbound)?;
        context.clear_rect(0.0, 0.0, width, height);
        Ok(())
    }

    /// Repaint the surface from one frame: food first, then npcs, each in
    /// sequence order. The agent is not drawn.
    ///
    /// Returns how many entities were painted.
    pub fn draw(&mut self, frame: &FrameData) -> Result<usize, RenderError> {
        self.clear()?;
        let context = self.context.as_mut().ok_or(RenderError::Unbound)?;

        let mut painted = 0;
        for entity in frame.food.iter().chain(frame.npcs.iter()) {
            if EntityRenderer::draw_entity(context, entity)? {
                painted += 1;
            }
        }
        Ok(painted)
    }

    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    pub fn logical_size(&self) -> LogicalSize {
        self.logical
    }

    pub fn physical_size(&self) -> PhysicalSize {
        self.physical
    }

    pub fn pixel_density(&self) -> f64 {
        self.density
    }

    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }
}

fn effective_density(reported: f64) -> f64 {
    if reported.is_finite() && reported > 0.0 {
        reported
    } else {
        tracing::warn!("Ignoring pixel density {}, using {}", reported, FALLBACK_DENSITY);
        FALLBACK_DENSITY
    }
}
