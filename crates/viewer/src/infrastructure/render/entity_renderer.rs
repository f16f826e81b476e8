//! Entity painter

use std::f64::consts::TAU;

use microbiome_protocol::Entity;

use crate::error::RenderError;
use crate::ports::outbound::DrawingContextPort;

/// Paints one entity as a filled circle. Holds no state.
pub struct EntityRenderer;

impl EntityRenderer {
    /// Draw `entity` onto `context` in logical units.
    ///
    /// Each entity gets its own path so fills never bleed between entities.
    /// Returns `Ok(false)` without touching the context when the entity has a
    /// non-finite position or a negative or non-finite radius.
    pub fn draw_entity<C>(context: &mut C, entity: &Entity) -> Result<bool, RenderError>
    where
        C: DrawingContextPort + ?Sized,
    {
        if !Self::is_drawable(entity) {
            tracing::trace!(
                "Skipping entity at ({}, {}) with radius {}",
                entity.position.x,
                entity.position.y,
                entity.radius
            );
            return Ok(false);
        }

        context.begin_path();
        context.arc(entity.position.x, entity.position.y, entity.radius, 0.0, TAU)?;
        context.set_fill_style(&entity.color);
        context.fill();
        Ok(true)
    }

    pub fn is_drawable(entity: &Entity) -> bool {
        entity.position.is_finite() && entity.radius.is_finite() && entity.radius >= 0.0
    }
}
