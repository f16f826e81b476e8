//! In-memory drawing context
//!
//! Behaves like a canvas 2D context closely enough to check what a draw pass
//! would put on screen: resizing wipes the buffer and resets the transform and
//! fill style, fills paint every arc of the current path, and a negative
//! radius is rejected.

use microbiome_protocol::Position;

use crate::error::RenderError;
use crate::ports::outbound::{DrawingContextPort, LogicalSize, PhysicalSize};

const DEFAULT_FILL_STYLE: &str = "#000000";

/// One call made on the context.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize {
        logical: LogicalSize,
        physical: PhysicalSize,
    },
    SetScale(f64),
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    BeginPath,
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    SetFillStyle(String),
    Fill,
}

/// A circle painted onto the buffer, in the units it was drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledCircle {
    pub center: Position,
    pub radius: f64,
    pub color: String,
}

impl FilledCircle {
    pub fn new(center: Position, radius: f64, color: impl Into<String>) -> Self {
        Self {
            center,
            radius,
            color: color.into(),
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            center: Position::new(self.center.x * factor, self.center.y * factor),
            radius: self.radius * factor,
            color: self.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PathArc {
    center: Position,
    radius: f64,
}

/// Drawing context that records calls instead of rasterizing.
///
/// Commands and painted circles are kept from the last resize or full clear.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    painted: Vec<(FilledCircle, f64)>,
    path: Vec<PathArc>,
    fill_style: String,
    scale: f64,
    logical: LogicalSize,
    physical: PhysicalSize,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            painted: Vec::new(),
            path: Vec::new(),
            fill_style: DEFAULT_FILL_STYLE.to_string(),
            scale: 1.0,
            logical: LogicalSize::default(),
            physical: PhysicalSize::default(),
        }
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Circles on the buffer in logical units, in paint order.
    pub fn filled_circles(&self) -> Vec<FilledCircle> {
        self.painted.iter().map(|(circle, _)| circle.clone()).collect()
    }

    /// Circles on the buffer in device pixels, using the transform each was
    /// painted with.
    pub fn device_circles(&self) -> Vec<FilledCircle> {
        self.painted
            .iter()
            .map(|(circle, scale)| circle.scaled(*scale))
            .collect()
    }

    /// Current uniform scale of the transform.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn display_size(&self) -> LogicalSize {
        self.logical
    }

    pub fn backing_size(&self) -> PhysicalSize {
        self.physical
    }

    fn covers_display(&self, x: f64, y: f64, width: f64, height: f64) -> bool {
        x <= 0.0 && y <= 0.0 && x + width >= self.logical.width && y + height >= self.logical.height
    }
}

impl DrawingContextPort for RecordingContext {
    fn resize(&mut self, logical: LogicalSize, physical: PhysicalSize) -> Result<(), RenderError> {
        self.commands.clear();
        self.painted.clear();
        self.path.clear();
        self.fill_style = DEFAULT_FILL_STYLE.to_string();
        self.scale = 1.0;
        self.logical = logical;
        self.physical = physical;
        self.commands.push(DrawCommand::Resize { logical, physical });
        Ok(())
    }

    fn set_scale(&mut self, factor: f64) -> Result<(), RenderError> {
        if !factor.is_finite() {
            return Err(RenderError::Backend(format!("non-finite scale {factor}")));
        }
        self.scale = factor;
        self.commands.push(DrawCommand::SetScale(factor));
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if self.covers_display(x, y, width, height) {
            self.commands.clear();
            self.painted.clear();
        }
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.commands.push(DrawCommand::BeginPath);
    }

    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<(), RenderError> {
        if radius < 0.0 {
            return Err(RenderError::Backend(format!("negative radius {radius}")));
        }
        self.path.push(PathArc {
            center: Position::new(x, y),
            radius,
        });
        self.commands.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
        Ok(())
    }

    fn set_fill_style(&mut self, color: &str) {
        self.fill_style = color.to_string();
        self.commands.push(DrawCommand::SetFillStyle(color.to_string()));
    }

    fn fill(&mut self) {
        for arc in &self.path {
            self.painted.push((
                FilledCircle::new(arc.center, arc.radius, self.fill_style.clone()),
                self.scale,
            ));
        }
        self.commands.push(DrawCommand::Fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_without_begin_path_repaints_previous_arcs() {
        let mut ctx = RecordingContext::new();
        ctx.begin_path();
        ctx.arc(1.0, 1.0, 1.0, 0.0, 1.0).expect("arc");
        ctx.set_fill_style("red");
        ctx.fill();
        ctx.arc(5.0, 5.0, 1.0, 0.0, 1.0).expect("arc");
        ctx.set_fill_style("blue");
        ctx.fill();

        let colors: Vec<String> = ctx.filled_circles().into_iter().map(|c| c.color).collect();
        assert_eq!(colors, vec!["red", "blue", "blue"]);
    }

    #[test]
    fn test_resize_resets_buffer_and_state() {
        let mut ctx = RecordingContext::new();
        ctx.set_scale(2.0).expect("scale");
        ctx.set_fill_style("red");
        ctx.begin_path();
        ctx.arc(1.0, 1.0, 1.0, 0.0, 1.0).expect("arc");
        ctx.fill();

        ctx.resize(LogicalSize::new(10.0, 10.0), PhysicalSize::new(10, 10))
            .expect("resize");

        assert!(ctx.filled_circles().is_empty());
        assert_eq!(ctx.scale(), 1.0);
        assert_eq!(ctx.commands().len(), 1);
        ctx.fill();
        assert!(ctx.filled_circles().is_empty());
    }

    #[test]
    fn test_full_clear_drops_painted_circles() {
        let mut ctx = RecordingContext::new();
        ctx.resize(LogicalSize::new(10.0, 10.0), PhysicalSize::new(20, 20))
            .expect("resize");
        ctx.begin_path();
        ctx.arc(1.0, 1.0, 1.0, 0.0, 1.0).expect("arc");
        ctx.fill();

        ctx.clear_rect(2.0, 2.0, 1.0, 1.0);
        assert_eq!(ctx.filled_circles().len(), 1);

        ctx.clear_rect(0.0, 0.0, 10.0, 10.0);
        assert!(ctx.filled_circles().is_empty());
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        let mut ctx = RecordingContext::new();
        assert!(matches!(
            ctx.arc(0.0, 0.0, -1.0, 0.0, 1.0),
            Err(RenderError::Backend(_))
        ));
    }
}
