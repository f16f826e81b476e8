//! Surface Ports - drawing context, container and display metrics
//!
//! The render surface works in logical units (CSS pixels). The drawing
//! context maps them to its backing buffer through a uniform scale equal to
//! the display's pixel density.

use crate::error::RenderError;

/// Size in logical units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp negative or non-finite dimensions to zero.
    pub fn sanitized(self) -> Self {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: clamp(self.width),
            height: clamp(self.height),
        }
    }

    /// Backing buffer size for this logical size at `density`, rounded down.
    pub fn to_physical(self, density: f64) -> PhysicalSize {
        let size = self.sanitized();
        PhysicalSize {
            width: (size.width * density).floor() as u32,
            height: (size.height * density).floor() as u32,
        }
    }
}

/// Size of the backing pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Port for a 2D drawing context and the element that owns its buffer
///
/// Mirrors the subset of the canvas 2D API the viewer uses.
pub trait DrawingContextPort {
    /// Set the display size and the backing buffer size.
    ///
    /// Resizing the backing buffer discards its contents.
    fn resize(&mut self, logical: LogicalSize, physical: PhysicalSize) -> Result<(), RenderError>;

    /// Replace the current transform with a uniform scale.
    fn set_scale(&mut self, factor: f64) -> Result<(), RenderError>;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn begin_path(&mut self);

    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<(), RenderError>;

    fn set_fill_style(&mut self, color: &str);

    fn fill(&mut self);
}

/// Port for the element the surface is sized to
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ContainerPort {
    /// Current size of the container in logical units.
    fn logical_size(&self) -> LogicalSize;
}

/// Port for display metrics
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DisplayMetricsPort: Send + Sync {
    /// Ratio of physical pixels to logical units.
    fn pixel_density(&self) -> f64;
}
