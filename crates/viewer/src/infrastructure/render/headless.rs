//! Fixed-size container and display for runs without a window

use crate::ports::outbound::{ContainerPort, DisplayMetricsPort, LogicalSize};

/// Container with a size set by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticContainer {
    pub size: LogicalSize,
}

impl StaticContainer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: LogicalSize::new(width, height),
        }
    }
}

impl ContainerPort for StaticContainer {
    fn logical_size(&self) -> LogicalSize {
        self.size
    }
}

/// Display reporting a fixed pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticDisplay {
    pub pixel_density: f64,
}

impl StaticDisplay {
    pub fn new(pixel_density: f64) -> Self {
        Self { pixel_density }
    }
}

impl Default for StaticDisplay {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DisplayMetricsPort for StaticDisplay {
    fn pixel_density(&self) -> f64 {
        self.pixel_density
    }
}
