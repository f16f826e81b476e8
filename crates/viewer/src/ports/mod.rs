//! Viewer port definitions.

pub mod outbound;
