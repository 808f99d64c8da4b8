//! Layout engine for computing circuit geometry
//!
//! This module takes a parsed [`CircuitModel`](crate::circuit::CircuitModel)
//! and a drawing surface, and produces a [`CircuitLayout`] with column widths,
//! row heights, element boxes and line segments.

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::LayoutConfig;
pub use engine::{compute, visible_rows};
pub use error::DegenerateSurface;
pub use metrics::{MonospaceMetrics, TextMetrics};
pub use types::*;
