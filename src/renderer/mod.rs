//! SVG renderer for generating output from circuit layouts
//!
//! This module takes a CircuitLayout and produces an SVG string
//! with CSS classes and custom properties for styling.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, render_svg_with_stylesheet};
