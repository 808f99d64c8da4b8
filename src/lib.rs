//! Circuit Illustrator - diagrams for line-oriented quantum circuit descriptions
//!
//! This library provides a parser, a grid layout engine, and an SVG renderer
//! for cQASM-style circuit text.
//!
//! # Example
//!
//! ```rust
//! use circuit_illustrator::render;
//!
//! let svg = render("qubits 2\nh q0\ncnot q0,q1").unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod circuit;
pub mod error;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod stylesheet;

pub use circuit::{Channel, CircuitModel, GateKind, Glyph, Instruction, Subroutine};
pub use error::{ParseError, ParseErrorKind};
pub use layout::{CircuitLayout, DegenerateSurface, LayoutConfig, MonospaceMetrics, Surface};
pub use parser::parse;
pub use renderer::{render_svg, render_svg_with_stylesheet, SvgConfig};

use log::warn;
use thiserror::Error;

pub use stylesheet::Stylesheet;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Surface too small, only raised in strict mode
    #[error("layout error: {0}")]
    Degenerate(#[from] DegenerateSurface),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Stylesheet for colors and the label font
    pub stylesheet: Stylesheet,
    /// Drawing surface width
    pub width: i32,
    /// Drawing surface height
    pub height: i32,
    /// Fail instead of drawing a cramped layout when the surface is too small
    pub strict: bool,
    /// Debug mode: dump the circuit model and geometry to stderr
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            svg: SvgConfig::default(),
            stylesheet: Stylesheet::default(),
            width: 800,
            height: 400,
            strict: false,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet for colors and font
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Set the drawing surface size
    pub fn with_surface(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Text metrics matching the stylesheet's font size
    pub fn metrics(&self) -> MonospaceMetrics {
        MonospaceMetrics::for_font_size(self.stylesheet.font.size)
    }
}

/// Render circuit source to SVG with default configuration
///
/// This is the main entry point for the library. It parses the source,
/// computes layout, and generates SVG output.
///
/// # Example
///
/// ```rust
/// use circuit_illustrator::render;
///
/// let svg = render("qubits 1\nmap q0,data\nh data\nmeasure").unwrap();
///
/// assert!(svg.contains("<svg"));
/// assert!(svg.contains("|data&gt;"));
/// ```
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Parse `source` and compute its geometry without drawing it
///
/// A too-small surface only fails in strict mode; otherwise it is logged and
/// the clamped layout is returned.
pub fn compute_layout(source: &str, config: &RenderConfig) -> Result<CircuitLayout, RenderError> {
    let model = parse(source)?;
    let layout = layout::compute(
        &model,
        Surface::new(config.width, config.height),
        &config.metrics(),
        &config.layout,
    );

    if let Some(degenerate) = layout.degenerate {
        if config.strict {
            return Err(degenerate.into());
        }
        warn!(
            required_width = degenerate.required_width,
            required_height = degenerate.required_height;
            "Surface is too small, drawing a cramped layout"
        );
    }

    if config.debug {
        eprintln!("=== Circuit Model ===");
        eprint!("{}", model);
        eprintln!("=== Layout Debug ===");
        eprintln!("columns {:?}", layout.column_widths);
        eprintln!("rows    {:?}", layout.row_heights);
        for element in &layout.elements {
            let b = element.bounds;
            eprintln!(
                "[{} @ {}] {} x={} y={} w={} h={}",
                element.channel, element.column, element.gate, b.x, b.y, b.width, b.height
            );
        }
        eprintln!("====================");
    }

    Ok(layout)
}

/// Render circuit source to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use circuit_illustrator::{render_with_config, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_surface(300, 120)
///     .with_svg(SvgConfig::default().with_viewbox_padding(10));
///
/// let svg = render_with_config("qubits 2\nswap q0,q1", config).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let layout = compute_layout(source, &config)?;
    Ok(render_svg_with_stylesheet(
        &layout,
        &config.svg,
        &config.stylesheet,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_gate() {
        let svg = render("qubits 1\nh q0").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains(">H</text>"));
    }

    #[test]
    fn test_render_parse_error() {
        let err = render("h q0").unwrap_err();
        assert!(matches!(
            err,
            RenderError::Parse(ParseError {
                kind: ParseErrorKind::MissingDeclaration,
                ..
            })
        ));
    }

    #[test]
    fn test_cramped_surface_still_renders() {
        let config = RenderConfig::new().with_surface(10, 10);
        let svg = render_with_config("qubits 2\ncnot q0,q1", config).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_strict_mode_rejects_cramped_surface() {
        let config = RenderConfig::new().with_surface(10, 10).with_strict(true);
        let err = render_with_config("qubits 2\ncnot q0,q1", config).unwrap_err();
        assert!(matches!(err, RenderError::Degenerate(_)));
    }

    #[test]
    fn test_font_size_drives_metrics() {
        let mut stylesheet = Stylesheet::default();
        stylesheet.font.size = 20.0;
        let config = RenderConfig::new().with_stylesheet(stylesheet);
        assert_eq!(config.metrics(), MonospaceMetrics::for_font_size(20.0));
    }
}
