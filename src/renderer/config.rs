//! Configuration for SVG rendering

/// Configuration options for SVG output
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Padding around the viewBox
    pub viewbox_padding: i32,

    /// Whether to include XML declaration and standalone attributes
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names and ids (e.g., "qc-" for "qc-wire")
    pub class_prefix: Option<String>,

    /// Fill the drawing area with the background color
    pub background: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            viewbox_padding: 5,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("qc-".to_string()),
            background: true,
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewBox padding
    pub fn with_viewbox_padding(mut self, padding: i32) -> Self {
        self.viewbox_padding = padding;
        self
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }
}
