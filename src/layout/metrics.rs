//! Text measurement used to size gate boxes and labels

/// Font metrics supplied by whoever draws the layout
pub trait TextMetrics {
    /// Rendered width of `text` on a single line
    fn text_width(&self, text: &str) -> i32;

    /// Height of one line of text
    fn line_height(&self) -> i32;
}

/// Fixed-advance approximation of a font
///
/// Every character is assumed to be `0.6 * font_size` wide, which is close
/// enough for the short gate labels and channel names a circuit contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMetrics {
    advance: i32,
    line_height: i32,
}

impl MonospaceMetrics {
    pub fn new(advance: i32, line_height: i32) -> Self {
        Self {
            advance,
            line_height,
        }
    }

    /// Metrics for a font of the given size in user units
    pub fn for_font_size(size: f64) -> Self {
        Self::new((size * 0.6).ceil() as i32, (size * 1.25).ceil() as i32)
    }

    pub fn advance(&self) -> i32 {
        self.advance
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::for_font_size(14.0)
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str) -> i32 {
        self.advance * text.chars().count() as i32
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }
}
