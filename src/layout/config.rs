//! Configuration for the layout engine

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Radius of a filled control dot
    pub dot_radius: i32,

    /// Radius of the circle-plus target node
    pub target_radius: i32,

    /// Half-size of the swap cross
    pub cross_radius: i32,

    /// Border drawn around boxed gates, counted on each side
    pub border_width: i32,

    /// Distance of each line of a double (classical) line from its center
    pub double_line_gap: i32,

    /// Space between the subroutine caption and the bottom of the label row
    pub caption_margin: i32,

    /// Height of the subroutine label row, in text lines
    pub label_row_lines: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dot_radius: 5,
            target_radius: 9,
            cross_radius: 6,
            border_width: 3,
            double_line_gap: 2,
            caption_margin: 3,
            label_row_lines: 2,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the control dot, target and cross radii
    pub fn with_node_radii(mut self, dot: i32, target: i32, cross: i32) -> Self {
        self.dot_radius = dot;
        self.target_radius = target;
        self.cross_radius = cross;
        self
    }

    /// Set the border width of boxed gates
    pub fn with_border_width(mut self, width: i32) -> Self {
        self.border_width = width;
        self
    }

    /// Set the half-distance between the two lines of a classical wire
    pub fn with_double_line_gap(mut self, gap: i32) -> Self {
        self.double_line_gap = gap;
        self
    }

    /// Set the margin below subroutine captions
    pub fn with_caption_margin(mut self, margin: i32) -> Self {
        self.caption_margin = margin;
        self
    }

    /// Set the subroutine label row height in text lines
    pub fn with_label_row_lines(mut self, lines: i32) -> Self {
        self.label_row_lines = lines;
        self
    }
}
