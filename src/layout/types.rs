//! Core types for the layout engine
//!
//! All coordinates are integer drawing units with the origin at the top-left
//! of the surface.

use crate::circuit::{Channel, GateKind, Glyph};

use super::error::DegenerateSurface;

/// Rectangular drawing area handed to the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: i32,
    pub height: i32,
}

impl Surface {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Center point, truncated
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }

    /// Check if this bounding box contains another
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Box of the wanted size centered in this one, shrunk to fit
    pub fn centered(&self, want_width: i32, want_height: i32) -> BoundingBox {
        let width = want_width.min(self.width).max(0);
        let height = want_height.min(self.height).max(0);
        BoundingBox::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }
}

/// Edge coordinates that wires and connectors attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachments {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl From<&BoundingBox> for Attachments {
    fn from(bounds: &BoundingBox) -> Self {
        Self {
            left: bounds.x,
            right: bounds.right(),
            top: bounds.y,
            bottom: bounds.bottom(),
        }
    }
}

/// Single quantum line or double classical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Single,
    Double,
}

impl LineStyle {
    pub fn for_classical(classical: bool) -> Self {
        if classical {
            LineStyle::Double
        } else {
            LineStyle::Single
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Horizontal channel line
    Wire,
    /// Vertical link between the participants of one instruction
    Connector,
}

/// A straight line segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub style: LineStyle,
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn wire(style: LineStyle, x1: i32, x2: i32, y: i32) -> Self {
        Self {
            kind: SegmentKind::Wire,
            style,
            from: Point::new(x1, y),
            to: Point::new(x2, y),
        }
    }

    pub fn connector(style: LineStyle, x: i32, y1: i32, y2: i32) -> Self {
        Self {
            kind: SegmentKind::Connector,
            style,
            from: Point::new(x, y1),
            to: Point::new(x, y2),
        }
    }
}

/// Channel name drawn in the leading label column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelLayout {
    pub channel: Channel,
    pub text: String,
    pub cell: BoundingBox,
    pub bounds: BoundingBox,
    pub attachments: Attachments,
}

/// One placed cell of an instruction
#[derive(Debug, Clone, PartialEq)]
pub struct ElementLayout {
    pub channel: Channel,
    /// Circuit column (not counting the label column)
    pub column: usize,
    pub gate: GateKind,
    pub classical_control: bool,
    pub glyph: Glyph,
    pub angle: Option<f64>,
    /// Full grid cell the element is centered in
    pub cell: BoundingBox,
    /// Drawn extent of the element
    pub bounds: BoundingBox,
    pub attachments: Attachments,
}

/// Bracket, caption and guides of one subroutine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineLayout {
    pub name: String,
    pub caption: String,
    /// Column span within the label row
    pub area: BoundingBox,
    /// Double-headed arrow spanning the block
    pub bracket: (Point, Point),
    /// Center of the caption text
    pub caption_anchor: Point,
    /// Dashed lines at the left and right block boundaries
    pub guides: [(Point, Point); 2],
}

/// Complete geometry of a circuit
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitLayout {
    /// Label column first, then one entry per circuit column
    pub column_widths: Vec<i32>,
    /// One entry per visible row, then the label row if there are subroutines
    pub row_heights: Vec<i32>,
    /// Visible channels in row order
    pub rows: Vec<Channel>,
    pub labels: Vec<LabelLayout>,
    /// Row-major order
    pub elements: Vec<ElementLayout>,
    /// Wires in row-major order, then connectors in column order
    pub segments: Vec<Segment>,
    pub subroutines: Vec<SubroutineLayout>,
    pub bounds: BoundingBox,
    /// Offset of each line of a double line from its center
    pub double_line_gap: i32,
    /// Border width the boxed gates were sized with
    pub border_width: i32,
    pub degenerate: Option<DegenerateSurface>,
}

impl CircuitLayout {
    /// Fail if the surface was too small for the circuit
    pub fn check(&self) -> Result<(), DegenerateSurface> {
        match self.degenerate {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn has_label_row(&self) -> bool {
        self.row_heights.len() > self.rows.len()
    }

    pub fn element(&self, channel: Channel, column: usize) -> Option<&ElementLayout> {
        self.elements
            .iter()
            .find(|e| e.channel == channel && e.column == column)
    }

    pub fn wires(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Wire)
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Connector)
    }
}
