//! Layout computation engine
//!
//! Geometry is computed in two passes. The first pass fixes every column
//! width, row height, label box and element box. The second pass derives
//! wires, connectors and subroutine brackets purely by reading the finished
//! boxes, so no element ever depends on a neighbour that is not yet placed.

use std::collections::BTreeMap;
use std::ops::Range;

use log::debug;

use crate::circuit::{Channel, CircuitModel, GateKind, Glyph, Role};

use super::config::LayoutConfig;
use super::error::DegenerateSurface;
use super::metrics::TextMetrics;
use super::types::*;

/// Compute the geometry of `model` on `surface`
///
/// Always returns a layout. When the surface is too small the sizes are
/// clamped and [`CircuitLayout::degenerate`] is set.
pub fn compute(
    model: &CircuitModel,
    surface: Surface,
    metrics: &dyn TextMetrics,
    config: &LayoutConfig,
) -> CircuitLayout {
    let surface = Surface::new(surface.width.max(0), surface.height.max(0));
    let rows = visible_rows(model);
    let columns = model.column_count();
    let label_row = if model.subroutines().is_empty() {
        0
    } else {
        config.label_row_lines * metrics.line_height()
    };

    // Minimum sizes: label column first, then circuit columns
    let label_texts: Vec<String> = rows.iter().map(|&ch| model.label(ch)).collect();
    let mut min_widths = vec![0; columns + 1];
    let mut min_heights = vec![0; rows.len()];

    for (row, text) in label_texts.iter().enumerate() {
        min_widths[0] = min_widths[0].max(metrics.text_width(text));
        min_heights[row] = min_heights[row].max(metrics.line_height());
    }
    for (row, &channel) in rows.iter().enumerate() {
        for (column, instr) in model.grid().row(channel) {
            let (width, height) = min_size(instr.glyph_at(channel), metrics, config);
            if let Some(min) = min_widths.get_mut(column + 1) {
                *min = (*min).max(width);
            }
            min_heights[row] = min_heights[row].max(height);
        }
    }

    let column_widths = distribute(&min_widths, surface.width);
    let mut row_heights = distribute(&min_heights, surface.height.saturating_sub(label_row));
    if label_row > 0 {
        row_heights.push(label_row);
    }

    let required_width: i32 = min_widths.iter().sum();
    let required_height = min_heights.iter().sum::<i32>() + label_row;
    let degenerate = DegenerateSurface::check(
        required_width,
        required_height,
        surface.width,
        surface.height,
    );
    if degenerate.is_some() {
        debug!(
            required_width,
            required_height,
            width = surface.width,
            height = surface.height;
            "Surface too small, clamping layout"
        );
    }

    let cells = CellGrid::new(&column_widths, &row_heights);

    // Pass 1: boxes
    let labels: Vec<LabelLayout> = rows
        .iter()
        .zip(label_texts)
        .enumerate()
        .map(|(row, (&channel, text))| {
            let cell = cells.cell(0, row);
            let bounds = cell.centered(metrics.text_width(&text), metrics.line_height());
            LabelLayout {
                channel,
                text,
                cell,
                bounds,
                attachments: Attachments::from(&bounds),
            }
        })
        .collect();

    let mut elements = Vec::with_capacity(model.grid().len());
    for (row, &channel) in rows.iter().enumerate() {
        for (column, instr) in model.grid().row(channel) {
            let glyph = instr.glyph_at(channel);
            let (width, height) = min_size(glyph, metrics, config);
            let cell = cells.cell(column + 1, row);
            let bounds = cell.centered(width, height);
            elements.push(ElementLayout {
                channel,
                column,
                gate: instr.gate,
                classical_control: instr.classical_control,
                glyph,
                angle: instr.angle,
                cell,
                bounds,
                attachments: Attachments::from(&bounds),
            });
        }
    }
    let placed = Placed::new(&elements);

    // Pass 2: lines
    let mut segments = wires(&rows, columns, &cells, &labels, &placed);
    segments.extend(connectors(model, &rows, columns, &cells, &placed));
    let subroutines = subroutine_layouts(model, rows.len(), &cells, metrics, config);

    let bounds = BoundingBox::new(
        0,
        0,
        column_widths.iter().sum(),
        row_heights.iter().sum(),
    );

    debug!(
        columns = column_widths.len(),
        rows = row_heights.len(),
        elements = elements.len(),
        segments = segments.len();
        "Computed circuit layout"
    );

    CircuitLayout {
        column_widths,
        row_heights,
        rows,
        labels,
        elements,
        segments,
        subroutines,
        bounds,
        double_line_gap: config.double_line_gap,
        border_width: config.border_width,
        degenerate,
    }
}

/// Every qubit row, then the classical rows that hold at least one cell
pub fn visible_rows(model: &CircuitModel) -> Vec<Channel> {
    model
        .channels()
        .filter(|&ch| !ch.is_classical() || model.grid().channel_is_used(ch))
        .collect()
}

/// Smallest box that shows a glyph without clipping
pub fn min_size(glyph: Glyph, metrics: &dyn TextMetrics, config: &LayoutConfig) -> (i32, i32) {
    let node = |radius: i32| (2 * radius, 2 * radius);
    match glyph {
        Glyph::ControlDot => node(config.dot_radius),
        Glyph::Target => node(config.target_radius),
        Glyph::Cross => node(config.cross_radius),
        Glyph::Measurement => boxed_size(GateKind::Measure.display_label(), true, metrics, config),
        Glyph::Boxed { label, square } => boxed_size(label, square, metrics, config),
    }
}

fn boxed_size(
    label: &str,
    square: bool,
    metrics: &dyn TextMetrics,
    config: &LayoutConfig,
) -> (i32, i32) {
    let width = metrics.text_width(label) + 2 * config.border_width;
    let height = metrics.line_height() + 2 * config.border_width;
    if square {
        let side = width.max(height);
        (side, side)
    } else {
        (width, height)
    }
}

/// Spread the space left over after the minimums evenly, truncating
fn distribute(minimums: &[i32], available: i32) -> Vec<i32> {
    if minimums.is_empty() {
        return Vec::new();
    }
    let leftover = available.saturating_sub(minimums.iter().sum::<i32>());
    let share = f64::from(leftover) / minimums.len() as f64;
    minimums
        .iter()
        .map(|&min| ((f64::from(min) + share) as i32).max(0))
        .collect()
}

/// Cumulative offsets of the column/row partition
struct CellGrid<'a> {
    widths: &'a [i32],
    heights: &'a [i32],
    xs: Vec<i32>,
    ys: Vec<i32>,
}

impl<'a> CellGrid<'a> {
    fn new(widths: &'a [i32], heights: &'a [i32]) -> Self {
        Self {
            widths,
            heights,
            xs: offsets(widths),
            ys: offsets(heights),
        }
    }

    /// `column` counts the label column as 0
    fn cell(&self, column: usize, row: usize) -> BoundingBox {
        BoundingBox::new(
            self.xs[column],
            self.ys[row],
            self.widths[column],
            self.heights[row],
        )
    }

    fn column_center(&self, column: usize) -> i32 {
        self.xs[column] + self.widths[column] / 2
    }

    /// Left edge and total width of a range of columns
    fn column_span(&self, columns: Range<usize>) -> (i32, i32) {
        let end = columns.end.min(self.widths.len());
        let start = columns.start.min(end);
        let x = self
            .xs
            .get(start)
            .copied()
            .unwrap_or_else(|| self.widths.iter().sum());
        (x, self.widths[start..end].iter().sum())
    }
}

fn offsets(sizes: &[i32]) -> Vec<i32> {
    sizes
        .iter()
        .scan(0, |acc, &size| {
            let start = *acc;
            *acc += size;
            Some(start)
        })
        .collect()
}

/// Read-only `(channel, column)` lookup into the placed elements
struct Placed<'a> {
    elements: &'a [ElementLayout],
    index: BTreeMap<(Channel, usize), usize>,
}

impl<'a> Placed<'a> {
    fn new(elements: &'a [ElementLayout]) -> Self {
        let index = elements
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.channel, e.column), i))
            .collect();
        Self { elements, index }
    }

    fn get(&self, channel: Channel, column: usize) -> Option<&'a ElementLayout> {
        self.index
            .get(&(channel, column))
            .and_then(|&i| self.elements.get(i))
    }
}

/// Horizontal channel lines, one per cell plus a tail after the last element
fn wires(
    rows: &[Channel],
    columns: usize,
    cells: &CellGrid<'_>,
    labels: &[LabelLayout],
    placed: &Placed<'_>,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (row, &channel) in rows.iter().enumerate() {
        let style = LineStyle::for_classical(channel.is_classical());
        for column in 0..columns {
            let cell = cells.cell(column + 1, row);
            let y = cell.y + cell.height / 2;

            let x1 = if column == 0 {
                labels
                    .get(row)
                    .map_or(cell.x, |label| label.attachments.right)
            } else {
                placed
                    .get(channel, column - 1)
                    .map_or(cell.x, |e| e.attachments.right)
            };
            let current = placed.get(channel, column);
            let x2 = current.map_or(cell.right(), |e| e.attachments.left);
            segments.push(Segment::wire(style, x1, x2, y));

            if column + 1 == columns {
                if let Some(e) = current {
                    segments.push(Segment::wire(style, e.attachments.right, cell.right(), y));
                }
            }
        }
    }
    segments
}

/// Vertical links, walked once per instruction from its topmost participant
fn connectors(
    model: &CircuitModel,
    rows: &[Channel],
    columns: usize,
    cells: &CellGrid<'_>,
    placed: &Placed<'_>,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    for column in 0..columns {
        let x = cells.column_center(column + 1);
        for (row, &channel) in rows.iter().enumerate() {
            let Some(instr) = model.instruction(channel, column) else {
                continue;
            };
            if instr.role() == Role::SingleChannel || instr.participants.first() != Some(&channel) {
                continue;
            }
            let (Some(&last), Some(top)) = (instr.participants.last(), placed.get(channel, column))
            else {
                continue;
            };

            let style = LineStyle::for_classical(instr.is_classical_link());
            let mut y1 = top.attachments.bottom;
            for (below, &next) in rows.iter().enumerate().skip(row + 1) {
                match placed.get(next, column) {
                    Some(e) => {
                        segments.push(Segment::connector(style, x, y1, e.attachments.top));
                        y1 = e.attachments.bottom;
                    }
                    None => {
                        let bottom = cells.cell(column + 1, below).bottom();
                        segments.push(Segment::connector(style, x, y1, bottom));
                        y1 = bottom;
                    }
                }
                if next == last {
                    break;
                }
            }
        }
    }
    segments
}

fn subroutine_layouts(
    model: &CircuitModel,
    label_row: usize,
    cells: &CellGrid<'_>,
    metrics: &dyn TextMetrics,
    config: &LayoutConfig,
) -> Vec<SubroutineLayout> {
    if model.subroutines().is_empty() || label_row >= cells.heights.len() {
        return Vec::new();
    }

    let y = cells.ys[label_row];
    let height = cells.heights[label_row];
    let line = metrics.line_height();
    let margin = config.caption_margin;
    let guide_top = (f64::from(cells.heights[0]) / 4.0) as i32;

    model
        .subroutines()
        .iter()
        .map(|sub| {
            let (x, width) = cells.column_span(sub.start_column + 1..sub.end_column + 1);
            let area = BoundingBox::new(x, y, width, height);

            let leftover = f64::from(height - line - margin);
            let arrow_y = (f64::from(y) + leftover / 2.0) as i32;
            let caption_anchor = Point::new(
                (f64::from(x) + f64::from(width) / 2.0) as i32,
                (f64::from(y + height) - f64::from(line) / 2.0 - f64::from(margin) / 2.0) as i32,
            );

            SubroutineLayout {
                name: sub.name.clone(),
                caption: sub.caption(),
                area,
                bracket: (Point::new(x, arrow_y), Point::new(area.right(), arrow_y)),
                caption_anchor,
                guides: [
                    (Point::new(x, guide_top), Point::new(x, arrow_y)),
                    (
                        Point::new(area.right(), guide_top),
                        Point::new(area.right(), arrow_y),
                    ),
                ],
            }
        })
        .collect()
}
