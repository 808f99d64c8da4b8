//! SVG generation from circuit layouts

use crate::circuit::Glyph;
use crate::layout::{
    BoundingBox, CircuitLayout, ElementLayout, LabelLayout, LineStyle, Point, Segment,
    SegmentKind, SubroutineLayout,
};
use crate::stylesheet::Stylesheet;

use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    styles: Vec<String>,
    lines: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            styles: vec![],
            lines: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    /// Add CSS custom properties and class rules from a stylesheet
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet, border_width: i32) {
        let p = self.prefix();
        let mut css = String::from(":root {\n");
        for (token, value) in stylesheet.resolved_colors() {
            css.push_str(&format!("    --{}: {};\n", token, value));
        }
        css.push_str("  }\n");
        css.push_str(&format!(
            "  .{p}background {{ fill: var(--background); stroke: none; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}wire, .{p}connector {{ stroke: var(--wire); stroke-width: 1; fill: none; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}box {{ fill: var(--gate-fill); stroke: var(--gate-stroke); stroke-width: {border_width}; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}text {{ fill: var(--text); font-family: {}; font-size: {}px; }}\n",
            stylesheet.font.family, stylesheet.font.size
        ));
        css.push_str(&format!(
            "  .{p}dot {{ fill: var(--node); stroke: var(--node); stroke-width: 1.5; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}target {{ fill: none; stroke: var(--node); stroke-width: 2; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}cross {{ stroke: var(--node); stroke-width: 2.5; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}meter {{ fill: none; stroke: var(--gate-stroke); stroke-width: 1.5; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}bracket {{ stroke: var(--subroutine); stroke-width: 1; fill: none; }}\n"
        ));
        css.push_str(&format!(
            "  .{p}guide {{ stroke: var(--subroutine); stroke-width: 2; stroke-dasharray: 5,1; }}"
        ));
        self.styles.push(css);
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn class(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the arrow marker used at both ends of subroutine brackets
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        // auto-start-reverse flips the start marker so both heads point outward
        self.defs.push(format!(
            r#"<marker id="{prefix}arrow" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse">
      <path d="M0,0 L10,5 L0,10 Z" fill="context-stroke"/>
    </marker>"#
        ));
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, bounds: &BoundingBox, class: &str) {
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            self.indent_str(),
            self.class(class),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
        ));
    }

    /// Add a circle element
    pub fn add_circle(&mut self, center: Point, r: i32, class: &str) {
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"/>"#,
            self.indent_str(),
            self.class(class),
            center.x,
            center.y,
            r,
        ));
    }

    /// Add a line element drawn as part of a glyph
    pub fn add_line(&mut self, from: Point, to: Point, class: &str) {
        self.elements.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            self.indent_str(),
            self.class(class),
            from.x,
            from.y,
            to.x,
            to.y,
        ));
    }

    /// Add a path element
    pub fn add_path(&mut self, d: &str, class: &str) {
        self.elements.push(format!(
            r#"{}<path class="{}" d="{}"/>"#,
            self.indent_str(),
            self.class(class),
            d
        ));
    }

    /// Add centered text
    pub fn add_text(&mut self, text: &str, at: Point) {
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            self.indent_str(),
            self.class("text"),
            at.x,
            at.y,
            escape_xml(text)
        ));
    }

    /// Add a wire or connector, drawn underneath every glyph
    pub fn add_segment(&mut self, segment: &Segment, gap: i32) {
        let class = match segment.kind {
            SegmentKind::Wire => self.class("wire"),
            SegmentKind::Connector => self.class("connector"),
        };
        let offsets = match segment.style {
            LineStyle::Single => vec![0],
            LineStyle::Double => vec![-gap, gap],
        };

        for offset in offsets {
            let (dx, dy) = match segment.kind {
                SegmentKind::Wire => (0, offset),
                SegmentKind::Connector => (offset, 0),
            };
            self.lines.push(format!(
                r#"  <line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
                class,
                segment.from.x + dx,
                segment.from.y + dy,
                segment.to.x + dx,
                segment.to.y + dy,
            ));
        }
    }

    /// Add a line with arrow heads at both ends
    pub fn add_bracket(&mut self, from: Point, to: Point) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" marker-start="url(#{prefix}arrow)" marker-end="url(#{prefix}arrow)"/>"#,
            self.indent_str(),
            self.class("bracket"),
            from.x,
            from.y,
            to.x,
            to.y,
        ));
    }

    /// Add a group element with optional ID, classes and extra attributes
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String], attrs: &[(&str, String)]) {
        let id_attr = id
            .map(|i| format!(r#" id="{}{}""#, self.prefix(), i))
            .unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };
        let extra: String = attrs
            .iter()
            .map(|(name, value)| format!(r#" {}="{}""#, name, escape_xml(value)))
            .collect();

        self.elements.push(format!(
            "{}<g{}{}{}>",
            self.indent_str(),
            id_attr,
            class_attr,
            extra
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: BoundingBox) -> String {
        let padding = self.config.viewbox_padding;
        let vb_x = viewbox.x - padding;
        let vb_y = viewbox.y - padding;
        let vb_w = viewbox.width + 2 * padding;
        let vb_h = viewbox.height + 2 * padding;

        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            vb_x, vb_y, vb_w, vb_h, vb_w, vb_h
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        if !self.defs.is_empty() {
            svg.push_str("  <defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str("    ");
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str("  </defs>");
            svg.push_str(nl);
        }

        // Lines first so gate boxes cover the wires passing behind them
        for line in &self.lines {
            if self.config.pretty_print {
                svg.push_str(line);
            } else {
                svg.push_str(line.trim_start());
            }
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render a CircuitLayout to an SVG string (with default stylesheet)
pub fn render_svg(layout: &CircuitLayout, config: &SvgConfig) -> String {
    render_svg_with_stylesheet(layout, config, &Stylesheet::default())
}

/// Render a CircuitLayout to an SVG string with a custom stylesheet
pub fn render_svg_with_stylesheet(
    layout: &CircuitLayout,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());

    builder.add_stylesheet(stylesheet, layout.border_width);
    if !layout.subroutines.is_empty() {
        builder.add_arrow_marker();
    }

    if config.background {
        builder.add_rect(&layout.bounds, "background");
    }

    for segment in &layout.segments {
        builder.add_segment(segment, layout.double_line_gap);
    }

    for label in &layout.labels {
        render_label(label, &mut builder);
    }

    for element in &layout.elements {
        render_element(element, &mut builder);
    }

    for subroutine in &layout.subroutines {
        render_subroutine(subroutine, &mut builder);
    }

    builder.build(layout.bounds)
}

fn render_label(label: &LabelLayout, builder: &mut SvgBuilder) {
    builder.add_text(&label.text, label.bounds.center());
}

/// Render one instruction cell to the builder
fn render_element(element: &ElementLayout, builder: &mut SvgBuilder) {
    let name = gate_name(element);
    let id = format!("{}-{}", element.channel, element.column);
    let classes = vec![builder.class("gate"), builder.class(&name)];
    let mut attrs = vec![("data-gate", name.clone())];
    if let Some(angle) = element.angle {
        attrs.push(("data-angle", angle.to_string()));
    }

    builder.start_group(Some(&id), &classes, &attrs);

    let b = &element.bounds;
    let center = b.center();
    match element.glyph {
        Glyph::Boxed { label, .. } => {
            builder.add_rect(b, "box");
            builder.add_text(label, center);
        }
        Glyph::Measurement => {
            builder.add_rect(b, "box");
            let mid = Point::new(b.x + b.width / 2, b.y + 3 * b.height / 5);
            let r = (f64::from(b.width) / 2.0 * 0.7) as i32;
            builder.add_path(
                &format!(
                    "M{} {} A{} {} 0 0 1 {} {}",
                    mid.x - r,
                    mid.y,
                    r,
                    r,
                    mid.x + r,
                    mid.y
                ),
                "meter",
            );
            let tip = Point::new(
                b.x + (f64::from(b.width) * 0.85) as i32,
                b.y + (f64::from(b.height) * 0.15) as i32,
            );
            builder.add_line(mid, tip, "meter");
        }
        Glyph::ControlDot => {
            builder.add_circle(center, b.width.min(b.height) / 2, "dot");
        }
        Glyph::Target => {
            let r = b.width.min(b.height) / 2;
            builder.add_circle(center, r, "target");
            builder.add_line(
                Point::new(center.x - r, center.y),
                Point::new(center.x + r, center.y),
                "target",
            );
            builder.add_line(
                Point::new(center.x, center.y - r),
                Point::new(center.x, center.y + r),
                "target",
            );
        }
        Glyph::Cross => {
            builder.add_line(
                Point::new(b.x, b.y),
                Point::new(b.right(), b.bottom()),
                "cross",
            );
            builder.add_line(
                Point::new(b.x, b.bottom()),
                Point::new(b.right(), b.y),
                "cross",
            );
        }
    }

    builder.end_group();
}

fn render_subroutine(subroutine: &SubroutineLayout, builder: &mut SvgBuilder) {
    let classes = vec![builder.class("subroutine")];
    builder.start_group(
        None,
        &classes,
        &[("data-name", subroutine.name.clone())],
    );

    let (from, to) = subroutine.bracket;
    builder.add_bracket(from, to);
    builder.add_text(&subroutine.caption, subroutine.caption_anchor);
    for (top, bottom) in subroutine.guides {
        builder.add_line(top, bottom, "guide");
    }

    builder.end_group();
}

fn gate_name(element: &ElementLayout) -> String {
    let name = element.gate.name();
    if element.classical_control {
        format!("c-{}", name.trim_start_matches('c'))
    } else {
        name.to_string()
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
