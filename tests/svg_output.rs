//! SVG output through the full render pipeline

use circuit_illustrator::{
    render, render_with_config, RenderConfig, RenderError, Stylesheet, SvgConfig,
};

const TELEPORT: &str = "\
qubits 3
# teleport q0 onto q2
map q0,psi
{h q1 | x q2}
cnot q1,q2
.bell
  cnot psi,q1
  h psi
measure psi
measure q1
c-x b1,q2
c-z b0,q2
";

#[test]
fn renders_every_cell_as_a_group() {
    let svg = render(TELEPORT).unwrap();

    for id in ["q1-0", "q2-0", "q0-2", "q0-3", "b0-4", "b1-5", "q2-6", "q2-7"] {
        assert!(svg.contains(&format!(r#"id="qc-{}""#, id)), "missing cell {}", id);
    }
    assert!(svg.contains(r#"data-gate="c-x""#));
    assert!(svg.contains(r#"data-gate="c-z""#));
    assert!(svg.contains(">|psi&gt;</text>"));
    assert!(svg.contains(r#"data-name="bell""#));
}

#[test]
fn stylesheet_colors_and_font_reach_the_css() {
    let stylesheet = Stylesheet::from_str(
        r##"
[colors]
wire = "#336699"

[font]
family = "monospace"
size = 12.0
"##,
    )
    .unwrap();

    let config = RenderConfig::new().with_stylesheet(stylesheet);
    let svg = render_with_config("qubits 1\nh q0", config).unwrap();

    assert!(svg.contains("--wire: #336699;"));
    assert!(svg.contains("--gate-fill: #ffffff;"));
    assert!(svg.contains("font-family: monospace; font-size: 12px;"));
}

#[test]
fn output_is_deterministic() {
    assert_eq!(render(TELEPORT).unwrap(), render(TELEPORT).unwrap());
}

#[test]
fn compact_fragment_output() {
    let config = RenderConfig::new().with_svg(
        SvgConfig::new()
            .with_standalone(false)
            .with_pretty_print(false)
            .with_background(false),
    );
    let svg = render_with_config("qubits 2\ncnot q0,q1", config).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains("<?xml"));
    assert!(!svg.contains("qc-background\""));
    assert!(svg.contains("<circle class=\"qc-target\""));
}

#[test]
fn parse_errors_surface_through_render() {
    let err = render("qubits 1\nfrobnicate q0").unwrap_err();
    match err {
        RenderError::Parse(e) => assert_eq!(e.line, 2),
        other => panic!("expected a parse error, got {other}"),
    }
}
