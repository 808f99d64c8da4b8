//! End-to-end parsing tests over whole circuit descriptions

use pretty_assertions::assert_eq;

use circuit_illustrator::circuit::{Channel, GateKind};
use circuit_illustrator::{parse, ParseErrorKind, Subroutine};

use Channel::{ClassicalBit as B, Qubit as Q};

fn participants(model: &circuit_illustrator::CircuitModel, ch: Channel, col: usize) -> Vec<Channel> {
    model
        .instruction(ch, col)
        .map(|i| i.participants.iter().copied().collect())
        .unwrap_or_default()
}

#[test]
fn bell_pair_with_measurement() {
    let model = parse("qubits 2\nh q0\ncnot q0,q1\nmeasure").unwrap();

    assert_eq!(model.qubits(), 2);
    assert_eq!(model.channels().count(), 4);
    assert_eq!(model.instruction(Q(0), 0).map(|i| i.gate), Some(GateKind::H));
    assert_eq!(participants(&model, Q(0), 1), vec![Q(0), Q(1)]);
    assert_eq!(participants(&model, Q(1), 1), vec![Q(0), Q(1)]);
    assert_eq!(participants(&model, Q(0), 2), vec![Q(0), B(0)]);
    assert_eq!(participants(&model, B(0), 2), vec![Q(0), B(0)]);
    assert_eq!(participants(&model, Q(1), 2), vec![Q(1), B(1)]);
    assert_eq!(participants(&model, B(1), 2), vec![Q(1), B(1)]);
    assert_eq!(model.max_column(), Some(2));
}

#[test]
fn model_dump_snapshot() {
    let model = parse("qubits 2\nh q0\ncnot q0,q1\nmeasure").unwrap();

    insta::assert_snapshot!(model.to_string(), @r"
    qubits 2
    q0@0 h [q0]
    q0@1 cnot [q0 q1]
    q0@2 measure [q0 b0]
    q1@1 cnot [q0 q1]
    q1@2 measure [q1 b1]
    b0@2 measure [q0 b0]
    b1@2 measure [q1 b1]
    ");
}

#[test]
fn every_grid_key_is_a_declared_channel() {
    let sources = [
        "qubits 3\nh q0\ntoffoli q0,q1,q2\nmeasure q2\nc-x b2,q0",
        "qubits 1\nmap q0,a\n{x a | }\nmeasure",
        "qubits 4\nswap q0,q3\n{cz q1,q2 | h q0}\nmeasure",
    ];

    for source in sources {
        let model = parse(source).unwrap();
        let channels: Vec<Channel> = model.channels().collect();
        assert_eq!(channels.len(), 2 * model.qubits());
        for (channel, _, instr) in model.grid().iter() {
            assert!(channels.contains(&channel), "{} not declared in {:?}", channel, source);
            for p in &instr.participants {
                assert!(channels.contains(p));
            }
        }
    }
}

#[test]
fn parallel_block_shares_a_column() {
    let model = parse("qubits 2\n{h q0 | x q1}\nz q0").unwrap();

    assert_eq!(model.instruction(Q(0), 0).map(|i| i.gate), Some(GateKind::H));
    assert_eq!(model.instruction(Q(1), 0).map(|i| i.gate), Some(GateKind::X));
    assert_eq!(model.instruction(Q(0), 1).map(|i| i.gate), Some(GateKind::Z));
    assert_eq!(model.column_count(), 2);
}

#[test]
fn bare_measure_pairs_every_qubit() {
    let model = parse("qubits 3\nmeasure").unwrap();

    assert_eq!(model.grid().len(), 6);
    for i in 0..3 {
        assert_eq!(participants(&model, Q(i), 0), vec![Q(i), B(i)]);
        assert_eq!(participants(&model, B(i), 0), vec![Q(i), B(i)]);
    }
}

#[test]
fn classical_first_operand_reclassifies_cx() {
    let classical = parse("qubits 2\ncx b0,q1").unwrap();
    let instr = classical.instruction(Q(1), 0).unwrap();
    assert!(instr.classical_control);
    assert_eq!(instr.name(), "c-x");

    let quantum = parse("qubits 2\ncx q0,q1").unwrap();
    let instr = quantum.instruction(Q(1), 0).unwrap();
    assert!(!instr.classical_control);
    assert_eq!(instr.name(), "cx");
}

#[test]
fn multi_channel_cells_are_symmetric() {
    let model = parse(
        "qubits 4\ncnot q0,q2\ntoffoli q3,q1,q0\nswap q1,q2\nmeasure q1\nc-z b1,q3,q0\ncr q2,q0",
    )
    .unwrap();

    for (channel, column, instr) in model.grid().iter() {
        assert!(instr.participants.contains(&channel));
        for &other in &instr.participants {
            let peer = model.instruction(other, column).unwrap();
            assert_eq!(peer.participants, instr.participants);
            assert_eq!(peer.gate, instr.gate);
        }
    }
}

#[test]
fn subroutine_closed_by_unindented_line() {
    let model = parse("qubits 1\n.blk(3)\n h q0\nx q0").unwrap();

    assert_eq!(
        model.subroutines(),
        &[Subroutine {
            name: "blk".to_string(),
            repeat_count: 3,
            start_column: 0,
            end_column: 1,
        }]
    );
}

#[test]
fn opening_a_subroutine_flushes_the_previous_one() {
    let model = parse("qubits 1\n.first\n h q0\n x q0\n.second\n z q0\n").unwrap();
    let subs = model.subroutines();

    assert_eq!(subs.len(), 2);
    assert_eq!((subs[0].start_column, subs[0].end_column), (0, 2));
    assert_eq!((subs[1].start_column, subs[1].end_column), (2, 3));
    for sub in subs {
        assert!(sub.start_column <= sub.end_column);
    }
}

#[test]
fn alias_replaces_label() {
    let model = parse("qubits 1\nmap q0,foo\nh q0").unwrap();

    assert_eq!(model.aliases()[0].as_deref(), Some("foo"));
    assert_eq!(model.label(Q(0)), "|foo>");
    assert_eq!(model.label(B(0)), "b0");
}

#[test]
fn unknown_instruction_is_fatal() {
    let err = parse("qubits 2\nfoo q0").unwrap_err();

    assert_eq!(
        err.kind,
        ParseErrorKind::UnknownInstruction {
            keyword: "foo".to_string()
        }
    );
    assert_eq!(err.line, 2);
    assert_eq!(err.text, "foo q0");
}

#[test]
fn arity_mismatch_is_fatal() {
    let err = parse("qubits 2\nh q0,q1").unwrap_err();

    assert!(matches!(err.kind, ParseErrorKind::ArityMismatch { found: 2, .. }));
    assert_eq!(err.line, 2);
    assert_eq!(err.text, "h q0,q1");
}

#[test]
fn missing_declaration_is_fatal() {
    let err = parse("# no declaration\nh q0\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingDeclaration);
}

#[test]
fn error_report_points_at_the_line() {
    let source = "qubits 1\nh q7\n";
    let err = parse(source).unwrap_err();
    let report = err.format(source, "circuit.qc");

    assert!(matches!(err.kind, ParseErrorKind::UnresolvedOperand { .. }));
    assert!(report.contains("circuit.qc"));
    assert!(report.contains("q7"));
}
