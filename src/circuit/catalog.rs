//! Static table of recognized instructions
//!
//! Every keyword the parser accepts maps to one [`GateSpec`]. Parsing looks
//! up arity and control rules here; the layout engine only consumes the
//! [`Glyph`] classification derived from a placed instruction.

use std::fmt;

/// Closed set of instruction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    S,
    Ph,
    T,
    Tdag,
    Not,
    PrepZ,
    Measure,
    Cnot,
    Cx,
    Cz,
    Toffoli,
    Swap,
    CPhase,
    Cr,
    Map,
}

impl GateKind {
    /// Canonical (lower-case) keyword for this kind
    pub fn name(self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::S => "s",
            GateKind::Ph => "ph",
            GateKind::T => "t",
            GateKind::Tdag => "tdag",
            GateKind::Not => "not",
            GateKind::PrepZ => "prepz",
            GateKind::Measure => "measure",
            GateKind::Cnot => "cnot",
            GateKind::Cx => "cx",
            GateKind::Cz => "cz",
            GateKind::Toffoli => "toffoli",
            GateKind::Swap => "swap",
            GateKind::CPhase => "cphase",
            GateKind::Cr => "cr",
            GateKind::Map => "map",
        }
    }

    /// Rotation gates carry their last operand as an angle
    pub fn takes_angle(self) -> bool {
        matches!(self, GateKind::Rx | GateKind::Ry | GateKind::Rz)
    }

    /// Text drawn inside the box for boxed gates
    pub fn display_label(self) -> &'static str {
        match self {
            GateKind::H => "H",
            GateKind::X | GateKind::Cx => "X",
            GateKind::Y => "Y",
            GateKind::Z | GateKind::Cz => "Z",
            GateKind::Rx => "Rx",
            GateKind::Ry => "Ry",
            GateKind::Rz => "Rz",
            GateKind::S | GateKind::Ph => "S",
            GateKind::T => "T",
            GateKind::Tdag => "T^",
            GateKind::PrepZ => "|0>",
            GateKind::Measure => "M",
            other => other.name(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of operands an instruction accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Channel role of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SingleChannel,
    MultiChannel,
    ClassicalControlled,
    Declaration,
}

/// How the controlling operand of a gate is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRule {
    /// Control (if any) is always a qubit
    Quantum,
    /// Classical-controlled when the first resolved operand is a classical bit
    Ambiguous,
    /// Always classical-controlled
    Classical,
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSpec {
    pub name: &'static str,
    pub kind: GateKind,
    pub arity: Arity,
    pub role: Role,
    pub control: ControlRule,
}

const fn entry(
    name: &'static str,
    kind: GateKind,
    arity: Arity,
    role: Role,
    control: ControlRule,
) -> GateSpec {
    GateSpec {
        name,
        kind,
        arity,
        role,
        control,
    }
}

use Arity::{AtLeast, Exact};
use ControlRule::{Ambiguous, Classical, Quantum};
use Role::{ClassicalControlled, Declaration, MultiChannel, SingleChannel};

const CATALOG: &[GateSpec] = &[
    entry("h", GateKind::H, Exact(1), SingleChannel, Quantum),
    entry("x", GateKind::X, Exact(1), SingleChannel, Quantum),
    entry("y", GateKind::Y, Exact(1), SingleChannel, Quantum),
    entry("z", GateKind::Z, Exact(1), SingleChannel, Quantum),
    entry("rx", GateKind::Rx, Exact(2), SingleChannel, Quantum),
    entry("ry", GateKind::Ry, Exact(2), SingleChannel, Quantum),
    entry("rz", GateKind::Rz, Exact(2), SingleChannel, Quantum),
    entry("s", GateKind::S, Exact(1), SingleChannel, Quantum),
    entry("ph", GateKind::Ph, Exact(1), SingleChannel, Quantum),
    entry("t", GateKind::T, Exact(1), SingleChannel, Quantum),
    entry("tdag", GateKind::Tdag, Exact(1), SingleChannel, Quantum),
    entry("not", GateKind::Not, Exact(1), SingleChannel, Quantum),
    entry("prepz", GateKind::PrepZ, Exact(1), SingleChannel, Quantum),
    entry("measure", GateKind::Measure, AtLeast(0), SingleChannel, Quantum),
    entry("cnot", GateKind::Cnot, Exact(2), MultiChannel, Quantum),
    entry("cx", GateKind::Cx, AtLeast(2), MultiChannel, Ambiguous),
    entry("cz", GateKind::Cz, AtLeast(2), MultiChannel, Ambiguous),
    entry("toffoli", GateKind::Toffoli, Exact(3), MultiChannel, Quantum),
    entry("swap", GateKind::Swap, Exact(2), MultiChannel, Quantum),
    entry("cphase", GateKind::CPhase, Exact(2), MultiChannel, Quantum),
    entry("cr", GateKind::Cr, Exact(2), MultiChannel, Quantum),
    entry("c-x", GateKind::Cx, AtLeast(2), ClassicalControlled, Classical),
    entry("c-z", GateKind::Cz, AtLeast(2), ClassicalControlled, Classical),
    entry("map", GateKind::Map, Exact(2), Declaration, Quantum),
];

/// Look up a case-folded keyword
pub fn lookup(keyword: &str) -> Option<&'static GateSpec> {
    CATALOG.iter().find(|spec| spec.name == keyword)
}

/// All catalog entries, in declaration order
pub fn entries() -> &'static [GateSpec] {
    CATALOG
}

/// Drawing classification of one participant cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Text inside a rectangle; `square` forces a 1:1 aspect ratio
    Boxed { label: &'static str, square: bool },
    /// Filled control dot
    ControlDot,
    /// Circle with a plus (controlled-NOT target)
    Target,
    /// Swap cross
    Cross,
    /// Meter icon on the measured qubit
    Measurement,
}

impl Glyph {
    /// Node glyphs are sized by a fixed radius instead of by text
    pub fn is_node(self) -> bool {
        matches!(self, Glyph::ControlDot | Glyph::Target | Glyph::Cross)
    }
}
