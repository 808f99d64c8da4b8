//! In-memory circuit model produced by the parser
//!
//! A circuit with `Q` qubits has `2Q` channels: the qubit channels and their
//! paired classical measurement channels. Instructions live in a sparse
//! `(channel, column)` grid; a multi-channel instruction occupies one cell per
//! participant, each holding an identical copy of the instruction.

pub mod catalog;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use catalog::{Arity, ControlRule, GateKind, GateSpec, Glyph, Role};

/// One row of the circuit
///
/// Ordering puts every qubit before every classical bit, each group by index,
/// which is also the canonical row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Qubit(usize),
    ClassicalBit(usize),
}

impl Channel {
    /// Index within the channel's own group
    pub fn index(self) -> usize {
        match self {
            Channel::Qubit(i) | Channel::ClassicalBit(i) => i,
        }
    }

    /// Position in the `2Q` channel table
    pub fn row(self, qubits: usize) -> usize {
        match self {
            Channel::Qubit(i) => i,
            Channel::ClassicalBit(i) => qubits + i,
        }
    }

    /// Inverse of [`Channel::row`]
    pub fn from_row(row: usize, qubits: usize) -> Self {
        if row < qubits {
            Channel::Qubit(row)
        } else {
            Channel::ClassicalBit(row - qubits)
        }
    }

    pub fn is_classical(self) -> bool {
        matches!(self, Channel::ClassicalBit(_))
    }

    /// The measurement partner: `qi <-> bi`
    pub fn partner(self) -> Self {
        match self {
            Channel::Qubit(i) => Channel::ClassicalBit(i),
            Channel::ClassicalBit(i) => Channel::Qubit(i),
        }
    }

    /// Parse a canonical `qN` / `bN` token, rejecting indices outside the circuit
    pub fn parse_canonical(token: &str, qubits: usize) -> Option<Self> {
        fn index(digits: &str, qubits: usize) -> Option<usize> {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok().filter(|&i| i < qubits)
        }

        if let Some(digits) = token.strip_prefix('q') {
            index(digits, qubits).map(Channel::Qubit)
        } else if let Some(digits) = token.strip_prefix('b') {
            index(digits, qubits).map(Channel::ClassicalBit)
        } else {
            None
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Qubit(i) => write!(f, "q{}", i),
            Channel::ClassicalBit(i) => write!(f, "b{}", i),
        }
    }
}

/// A placed instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub gate: GateKind,
    /// Set for `c-x`/`c-z`, and for `cx`/`cz` whose first operand is a classical bit
    pub classical_control: bool,
    /// Resolved operands in source order (angle excluded)
    pub operands: Vec<Channel>,
    pub column: usize,
    pub participants: BTreeSet<Channel>,
    pub angle: Option<f64>,
}

impl Instruction {
    /// Keyword form, distinguishing classical-controlled variants
    pub fn name(&self) -> String {
        if self.classical_control {
            format!("c-{}", self.gate.name().trim_start_matches('c'))
        } else {
            self.gate.name().to_string()
        }
    }

    /// How the placed cells relate; a single cell is always single-channel
    pub fn role(&self) -> Role {
        if self.participants.len() < 2 {
            Role::SingleChannel
        } else if self.classical_control {
            Role::ClassicalControlled
        } else {
            Role::MultiChannel
        }
    }

    /// Whether the vertical connector for this instruction is a double line
    pub fn is_classical_link(&self) -> bool {
        self.classical_control || self.participants.iter().any(|c| c.is_classical())
    }

    /// Glyph drawn in this instruction's cell on `channel`
    pub fn glyph_at(&self, channel: Channel) -> Glyph {
        let boxed = |square| Glyph::Boxed {
            label: self.gate.display_label(),
            square,
        };

        // Topmost participant carries the gate, every other row the control node
        if self.classical_control {
            return if self.participants.first() == Some(&channel) {
                boxed(true)
            } else {
                Glyph::ControlDot
            };
        }

        match self.gate {
            GateKind::Measure if channel.is_classical() => Glyph::ControlDot,
            GateKind::Measure => Glyph::Measurement,
            GateKind::Cnot | GateKind::Cx | GateKind::Toffoli => {
                if self.operands.last() == Some(&channel) {
                    Glyph::Target
                } else {
                    Glyph::ControlDot
                }
            }
            GateKind::Swap => Glyph::Cross,
            GateKind::Cz | GateKind::CPhase | GateKind::Cr => Glyph::ControlDot,
            GateKind::Not => boxed(false),
            _ => boxed(true),
        }
    }
}

/// A named, optionally repeated column range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subroutine {
    pub name: String,
    pub repeat_count: u32,
    pub start_column: usize,
    /// Column cursor when the block closed; the block covers `start_column..end_column`
    pub end_column: usize,
}

impl Subroutine {
    /// `name`, or `name(repeat)` when repeated
    pub fn caption(&self) -> String {
        if self.repeat_count > 1 {
            format!("{}({})", self.name, self.repeat_count)
        } else {
            self.name.clone()
        }
    }

    pub fn columns(&self) -> std::ops::Range<usize> {
        self.start_column..self.end_column
    }
}

/// Sparse `(channel, column) -> instruction` map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: BTreeMap<(Channel, usize), Instruction>,
}

impl Grid {
    pub fn get(&self, channel: Channel, column: usize) -> Option<&Instruction> {
        self.cells.get(&(channel, column))
    }

    pub fn is_occupied(&self, channel: Channel, column: usize) -> bool {
        self.cells.contains_key(&(channel, column))
    }

    pub(crate) fn insert(&mut self, channel: Channel, instruction: Instruction) {
        self.cells.insert((channel, instruction.column), instruction);
    }

    /// Cells in channel order, then column order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, usize, &Instruction)> + '_ {
        self.cells.iter().map(|(&(ch, col), instr)| (ch, col, instr))
    }

    /// Cells of one channel in column order
    pub fn row(&self, channel: Channel) -> impl Iterator<Item = (usize, &Instruction)> + '_ {
        self.cells
            .range((channel, 0)..=(channel, usize::MAX))
            .map(|(&(_, col), instr)| (col, instr))
    }

    pub fn channel_is_used(&self, channel: Channel) -> bool {
        self.row(channel).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn max_column(&self) -> Option<usize> {
        self.cells.keys().map(|&(_, col)| col).max()
    }
}

/// The parsed circuit
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitModel {
    qubits: usize,
    aliases: Vec<Option<String>>,
    grid: Grid,
    subroutines: Vec<Subroutine>,
    column_count: usize,
}

impl CircuitModel {
    pub(crate) fn new(
        qubits: usize,
        aliases: Vec<Option<String>>,
        grid: Grid,
        subroutines: Vec<Subroutine>,
        column_count: usize,
    ) -> Self {
        Self {
            qubits,
            aliases,
            grid,
            subroutines,
            column_count,
        }
    }

    /// Number of qubits `Q`
    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// All `2Q` channels in row order
    pub fn channels(&self) -> impl Iterator<Item = Channel> {
        let q = self.qubits;
        (0..2 * q).map(move |row| Channel::from_row(row, q))
    }

    /// Alias table, indexed by [`Channel::row`]
    pub fn aliases(&self) -> &[Option<String>] {
        &self.aliases
    }

    pub fn alias(&self, channel: Channel) -> Option<&str> {
        self.aliases
            .get(channel.row(self.qubits))
            .and_then(|a| a.as_deref())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn instruction(&self, channel: Channel, column: usize) -> Option<&Instruction> {
        self.grid.get(channel, column)
    }

    pub fn subroutines(&self) -> &[Subroutine] {
        &self.subroutines
    }

    /// Number of columns in use (`0` for a circuit without gates)
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Highest column index used, if any
    pub fn max_column(&self) -> Option<usize> {
        self.column_count.checked_sub(1)
    }

    /// Row label: `|alias>` / `|qN>` for qubits, `alias` / `bN` for bits
    pub fn label(&self, channel: Channel) -> String {
        match (channel, self.alias(channel)) {
            (Channel::Qubit(_), Some(alias)) => format!("|{}>", alias),
            (Channel::Qubit(i), None) => format!("|q{}>", i),
            (Channel::ClassicalBit(_), Some(alias)) => alias.to_string(),
            (Channel::ClassicalBit(i), None) => format!("b{}", i),
        }
    }
}

/// Compact, deterministic text dump used by `--debug` and tests
impl fmt::Display for CircuitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qubits {}", self.qubits)?;
        for channel in self.channels() {
            if let Some(alias) = self.alias(channel) {
                writeln!(f, "map {} {}", channel, alias)?;
            }
        }
        for (channel, column, instr) in self.grid.iter() {
            let participants: Vec<String> =
                instr.participants.iter().map(|c| c.to_string()).collect();
            write!(f, "{}@{} {} [{}]", channel, column, instr.name(), participants.join(" "))?;
            if let Some(angle) = instr.angle {
                write!(f, " angle={}", angle)?;
            }
            writeln!(f)?;
        }
        for sub in &self.subroutines {
            writeln!(f, ".{} {}..{}", sub.caption(), sub.start_column, sub.end_column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(gate: GateKind, operands: &[Channel]) -> Instruction {
        Instruction {
            gate,
            classical_control: false,
            operands: operands.to_vec(),
            column: 0,
            participants: operands.iter().copied().collect(),
            angle: None,
        }
    }

    #[test]
    fn test_channel_rows_roundtrip() {
        assert_eq!(Channel::Qubit(1).row(3), 1);
        assert_eq!(Channel::ClassicalBit(1).row(3), 4);
        assert_eq!(Channel::from_row(4, 3), Channel::ClassicalBit(1));
        assert_eq!(Channel::from_row(2, 3), Channel::Qubit(2));
    }

    #[test]
    fn test_channel_ordering_is_row_order() {
        let mut chans = vec![
            Channel::ClassicalBit(0),
            Channel::Qubit(2),
            Channel::Qubit(0),
        ];
        chans.sort();
        assert_eq!(
            chans,
            vec![Channel::Qubit(0), Channel::Qubit(2), Channel::ClassicalBit(0)]
        );
    }

    #[test]
    fn test_parse_canonical() {
        assert_eq!(Channel::parse_canonical("q1", 2), Some(Channel::Qubit(1)));
        assert_eq!(
            Channel::parse_canonical("b0", 2),
            Some(Channel::ClassicalBit(0))
        );
        assert_eq!(Channel::parse_canonical("q2", 2), None);
        assert_eq!(Channel::parse_canonical("q", 2), None);
        assert_eq!(Channel::parse_canonical("qx1", 2), None);
        assert_eq!(Channel::parse_canonical("foo", 2), None);
    }

    #[test]
    fn test_controlled_glyphs() {
        let cnot = instr(GateKind::Cnot, &[Channel::Qubit(1), Channel::Qubit(0)]);
        assert_eq!(cnot.glyph_at(Channel::Qubit(1)), Glyph::ControlDot);
        assert_eq!(cnot.glyph_at(Channel::Qubit(0)), Glyph::Target);

        let swap = instr(GateKind::Swap, &[Channel::Qubit(0), Channel::Qubit(1)]);
        assert_eq!(swap.glyph_at(Channel::Qubit(0)), Glyph::Cross);
    }

    #[test]
    fn test_classical_controlled_glyphs() {
        let mut cx = instr(GateKind::Cx, &[Channel::ClassicalBit(0), Channel::Qubit(1)]);
        cx.classical_control = true;
        assert_eq!(cx.name(), "c-x");
        assert_eq!(cx.role(), Role::ClassicalControlled);
        assert_eq!(cx.glyph_at(Channel::ClassicalBit(0)), Glyph::ControlDot);
        assert_eq!(
            cx.glyph_at(Channel::Qubit(1)),
            Glyph::Boxed {
                label: "X",
                square: true
            }
        );
        assert!(cx.is_classical_link());
    }

    #[test]
    fn test_classical_controlled_boxes_only_topmost_row() {
        let mut cx = instr(
            GateKind::Cx,
            &[Channel::Qubit(2), Channel::Qubit(0), Channel::ClassicalBit(1)],
        );
        cx.classical_control = true;
        assert_eq!(
            cx.glyph_at(Channel::Qubit(0)),
            Glyph::Boxed {
                label: "X",
                square: true
            }
        );
        assert_eq!(cx.glyph_at(Channel::Qubit(2)), Glyph::ControlDot);
        assert_eq!(cx.glyph_at(Channel::ClassicalBit(1)), Glyph::ControlDot);
    }

    #[test]
    fn test_roles() {
        let h = instr(GateKind::H, &[Channel::Qubit(0)]);
        assert_eq!(h.role(), Role::SingleChannel);
        let swap = instr(GateKind::Swap, &[Channel::Qubit(0), Channel::Qubit(1)]);
        assert_eq!(swap.role(), Role::MultiChannel);

        let mut same_row = instr(GateKind::Cx, &[Channel::Qubit(0), Channel::Qubit(0)]);
        same_row.classical_control = true;
        assert_eq!(same_row.role(), Role::SingleChannel);
    }

    #[test]
    fn test_subroutine_caption() {
        let mut sub = Subroutine {
            name: "blk".to_string(),
            repeat_count: 1,
            start_column: 0,
            end_column: 2,
        };
        assert_eq!(sub.caption(), "blk");
        sub.repeat_count = 3;
        assert_eq!(sub.caption(), "blk(3)");
        assert_eq!(sub.columns(), 0..2);
    }

    #[test]
    fn test_grid_row_iteration() {
        let mut grid = Grid::default();
        let mut a = instr(GateKind::H, &[Channel::Qubit(0)]);
        a.column = 2;
        let b = instr(GateKind::X, &[Channel::Qubit(0)]);
        grid.insert(Channel::Qubit(0), a);
        grid.insert(Channel::Qubit(0), b);
        grid.insert(Channel::Qubit(1), instr(GateKind::Y, &[Channel::Qubit(1)]));

        let cols: Vec<usize> = grid.row(Channel::Qubit(0)).map(|(c, _)| c).collect();
        assert_eq!(cols, vec![0, 2]);
        assert!(grid.channel_is_used(Channel::Qubit(1)));
        assert!(!grid.channel_is_used(Channel::ClassicalBit(0)));
        assert_eq!(grid.max_column(), Some(2));
    }
}
