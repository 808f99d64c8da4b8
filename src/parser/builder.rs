//! Builds a [`CircuitModel`] from source text
//!
//! Lines after the `qubits` declaration are fed through a worklist. A
//! parallel line (`{h q0 | x q1}`) is replaced by its parts, pushed back to
//! the front of the worklist, and a hold counter keeps the column cursor in
//! place until every part has been processed.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::circuit::catalog::{self, Arity, ControlRule, GateKind, GateSpec, Role};
use crate::circuit::{Channel, CircuitModel, Grid, Instruction, Subroutine};
use crate::error::{ParseError, ParseErrorKind, Span};
use crate::parser::ast::{Operand, Spanned, Statement};
use crate::parser::grammar::{parse_statement, SyntaxError};

/// Parse a circuit description
///
/// Either the whole source is accepted or the first offending line is
/// reported; no partial model is returned.
pub fn parse(source: &str) -> Result<CircuitModel, ParseError> {
    let lines = split_lines(source);
    let (position, qubits) = find_declaration(&lines, source.len())?;
    debug!(qubits, line = position + 1; "Found qubit declaration");

    let mut worklist: VecDeque<PendingStatement<'_>> = lines
        .iter()
        .skip(position + 1)
        .map(PendingStatement::from_line)
        .collect();

    let mut ctx = ParseContext::new(qubits);
    while let Some(stmt) = worklist.pop_front() {
        ctx.process(stmt, &mut worklist)?;
    }
    ctx.finish()
}

/// One physical source line
#[derive(Debug, Clone, Copy)]
struct SourceLine<'a> {
    /// 1-based
    number: usize,
    /// Byte offset of the line start in the source
    offset: usize,
    text: &'a str,
}

fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut offset = 0;
    source
        .split('\n')
        .enumerate()
        .map(|(i, raw)| {
            let line = SourceLine {
                number: i + 1,
                offset,
                text: raw.strip_suffix('\r').unwrap_or(raw),
            };
            offset += raw.len() + 1;
            line
        })
        .collect()
}

fn strip_comment(text: &str) -> &str {
    text.find('#').map_or(text, |i| &text[..i])
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// Largest accepted `qubits` count
pub const MAX_QUBITS: usize = 1 << 16;

/// Locate `qubits <N>`; returns the line index and `N`
fn find_declaration(lines: &[SourceLine<'_>], source_len: usize) -> Result<(usize, usize), ParseError> {
    for (index, line) in lines.iter().enumerate() {
        let text = strip_comment(line.text);
        let mut words = text.split_whitespace();
        if !words.next().is_some_and(|w| w.eq_ignore_ascii_case("qubits")) {
            continue;
        }

        let count = words.next().and_then(|w| w.parse::<usize>().ok());
        return match (count, words.next()) {
            (Some(n), None) if (1..=MAX_QUBITS).contains(&n) => Ok((index, n)),
            _ => {
                let start = line.offset + (text.len() - text.trim_start().len());
                let end = line.offset + text.trim_end().len();
                Err(ParseError::new(
                    ParseErrorKind::MissingDeclaration,
                    line.number,
                    line.text,
                    start..end.max(start),
                ))
            }
        };
    }
    Err(ParseError::missing_declaration(source_len))
}

/// A statement waiting in the worklist
#[derive(Debug, Clone, Copy)]
struct PendingStatement<'a> {
    /// Statement text with any comment removed
    text: &'a str,
    /// Absolute byte offset of `text`
    offset: usize,
    /// Line the statement came from, for error reporting
    line: SourceLine<'a>,
    /// Parallel parts inherit this from their line
    indented: bool,
}

impl<'a> PendingStatement<'a> {
    fn from_line(line: &SourceLine<'a>) -> Self {
        Self {
            text: strip_comment(line.text),
            offset: line.offset,
            line: *line,
            indented: line.text.starts_with([' ', '\t']),
        }
    }

    /// Span of the trimmed statement
    fn span(&self) -> Span {
        let start = self.offset + (self.text.len() - self.text.trim_start().len());
        let end = self.offset + self.text.trim_end().len();
        start..end.max(start)
    }

    /// Convert a statement-relative span into a source span
    fn absolute(&self, span: &Span) -> Span {
        self.offset + span.start..self.offset + span.end
    }

    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, self.line.number, self.line.text, span)
    }

    fn syntax_error(&self, err: SyntaxError) -> ParseError {
        self.error(
            ParseErrorKind::MalformedStatement {
                message: err.message,
            },
            self.absolute(&err.span),
        )
    }
}

/// Subroutine that has been opened but not yet flushed
#[derive(Debug)]
struct OpenSubroutine {
    name: String,
    repeat_count: u32,
    start_column: usize,
    line: usize,
    text: String,
    span: Span,
}

/// Mutable state of a single parse call
#[derive(Debug)]
struct ParseContext {
    qubits: usize,
    aliases: Vec<Option<String>>,
    grid: Grid,
    open: Option<OpenSubroutine>,
    subroutines: Vec<Subroutine>,
    column: usize,
    /// Parallel parts still to be processed in the shared column
    hold: usize,
    /// Whether any part of the current parallel block placed a gate
    shared_used: bool,
}

impl ParseContext {
    fn new(qubits: usize) -> Self {
        Self {
            qubits,
            aliases: vec![None; qubits.saturating_mul(2)],
            grid: Grid::default(),
            open: None,
            subroutines: Vec::new(),
            column: 0,
            hold: 0,
            shared_used: false,
        }
    }

    fn process<'a>(
        &mut self,
        stmt: PendingStatement<'a>,
        worklist: &mut VecDeque<PendingStatement<'a>>,
    ) -> Result<(), ParseError> {
        if stmt.text.trim().is_empty() {
            return Ok(());
        }

        if stmt.text.contains('|') || stmt.text.trim_start().starts_with('{') {
            return self.expand_parallel(&stmt, worklist);
        }

        let placed = self.execute(&stmt)?;
        self.complete_statement(placed);
        Ok(())
    }

    /// Replace a parallel line by its parts at the front of the worklist
    fn expand_parallel<'a>(
        &mut self,
        stmt: &PendingStatement<'a>,
        worklist: &mut VecDeque<PendingStatement<'a>>,
    ) -> Result<(), ParseError> {
        let mut parts: Vec<(usize, &'a str)> = Vec::new();
        let mut relative = 0;
        for segment in stmt.text.split('|') {
            parts.push((relative, segment));
            relative += segment.len() + 1;
        }

        if let Some((start, first)) = parts.first_mut() {
            if let Some(i) = first.find('{') {
                let rest = first[i..].trim_start_matches(|c: char| c == '{' || c.is_whitespace());
                *start += first.len() - rest.len();
                *first = rest;
            }
        }
        if let Some((_, last)) = parts.last_mut() {
            if let Some(i) = last.find('}') {
                *last = &last[..i];
            }
        }

        if let Some((relative, text)) = parts.iter().find(|(_, text)| text.contains(['{', '}'])) {
            let start = stmt.offset + relative;
            return Err(stmt.error(
                ParseErrorKind::MalformedStatement {
                    message: "nested parallel block".to_string(),
                },
                start..start + text.len(),
            ));
        }

        let pending: Vec<PendingStatement<'a>> = parts
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(relative, text)| PendingStatement {
                text,
                offset: stmt.offset + relative,
                line: stmt.line,
                indented: stmt.indented,
            })
            .collect();

        debug!(line = stmt.line.number, parts = pending.len(); "Expanding parallel block");
        self.hold = pending.len();
        self.shared_used = false;
        for part in pending.into_iter().rev() {
            worklist.push_front(part);
        }
        Ok(())
    }

    /// Advance the column cursor once a statement has been handled
    fn complete_statement(&mut self, placed: bool) {
        if self.hold > 0 {
            self.hold -= 1;
            self.shared_used |= placed;
            if self.hold == 0 && self.shared_used {
                self.column += 1;
            }
        } else if placed {
            self.column += 1;
        }
    }

    /// Handle one statement; returns whether it placed anything in the grid
    fn execute(&mut self, stmt: &PendingStatement<'_>) -> Result<bool, ParseError> {
        let word = first_word(stmt.text).to_ascii_lowercase();

        if word.starts_with("display") {
            trace!(line = stmt.line.number; "Skipping display directive");
            return Ok(false);
        }

        if !word.starts_with('.') && !stmt.indented && self.open.is_some() {
            self.close_subroutine()?;
        }

        if word == "error_model" {
            debug!(line = stmt.line.number; "Skipping unsupported error_model directive");
            return Ok(false);
        }

        match parse_statement(stmt.text).map_err(|err| stmt.syntax_error(err))? {
            Statement::Subroutine { name, repeat } => {
                self.open_subroutine(stmt, name, repeat)?;
                Ok(false)
            }
            Statement::Instruction { keyword, operands } => {
                self.instruction(stmt, keyword, operands)
            }
        }
    }

    fn instruction(
        &mut self,
        stmt: &PendingStatement<'_>,
        keyword: Spanned<String>,
        operands: Vec<Spanned<Operand>>,
    ) -> Result<bool, ParseError> {
        let name = keyword.node.to_ascii_lowercase();

        if name == "qubits" {
            debug!(line = stmt.line.number; "Ignoring repeated qubits declaration");
            return Ok(false);
        }

        let spec = catalog::lookup(&name).ok_or_else(|| {
            stmt.error(
                ParseErrorKind::UnknownInstruction {
                    keyword: keyword.node.clone(),
                },
                stmt.absolute(&keyword.span),
            )
        })?;

        if !spec.arity.accepts(operands.len()) {
            return Err(stmt.error(
                ParseErrorKind::ArityMismatch {
                    keyword: name,
                    expected: spec.arity,
                    found: operands.len(),
                },
                stmt.span(),
            ));
        }

        if spec.role == Role::Declaration {
            self.bind_alias(stmt, &operands)?;
            return Ok(false);
        }

        self.place_gate(stmt, spec, operands)
    }

    /// `map <qN|bN>, <alias>`
    fn bind_alias(
        &mut self,
        stmt: &PendingStatement<'_>,
        operands: &[Spanned<Operand>],
    ) -> Result<(), ParseError> {
        let [target, alias] = operands else {
            return Err(stmt.error(
                ParseErrorKind::ArityMismatch {
                    keyword: "map".to_string(),
                    expected: Arity::Exact(2),
                    found: operands.len(),
                },
                stmt.span(),
            ));
        };

        let channel = match &target.node {
            Operand::Name(token) => Channel::parse_canonical(token, self.qubits),
            Operand::Number(_) => None,
        }
        .ok_or_else(|| {
            stmt.error(
                ParseErrorKind::UnresolvedOperand {
                    operand: target.node.text(),
                },
                stmt.absolute(&target.span),
            )
        })?;

        let Operand::Name(alias_name) = &alias.node else {
            return Err(stmt.error(
                ParseErrorKind::MalformedStatement {
                    message: format!("alias must be a name, found {}", alias.node.text()),
                },
                stmt.absolute(&alias.span),
            ));
        };

        for slot in self.aliases.iter_mut() {
            if slot.as_deref() == Some(alias_name.as_str()) {
                *slot = None;
            }
        }
        if let Some(slot) = self.aliases.get_mut(channel.row(self.qubits)) {
            *slot = Some(alias_name.clone());
        }

        debug!(channel:% = channel, alias = alias_name.as_str(); "Bound alias");
        Ok(())
    }

    fn place_gate(
        &mut self,
        stmt: &PendingStatement<'_>,
        spec: &GateSpec,
        mut operands: Vec<Spanned<Operand>>,
    ) -> Result<bool, ParseError> {
        let angle = if spec.kind.takes_angle() {
            match operands.pop() {
                Some(Spanned {
                    node: Operand::Number(value),
                    ..
                }) => Some(value),
                Some(other) => {
                    return Err(stmt.error(
                        ParseErrorKind::UnresolvedOperand {
                            operand: other.node.text(),
                        },
                        stmt.absolute(&other.span),
                    ))
                }
                None => None,
            }
        } else {
            None
        };

        let resolved = operands
            .iter()
            .map(|op| self.resolve(stmt, op).map(|ch| (ch, op.span.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        if spec.kind == GateKind::Measure {
            return self.place_measurements(stmt, &resolved);
        }

        let channels: Vec<Channel> = resolved.iter().map(|(ch, _)| *ch).collect();
        let classical_control = match spec.control {
            ControlRule::Quantum => false,
            ControlRule::Ambiguous => channels.first().is_some_and(|ch| ch.is_classical()),
            ControlRule::Classical => true,
        };

        let instruction = Instruction {
            gate: spec.kind,
            classical_control,
            participants: channels.iter().copied().collect(),
            operands: channels,
            column: self.column,
            angle,
        };
        self.occupy(stmt, instruction)?;
        Ok(true)
    }

    /// Each measured qubit gets its own `{qi, bi}` instruction
    fn place_measurements(
        &mut self,
        stmt: &PendingStatement<'_>,
        resolved: &[(Channel, Span)],
    ) -> Result<bool, ParseError> {
        let mut targets = Vec::new();
        if resolved.is_empty() {
            targets.extend(0..self.qubits);
        }
        for (channel, span) in resolved {
            match channel {
                Channel::Qubit(i) => targets.push(*i),
                Channel::ClassicalBit(_) => {
                    return Err(stmt.error(
                        ParseErrorKind::MalformedStatement {
                            message: format!("measure expects qubit operands, found {}", channel),
                        },
                        stmt.absolute(span),
                    ))
                }
            }
        }

        for index in targets {
            let qubit = Channel::Qubit(index);
            let instruction = Instruction {
                gate: GateKind::Measure,
                classical_control: false,
                operands: vec![qubit],
                column: self.column,
                participants: [qubit, qubit.partner()].into_iter().collect(),
                angle: None,
            };
            self.occupy(stmt, instruction)?;
        }
        Ok(true)
    }

    /// Alias first, then canonical `qN` / `bN`
    fn resolve(
        &self,
        stmt: &PendingStatement<'_>,
        operand: &Spanned<Operand>,
    ) -> Result<Channel, ParseError> {
        match &operand.node {
            Operand::Name(name) => self
                .aliases
                .iter()
                .position(|alias| alias.as_deref() == Some(name.as_str()))
                .map(|row| Channel::from_row(row, self.qubits))
                .or_else(|| Channel::parse_canonical(name, self.qubits)),
            Operand::Number(_) => None,
        }
        .ok_or_else(|| {
            stmt.error(
                ParseErrorKind::UnresolvedOperand {
                    operand: operand.node.text(),
                },
                stmt.absolute(&operand.span),
            )
        })
    }

    /// Put one copy of the instruction in every participant cell
    fn occupy(
        &mut self,
        stmt: &PendingStatement<'_>,
        instruction: Instruction,
    ) -> Result<(), ParseError> {
        let column = instruction.column;
        if let Some(taken) = instruction
            .participants
            .iter()
            .find(|ch| self.grid.is_occupied(**ch, column))
        {
            return Err(stmt.error(
                ParseErrorKind::MalformedStatement {
                    message: format!("{} is already used in column {}", taken, column),
                },
                stmt.span(),
            ));
        }

        trace!(column, gate = instruction.gate.name(); "Placing instruction");
        for channel in instruction.participants.clone() {
            self.grid.insert(channel, instruction.clone());
        }
        Ok(())
    }

    fn open_subroutine(
        &mut self,
        stmt: &PendingStatement<'_>,
        name: Spanned<String>,
        repeat: Option<Spanned<f64>>,
    ) -> Result<(), ParseError> {
        if self.open.is_some() {
            self.close_subroutine()?;
        }

        let repeat_count = match repeat {
            None => 1,
            Some(repeat) => positive_count(repeat.node).ok_or_else(|| {
                stmt.error(
                    ParseErrorKind::MalformedSubroutine {
                        reason: format!(
                            "repeat count must be a positive integer, found {}",
                            repeat.node
                        ),
                    },
                    stmt.absolute(&repeat.span),
                )
            })?,
        };

        debug!(name = name.node.as_str(), repeat_count, start = self.column; "Opening subroutine");
        self.open = Some(OpenSubroutine {
            name: name.node,
            repeat_count,
            start_column: self.column,
            line: stmt.line.number,
            text: stmt.line.text.to_string(),
            span: stmt.span(),
        });
        Ok(())
    }

    /// Flush the open subroutine, ending it at the current column
    fn close_subroutine(&mut self) -> Result<(), ParseError> {
        let open = self.open.take().ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::MalformedSubroutine {
                    reason: "no subroutine is open".to_string(),
                },
                0,
                "",
                0..0,
            )
        })?;

        if open.start_column == self.column {
            return Err(ParseError::new(
                ParseErrorKind::MalformedSubroutine {
                    reason: format!("subroutine '{}' contains no instructions", open.name),
                },
                open.line,
                open.text,
                open.span,
            ));
        }

        debug!(name = open.name.as_str(), start = open.start_column, end = self.column; "Flushing subroutine");
        self.subroutines.push(Subroutine {
            name: open.name,
            repeat_count: open.repeat_count,
            start_column: open.start_column,
            end_column: self.column,
        });
        Ok(())
    }

    fn finish(mut self) -> Result<CircuitModel, ParseError> {
        if self.open.is_some() {
            self.close_subroutine()?;
        }

        let column_count = match self.grid.max_column() {
            Some(max) => self.column.max(max + 1),
            None => self.column,
        };

        debug!(
            cells = self.grid.len(),
            columns = column_count,
            subroutines = self.subroutines.len();
            "Parsed circuit"
        );
        Ok(CircuitModel::new(
            self.qubits,
            self.aliases,
            self.grid,
            self.subroutines,
            column_count,
        ))
    }
}

fn positive_count(value: f64) -> Option<u32> {
    if value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(source: &str) -> ParseErrorKind {
        parse(source).unwrap_err().kind
    }

    fn gate_at(model: &CircuitModel, channel: Channel, column: usize) -> Option<String> {
        model.instruction(channel, column).map(|i| i.name())
    }

    #[test]
    fn test_lines_before_declaration_are_ignored() {
        let model = parse("version 1.0\n\nqubits 1\nh q0").unwrap();
        assert_eq!(model.qubits(), 1);
        assert_eq!(gate_at(&model, Channel::Qubit(0), 0).as_deref(), Some("h"));
    }

    #[test]
    fn test_malformed_declaration() {
        assert_eq!(kind("qubits two\nh q0"), ParseErrorKind::MissingDeclaration);
        assert_eq!(kind("qubits 0"), ParseErrorKind::MissingDeclaration);
        let err = parse("h q0\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingDeclaration);
        assert_eq!(err.line, 0);
    }

    #[test]
    fn test_oversized_declaration() {
        assert_eq!(kind("qubits 18446744073709551615\nh q0"), ParseErrorKind::MissingDeclaration);
        assert_eq!(kind("qubits 100000000000"), ParseErrorKind::MissingDeclaration);
        assert_eq!(kind("qubits 99999999999999999999999"), ParseErrorKind::MissingDeclaration);
        assert_eq!(parse(&format!("qubits {}", MAX_QUBITS)).unwrap().qubits(), MAX_QUBITS);
    }

    #[test]
    fn test_keyword_is_case_folded() {
        let model = parse("QUBITS 2\nCNOT q0, q1").unwrap();
        assert_eq!(gate_at(&model, Channel::Qubit(1), 0).as_deref(), Some("cnot"));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let model = parse("qubits 1 # one qubit\n\n# whole line\n   # indented\nh q0 # trailing\nx q0").unwrap();
        assert_eq!(model.column_count(), 2);
        assert_eq!(gate_at(&model, Channel::Qubit(0), 1).as_deref(), Some("x"));
    }

    #[test]
    fn test_parallel_block_shares_column() {
        let model = parse("qubits 3\n{h q0 | x q1 | y q2}\nz q0").unwrap();
        assert_eq!(gate_at(&model, Channel::Qubit(0), 0).as_deref(), Some("h"));
        assert_eq!(gate_at(&model, Channel::Qubit(1), 0).as_deref(), Some("x"));
        assert_eq!(gate_at(&model, Channel::Qubit(2), 0).as_deref(), Some("y"));
        assert_eq!(gate_at(&model, Channel::Qubit(0), 1).as_deref(), Some("z"));
    }

    #[test]
    fn test_doubled_braces_share_column() {
        let model = parse("qubits 3\n{{h q0 | x q1 | y q2}}\nz q0").unwrap();
        assert_eq!(gate_at(&model, Channel::Qubit(0), 0).as_deref(), Some("h"));
        assert_eq!(gate_at(&model, Channel::Qubit(1), 0).as_deref(), Some("x"));
        assert_eq!(gate_at(&model, Channel::Qubit(2), 0).as_deref(), Some("y"));
        assert_eq!(model.column_count(), 2);
    }

    #[test]
    fn test_nested_parallel_block_is_rejected() {
        let err = parse("qubits 3\n{h q0 | {x q1} | y q2}").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedStatement { .. }));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_parallel_block_without_braces() {
        let model = parse("qubits 2\nh q0 | x q1\nz q1").unwrap();
        assert_eq!(gate_at(&model, Channel::Qubit(1), 0).as_deref(), Some("x"));
        assert_eq!(gate_at(&model, Channel::Qubit(1), 1).as_deref(), Some("z"));
    }

    #[test]
    fn test_parallel_block_ending_in_map_still_advances() {
        let model = parse("qubits 2\n{h q0 | map q1, anc}\nx anc").unwrap();
        assert_eq!(model.alias(Channel::Qubit(1)), Some("anc"));
        assert_eq!(gate_at(&model, Channel::Qubit(1), 1).as_deref(), Some("x"));
    }

    #[test]
    fn test_parallel_block_with_only_maps_keeps_column() {
        let model = parse("qubits 2\n{map q0, a | map q1, b}\nh a").unwrap();
        assert_eq!(gate_at(&model, Channel::Qubit(0), 0).as_deref(), Some("h"));
    }

    #[test]
    fn test_empty_parallel_parts_are_dropped() {
        let model = parse("qubits 2\n{h q0 | }\nx q0").unwrap();
        assert_eq!(gate_at(&model, Channel::Qubit(0), 1).as_deref(), Some("x"));
    }

    #[test]
    fn test_parallel_conflict_is_rejected() {
        let err = parse("qubits 2\n{h q0 | x q0}").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedStatement { .. }));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_map_moves_alias() {
        let model = parse("qubits 2\nmap q0, anc\nmap q1, anc").unwrap();
        assert_eq!(model.alias(Channel::Qubit(0)), None);
        assert_eq!(model.alias(Channel::Qubit(1)), Some("anc"));
    }

    #[test]
    fn test_map_classical_bit() {
        let model = parse("qubits 2\nmap b1, flag\nc-x flag, q0").unwrap();
        assert_eq!(model.alias(Channel::ClassicalBit(1)), Some("flag"));
        let instr = model.instruction(Channel::ClassicalBit(1), 0).unwrap();
        assert!(instr.classical_control);
    }

    #[test]
    fn test_map_requires_canonical_target() {
        assert_eq!(
            kind("qubits 2\nmap x0, foo"),
            ParseErrorKind::UnresolvedOperand {
                operand: "x0".to_string()
            }
        );
    }

    #[test]
    fn test_out_of_range_operand() {
        let err = parse("qubits 2\nh q2").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnresolvedOperand {
                operand: "q2".to_string()
            }
        );
        assert_eq!(err.span, 11..13);
    }

    #[test]
    fn test_rotation_angle() {
        let model = parse("qubits 1\nrx q0, 0.5").unwrap();
        let instr = model.instruction(Channel::Qubit(0), 0).unwrap();
        assert_eq!(instr.angle, Some(0.5));
        assert_eq!(instr.operands, vec![Channel::Qubit(0)]);
    }

    #[test]
    fn test_rotation_angle_must_be_number() {
        assert_eq!(
            kind("qubits 2\nrx q0, q1"),
            ParseErrorKind::UnresolvedOperand {
                operand: "q1".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_measure_pairs_each_qubit() {
        let model = parse("qubits 3\nmeasure q0, q2").unwrap();
        let instr = model.instruction(Channel::ClassicalBit(2), 0).unwrap();
        assert_eq!(
            instr.participants.iter().copied().collect::<Vec<_>>(),
            vec![Channel::Qubit(2), Channel::ClassicalBit(2)]
        );
        assert!(model.instruction(Channel::Qubit(1), 0).is_none());
    }

    #[test]
    fn test_measure_rejects_classical_operand() {
        let err = parse("qubits 1\nmeasure b0").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedStatement { .. }));
    }

    #[test]
    fn test_directives_are_skipped() {
        let model = parse("qubits 1\nh q0\ndisplay\ndisplay_binary b[0:1]\nerror_model depolarizing_channel, 0.001\nqubits 4\nx q0").unwrap();
        assert_eq!(model.qubits(), 1);
        assert_eq!(gate_at(&model, Channel::Qubit(0), 1).as_deref(), Some("x"));
        assert_eq!(model.column_count(), 2);
    }

    #[test]
    fn test_subroutine_closed_by_next_subroutine() {
        let model = parse("qubits 1\n.a\n  h q0\n  x q0\n.b(2)\n  y q0").unwrap();
        let subs = model.subroutines();
        assert_eq!(subs.len(), 2);
        assert_eq!((subs[0].start_column, subs[0].end_column), (0, 2));
        assert_eq!((subs[1].start_column, subs[1].end_column), (2, 3));
        assert_eq!(subs[1].repeat_count, 2);
    }

    #[test]
    fn test_parallel_inside_subroutine_keeps_it_open() {
        let model = parse("qubits 2\n.blk\n  {h q0 | x q1}\n  y q0\nz q0").unwrap();
        let sub = &model.subroutines()[0];
        assert_eq!((sub.start_column, sub.end_column), (0, 2));
    }

    #[test]
    fn test_empty_subroutine_is_rejected() {
        let err = parse("qubits 1\n.empty\nh q0").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::MalformedSubroutine { .. }
        ));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_bad_repeat_count() {
        assert!(matches!(
            kind("qubits 1\n.blk(0)\n  h q0"),
            ParseErrorKind::MalformedSubroutine { .. }
        ));
        assert!(matches!(
            kind("qubits 1\n.blk(1.5)\n  h q0"),
            ParseErrorKind::MalformedSubroutine { .. }
        ));
    }

    #[test]
    fn test_syntax_error_span_is_absolute() {
        let err = parse("qubits 2\nh q0 q1").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedStatement { .. }));
        assert_eq!(err.text, "h q0 q1");
        assert!(err.span.start >= 9);
    }

    #[test]
    fn test_unknown_keyword_span() {
        let err = parse("qubits 2\n  foo q0").unwrap_err();
        assert_eq!(err.span, 11..14);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_positive_count() {
        assert_eq!(positive_count(3.0), Some(3));
        assert_eq!(positive_count(0.0), None);
        assert_eq!(positive_count(-2.0), None);
        assert_eq!(positive_count(2.5), None);
    }
}
