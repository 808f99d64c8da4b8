//! Error types for parsing circuit descriptions

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::circuit::Arity;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// What went wrong while parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("missing or malformed `qubits <N>` declaration")]
    MissingDeclaration,

    #[error("unknown instruction '{keyword}'")]
    UnknownInstruction { keyword: String },

    #[error("'{keyword}' takes {expected} operand(s), found {found}")]
    ArityMismatch {
        keyword: String,
        expected: Arity,
        found: usize,
    },

    #[error("cannot resolve operand '{operand}'")]
    UnresolvedOperand { operand: String },

    #[error("malformed subroutine: {reason}")]
    MalformedSubroutine { reason: String },

    #[error("malformed statement: {message}")]
    MalformedStatement { message: String },
}

/// A fatal parse error, pointing at the offending source line
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}{}", location(.line, .text))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number, `0` when no line is to blame
    pub line: usize,
    /// Original text of the offending line
    pub text: String,
    /// Byte range within the whole source
    pub span: Span,
}

fn location(line: &usize, text: &str) -> String {
    if *line == 0 {
        String::new()
    } else {
        format!(" at line {}: `{}`", line, text.trim())
    }
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            line,
            text: text.into(),
            span,
        }
    }

    /// Declaration not found anywhere in the source
    pub fn missing_declaration(source_len: usize) -> Self {
        Self::new(
            ParseErrorKind::MissingDeclaration,
            0,
            String::new(),
            source_len..source_len,
        )
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let message = self.kind.to_string();
        let label_message = match &self.kind {
            ParseErrorKind::MissingDeclaration if self.line == 0 => {
                "expected a `qubits <N>` line".to_string()
            }
            ParseErrorKind::ArityMismatch { expected, .. } => {
                format!("expected {} operand(s)", expected)
            }
            _ => message.clone(),
        };

        let written = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(label_message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}
