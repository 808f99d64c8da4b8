//! Syntax tree for a single statement

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A node with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// One operand of an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Channel name (`q0`, `b1`) or alias
    Name(String),
    /// Numeric literal, used for rotation angles
    Number(f64),
}

impl Operand {
    /// Source-like rendering for error messages
    pub fn text(&self) -> String {
        match self {
            Operand::Name(s) => s.clone(),
            Operand::Number(n) => n.to_string(),
        }
    }
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `.name` or `.name(repeat)`
    Subroutine {
        name: Spanned<String>,
        repeat: Option<Spanned<f64>>,
    },
    /// `keyword [operand (, operand)*]`; keyword is not yet case-folded
    Instruction {
        keyword: Spanned<String>,
        operands: Vec<Spanned<Operand>>,
    },
}
