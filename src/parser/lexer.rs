//! Statement lexer using logos

use std::fmt;

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Delimiters
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("|")]
    Pipe,

    // Keywords, channel names and aliases; `c-x` is a single identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"#[^\n]*", logos::skip)]
    Comment,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comma => f.write_str("','"),
            Token::Dot => f.write_str("'.'"),
            Token::ParenOpen => f.write_str("'('"),
            Token::ParenClose => f.write_str("')'"),
            Token::BraceOpen => f.write_str("'{'"),
            Token::BraceClose => f.write_str("'}'"),
            Token::Pipe => f.write_str("'|'"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Comment => f.write_str("comment"),
        }
    }
}

/// Lex a statement into tokens with spans
///
/// Returns the span of the first unrecognized input on failure.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| tok.map(|t| (t, span.clone())).map_err(|_| span))
        .collect()
}
