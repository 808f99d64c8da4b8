//! Statement grammar using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::{Operand, Span, Spanned, Statement};
use crate::parser::lexer::{self, Token};

/// Grammar failure, with a span relative to the statement text
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl<'a> From<Rich<'a, Token>> for SyntaxError {
    fn from(err: Rich<'a, Token>) -> Self {
        let found = match err.found() {
            Some(tok) => tok.to_string(),
            None => "end of statement".to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(tok.to_string()),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of statement".to_string()),
                _ => None,
            })
            .collect();

        let message = if expected.is_empty() {
            format!("unexpected {}", found)
        } else {
            format!("unexpected {}, expected {}", found, expected.join(" or "))
        };

        SyntaxError {
            message,
            span: err.span().into_range(),
        }
    }
}

/// Parse one statement (comment already removed, no parallel separators)
pub fn parse_statement(input: &str) -> Result<Statement, SyntaxError> {
    let tokens = lexer::lex(input).map_err(|span| SyntaxError {
        message: format!("unrecognized input '{}'", &input[span.clone()]),
        span,
    })?;

    let len = input.len();
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (tok, SimpleSpan::from(span)));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream =
        Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    statement_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(SyntaxError::from)
                .unwrap_or_else(|| SyntaxError {
                    message: "invalid statement".to_string(),
                    span: 0..len,
                })
        })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> Span {
    e.start()..e.end()
}

fn statement_parser<'a, I>() -> impl Parser<'a, I, Statement, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    let number = select! {
        Token::Number(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

    let operand = choice((
        identifier
            .clone()
            .map(|id: Spanned<String>| Spanned::new(Operand::Name(id.node), id.span)),
        number
            .clone()
            .map(|n: Spanned<f64>| Spanned::new(Operand::Number(n.node), n.span)),
    ));

    // `.name` or `.name(repeat)`
    let subroutine = just(Token::Dot)
        .ignore_then(identifier.clone())
        .then(
            number
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .or_not(),
        )
        .map(|(name, repeat)| Statement::Subroutine { name, repeat });

    // `keyword` or `keyword op, op, ...`
    let instruction = identifier
        .then(
            operand
                .separated_by(just(Token::Comma))
                .collect::<Vec<_>>(),
        )
        .map(|(keyword, operands)| Statement::Instruction { keyword, operands });

    choice((subroutine, instruction)).then_ignore(end())
}
