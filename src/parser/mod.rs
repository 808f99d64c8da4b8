//! Parser for the circuit description language

pub mod ast;
mod builder;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use builder::parse;
pub use grammar::{parse_statement, SyntaxError};
