//! Parses MathML markup into a [`ast::Program`].

pub mod ast;
pub mod cursor;
pub mod lexer;
pub mod markup;
pub mod parser;
pub mod printer;
pub mod visitor;

pub use parser::{ParseOptions, Parser};
