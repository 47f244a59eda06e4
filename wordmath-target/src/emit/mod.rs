//! Serializes a [`Unit`] to source text.

mod csharp;
mod visual_basic;

pub use csharp::CSharpEmitter;
pub use visual_basic::VisualBasicEmitter;

use crate::unit::{BinOp, Expr, Unit};
use serde::{Deserialize, Serialize};

/// A target language backend.
pub trait Emitter {
    fn language(&self) -> Language;
    /// Returns the complete source of `unit`.
    fn emit_source(&self, unit: &Unit) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    CSharp,
    VisualBasic,
}

impl Language {
    /// Returns the backend emitting this language.
    pub fn emitter(self) -> Box<dyn Emitter> {
        match self {
            Language::CSharp => Box::new(CSharpEmitter),
            Language::VisualBasic => Box::new(VisualBasicEmitter),
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Language::CSharp => "cs",
            Language::VisualBasic => "vb",
        }
    }
}

/// Source buffer with indentation.
pub(crate) struct Writer {
    output: String,
    indent: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    pub fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.output
    }
}

/// Binding strength of `expr`. Both backends share the arithmetic precedence rules.
pub(crate) fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary {
            op: BinOp::Add | BinOp::Sub,
            ..
        } => 1,
        Expr::Binary { .. } => 2,
        Expr::Neg(_) => 3,
        Expr::Long(val) if *val < 0 => 3,
        Expr::Double(val) if val.is_sign_negative() => 3,
        _ => 4,
    }
}

/// Renders a binary expression with the minimum of parentheses. Operators are left associative.
pub(crate) fn binary(
    lhs: &Expr,
    op: BinOp,
    rhs: &Expr,
    mut expr: impl FnMut(&Expr) -> String,
) -> String {
    let prec = if matches!(op, BinOp::Add | BinOp::Sub) { 1 } else { 2 };
    let lhs = parenthesize(lhs, prec, &mut expr);
    let rhs = parenthesize(rhs, prec + 1, &mut expr);
    format!("{} {} {}", lhs, op.symbol(), rhs)
}

/// Renders `operand`, wrapped in parentheses if it binds weaker than `min`.
pub(crate) fn parenthesize(
    operand: &Expr,
    min: u8,
    expr: &mut impl FnMut(&Expr) -> String,
) -> String {
    if precedence(operand) < min {
        format!("({})", expr(operand))
    } else {
        expr(operand)
    }
}

/// Floating point literal that always reads back as a floating point number (`2.0`, `1e20`).
pub(crate) fn double_literal(val: f64) -> String {
    format!("{:?}", val)
}

/// Escapes `text` for a composite format string (`{` and `}` are doubled).
pub(crate) fn escape_format(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}
