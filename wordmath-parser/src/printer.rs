//! Human-readable text rendering of AST nodes.

use crate::ast::{BinaryOp, Node, Number, Statement};
use std::fmt;

/// Binding strength used to decide where parentheses are needed.
fn precedence(node: &Node) -> u8 {
    match node {
        Node::Assignment { .. } | Node::FnDeclaration { .. } => 0,
        Node::Binary {
            op: BinaryOp::Add | BinaryOp::Sub,
            ..
        } => 1,
        Node::Binary { .. } => 2,
        Node::Unary { .. } => 3,
        Node::Invocation { ident, .. } if ident == "pow" => 4,
        _ => 5,
    }
}

/// Writes `node`, wrapped in parentheses if it binds weaker than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, node: &Node, min: u8) -> fmt::Result {
    if precedence(node) < min {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(val) => write!(f, "{}", val),
            Number::Float(val) => write!(f, "{:?}", val),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(num) => write!(f, "{}", num),
            Node::Identifier(ident) => write!(f, "{}", ident),
            Node::Binary { lhs, op, rhs } => {
                let prec = precedence(self);
                write_operand(f, lhs, prec)?;
                write!(f, " {} ", op.symbol())?;
                // operators are left associative
                write_operand(f, rhs, prec + 1)
            }
            Node::Unary { op, arg } => {
                write!(f, "{}", op.symbol())?;
                write_operand(f, arg, 3)
            }
            Node::Invocation { ident, args } if ident == "pow" && args.len() == 2 => {
                write_operand(f, &args[0], 5)?;
                write!(f, "^")?;
                write_operand(f, &args[1], 5)
            }
            Node::Invocation { ident, args } => {
                write!(f, "{}(", ident)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Node::Assignment { ident, expr } => write!(f, "{} = {}", ident, expr),
            Node::FnDeclaration {
                ident,
                params,
                body,
            } => write!(f, "{}({}) = {}", ident, params.join(", "), body),
            Node::Empty => Ok(()),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}
