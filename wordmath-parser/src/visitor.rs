//! Visitor pattern for AST nodes.

use crate::ast::{Node, Program, Statement};

pub trait Visitor<'ast>: Sized {
    fn visit_node(&mut self, node: &'ast Node) {
        walk_node(self, node);
    }
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        walk_statement(self, stmt);
    }
    fn visit_program(&mut self, program: &'ast Program) {
        for stmt in &program.statements {
            self.visit_statement(stmt);
        }
    }
}

pub fn walk_node<'ast>(visitor: &mut impl Visitor<'ast>, node: &'ast Node) {
    match node {
        Node::Number(_) => {}
        Node::Identifier(_) => {}
        Node::Binary { lhs, op: _, rhs } => {
            visitor.visit_node(lhs);
            visitor.visit_node(rhs);
        }
        Node::Unary { op: _, arg } => visitor.visit_node(arg),
        Node::Invocation { ident: _, args } => {
            for arg in args {
                visitor.visit_node(arg);
            }
        }
        Node::Assignment { ident: _, expr } => visitor.visit_node(expr),
        Node::FnDeclaration {
            ident: _,
            params: _,
            body,
        } => visitor.visit_node(body),
        Node::Empty => {}
    }
}

pub fn walk_statement<'ast>(visitor: &mut impl Visitor<'ast>, stmt: &'ast Statement) {
    visitor.visit_node(&stmt.body);
}
