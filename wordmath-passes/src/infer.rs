//! Numeric kind inference.

use crate::resolve::{Symbol, SymbolTable};
use wordmath_parser::ast::Node;

/// Whether a value is a 64 bit integer or a floating point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    Integer,
    Float,
}

impl NumKind {
    /// Kind of a value combining `self` and `other`. Float wins.
    pub fn join(self, other: NumKind) -> NumKind {
        match (self, other) {
            (NumKind::Integer, NumKind::Integer) => NumKind::Integer,
            _ => NumKind::Float,
        }
    }
}

/// Infers the kind of `node` in `scope`.
/// Subtrees that are floating point by structure are settled by [`Node::is_float`]. Otherwise
/// identifiers are looked up: bound variables carry their kind while parameters and free
/// variables (read at runtime) are floating point.
pub fn infer(node: &Node, scope: &SymbolTable) -> NumKind {
    if node.is_float() {
        return NumKind::Float;
    }
    match node {
        Node::Identifier(ident) => match scope.get(ident) {
            Some(Symbol::Variable { kind, .. }) => *kind,
            _ => NumKind::Float,
        },
        Node::Binary { lhs, rhs, .. } => infer(lhs, scope).join(infer(rhs, scope)),
        Node::Unary { arg, .. } => infer(arg, scope),
        Node::Assignment { expr, .. } => infer(expr, scope),
        Node::Invocation { .. } | Node::FnDeclaration { .. } => NumKind::Float,
        Node::Number(_) | Node::Empty => NumKind::Integer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::Naming;
    use wordmath_parser::ast::{BinaryOp, Number, UnaryOp, PI};

    fn int(val: i64) -> Node {
        Node::Number(Number::Integer(val))
    }

    #[test]
    fn test_literals_and_operators() {
        let scope = SymbolTable::new();
        let sum = Node::binary(int(2), BinaryOp::Add, Node::binary(int(3), BinaryOp::Mul, int(4)));
        assert_eq!(infer(&sum, &scope), NumKind::Integer);
        let half = Node::binary(int(1), BinaryOp::Div, int(2));
        assert_eq!(infer(&half, &scope), NumKind::Float);
        let nested = Node::binary(int(1), BinaryOp::Sub, Node::binary(int(2), BinaryOp::Mul, half));
        assert_eq!(infer(&nested, &scope), NumKind::Float);
        assert_eq!(infer(&Node::identifier(PI), &scope), NumKind::Float);
        assert_eq!(
            infer(&Node::invocation("pow", vec![int(2), int(3)]), &scope),
            NumKind::Float
        );
    }

    #[test]
    fn test_agrees_with_structure_without_identifiers() {
        let scope = SymbolTable::new();
        let nodes = [
            int(7),
            Node::Number(Number::Float(2.5)),
            Node::unary(UnaryOp::Minus, Node::binary(int(1), BinaryOp::Mul, int(2))),
            Node::binary(int(3), BinaryOp::Add, Node::unary(UnaryOp::Minus, Node::binary(int(1), BinaryOp::Div, int(4)))),
            Node::binary(Node::identifier(PI), BinaryOp::Mul, int(2)),
        ];
        for node in &nodes {
            let expected = if node.is_float() { NumKind::Float } else { NumKind::Integer };
            assert_eq!(infer(node, &scope), expected, "{}", node);
        }
    }

    #[test]
    fn test_identifiers() {
        let naming = Naming::default();
        let mut scope = SymbolTable::new();
        scope.declare_variable("n", NumKind::Integer, &naming);
        scope.declare_variable("r", NumKind::Float, &naming);

        let n_plus_one = Node::binary(Node::identifier("n"), BinaryOp::Add, int(1));
        assert_eq!(infer(&n_plus_one, &scope), NumKind::Integer);
        assert_eq!(infer(&Node::identifier("r"), &scope), NumKind::Float);
        // free variables are read as floating point numbers
        assert_eq!(infer(&Node::identifier("y"), &scope), NumKind::Float);

        let local = scope.enter_function(&["n".to_string()], &naming);
        assert_eq!(infer(&n_plus_one, &local), NumKind::Float);
    }
}
