/// Name of the reserved π constant.
pub const PI: &str = "π";

/// Builtin functions and their arity.
pub const BUILTIN_FUNCTIONS: [(&str, usize); 12] = [
    ("sin", 1),
    ("cos", 1),
    ("tan", 1),
    ("sec", 1),
    ("csc", 1),
    ("cot", 1),
    ("sech", 1),
    ("csch", 1),
    ("coth", 1),
    ("pow", 2),
    ("sqrt", 1),
    ("root", 2),
];

/// Returns the arity of a builtin function or `None` if `ident` is not builtin.
pub fn builtin_arity(ident: &str) -> Option<usize> {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|(name, _)| *name == ident)
        .map(|(_, arity)| *arity)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Parses a numeric literal.
    /// Integers are tried first so they never lose precision. Floats accept both `.` and `,` as decimal separator.
    ///
    /// # Example
    /// ```
    /// use wordmath_parser::ast::Number;
    /// assert_eq!(Number::parse("42"), Some(Number::Integer(42)));
    /// assert_eq!(Number::parse("3,14"), Some(Number::Float(3.14)));
    /// assert_eq!(Number::parse("x"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if let Ok(val) = text.parse::<i64>() {
            return Some(Number::Integer(val));
        }
        match text.replace(',', ".").parse::<f64>() {
            Ok(val) if val.is_finite() => Some(Number::Float(val)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(Number),
    /// A variable or parameter reference (e.g. `x`). `π` is a constant, not a lookup.
    Identifier(String),
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Node>,
        op: BinaryOp,
        rhs: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Node>,
    },
    /// A builtin or user-defined function call (e.g. `sin(x)`).
    Invocation {
        ident: String,
        args: Vec<Node>,
    },
    /// `ident = expr`
    Assignment {
        ident: String,
        expr: Box<Node>,
    },
    /// `ident(params) = body`
    FnDeclaration {
        ident: String,
        params: Vec<String>,
        body: Box<Node>,
    },
    /// No node. Produced by empty groups and dropped when building multiplication trees.
    Empty,
}

impl Node {
    pub fn binary(lhs: Node, op: BinaryOp, rhs: Node) -> Node {
        Node::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, arg: Node) -> Node {
        Node::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn invocation(ident: &str, args: Vec<Node>) -> Node {
        Node::Invocation {
            ident: ident.to_string(),
            args,
        }
    }

    pub fn identifier(ident: &str) -> Node {
        Node::Identifier(ident.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Returns `true` if the node is floating point by structure alone.
    /// Any `/`, float literal or `π` in the subtree makes it floating point. Calls always return floating
    /// point values. Other identifiers count as integers here; name resolution refines them.
    pub fn is_float(&self) -> bool {
        match self {
            Node::Number(Number::Integer(_)) => false,
            Node::Number(Number::Float(_)) => true,
            Node::Identifier(ident) => ident == PI,
            Node::Binary { lhs, op, rhs } => {
                *op == BinaryOp::Div || lhs.is_float() || rhs.is_float()
            }
            Node::Unary { arg, .. } => arg.is_float(),
            Node::Invocation { .. } => true,
            Node::Assignment { expr, .. } => expr.is_float(),
            Node::FnDeclaration { .. } => true,
            Node::Empty => false,
        }
    }
}

/// Folds juxtaposed factors into a left-deep multiplication tree: `[x, y, z]` becomes `(x * y) * z`.
/// [`Node::Empty`] placeholders are dropped without reordering the other factors.
/// Returns [`Node::Empty`] if no factor is left.
pub fn build_multiplication_tree(factors: Vec<Node>) -> Node {
    factors
        .into_iter()
        .filter(|node| !node.is_empty())
        .reduce(|lhs, rhs| Node::binary(lhs, BinaryOp::Mul, rhs))
        .unwrap_or(Node::Empty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `x = ...`
    Declaration,
    /// `f(x) = ...`
    FnDeclaration,
    /// A bare expression. Its value is only printed.
    Expression,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub body: Node,
    /// 1-based line of the statement container.
    pub line: Option<usize>,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self.body {
            Node::Assignment { .. } => StatementKind::Declaration,
            Node::FnDeclaration { .. } => StatementKind::FnDeclaration,
            _ => StatementKind::Expression,
        }
    }
}

/// Top-level statements in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(val: i64) -> Node {
        Node::Number(Number::Integer(val))
    }

    #[test]
    fn test_number_parse() {
        assert_eq!(Number::parse("42"), Some(Number::Integer(42)));
        assert_eq!(Number::parse(" 7 "), Some(Number::Integer(7)));
        assert_eq!(Number::parse("3.14"), Some(Number::Float(3.14)));
        assert_eq!(Number::parse("3,14"), Some(Number::Float(3.14)));
        assert_eq!(
            Number::parse("9007199254740993"),
            Some(Number::Integer(9_007_199_254_740_993))
        );
        assert_eq!(Number::parse("1.2.3"), None);
        assert_eq!(Number::parse("inf"), None);
        assert_eq!(Number::parse(""), None);
    }

    #[test]
    fn test_is_float() {
        assert!(!int(1).is_float());
        assert!(Node::Number(Number::Float(0.5)).is_float());
        assert!(!Node::identifier("x").is_float());
        assert!(Node::identifier(PI).is_float());

        let sum = Node::binary(int(1), BinaryOp::Add, int(2));
        assert!(!sum.is_float());
        let nested = Node::binary(
            Node::unary(UnaryOp::Minus, sum.clone()),
            BinaryOp::Mul,
            Node::binary(int(3), BinaryOp::Sub, Node::binary(int(1), BinaryOp::Div, int(2))),
        );
        assert!(nested.is_float());
        let deep_float = Node::binary(
            sum,
            BinaryOp::Mul,
            Node::binary(int(3), BinaryOp::Add, Node::Number(Number::Float(1.5))),
        );
        assert!(deep_float.is_float());
        assert!(Node::invocation("sin", vec![int(0)]).is_float());
    }

    #[test]
    fn test_multiplication_tree() {
        let x = Node::identifier("x");
        let y = Node::identifier("y");
        let z = Node::identifier("z");
        let expected = Node::binary(
            Node::binary(x.clone(), BinaryOp::Mul, y.clone()),
            BinaryOp::Mul,
            z.clone(),
        );
        assert_eq!(
            build_multiplication_tree(vec![x.clone(), y.clone(), z.clone()]),
            expected
        );
        assert_eq!(
            build_multiplication_tree(vec![
                Node::Empty,
                x,
                Node::Empty,
                Node::Empty,
                y,
                z,
                Node::Empty
            ]),
            expected
        );
        assert_eq!(build_multiplication_tree(vec![int(2)]), int(2));
        assert_eq!(build_multiplication_tree(vec![Node::Empty]), Node::Empty);
        assert_eq!(build_multiplication_tree(Vec::new()), Node::Empty);
    }

    #[test]
    fn test_builtins() {
        assert_eq!(builtin_arity("sin"), Some(1));
        assert_eq!(builtin_arity("root"), Some(2));
        assert_eq!(builtin_arity("f"), None);
    }

    #[test]
    fn test_statement_kind() {
        let decl = Statement {
            body: Node::Assignment {
                ident: "x".to_string(),
                expr: Box::new(int(1)),
            },
            line: None,
        };
        assert_eq!(decl.kind(), StatementKind::Declaration);
        let expr = Statement {
            body: int(1),
            line: Some(1),
        };
        assert_eq!(expr.kind(), StatementKind::Expression);
    }
}
