use super::*;
use crate::ast::{build_multiplication_tree, builtin_arity, BinaryOp, Number, UnaryOp};
use std::mem;

/// Tags that are valid MathML but have no meaning in a formula yet.
const UNSUPPORTED_TAGS: [&str; 7] = [
    "mtable",
    "msub",
    "msubsup",
    "munder",
    "mover",
    "munderover",
    "mmultiscripts",
];

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses `term ((+|-) term)*`.
    pub fn parse_expr(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let mut lhs = self.parse_term(cursor)?;

        loop {
            let op = match cursor.operator() {
                Some(Operator::Plus) => BinaryOp::Add,
                Some(Operator::Minus) => BinaryOp::Sub,
                _ => break, // not an additive operator, stop parsing
            };
            cursor.expect("mo")?;

            let rhs = self.parse_term(cursor)?;
            lhs = Node::binary(lhs, op, rhs);
        }

        Ok(lhs)
    }

    /// Parses a whole window as one expression.
    pub fn parse_window_expr(&self, window: &mut Cursor<'_>) -> Result<Node, Error> {
        let expr = self.parse_expr(window)?;
        self.expect_end(window)?;
        Ok(expr)
    }

    /// Parses `factor ((*|/) factor | factor)*`.
    /// Juxtaposed factors are collected in a run and folded into a multiplication tree.
    pub fn parse_term(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let mut run = vec![self.parse_factor(cursor)?];

        while let Some(info) = cursor.current() {
            match info.operator() {
                Some(op) if op.ends_term() => break,
                Some(op @ Operator::Times) | Some(op @ Operator::Divide) => {
                    cursor.expect("mo")?;
                    let lhs = build_multiplication_tree(mem::take(&mut run));
                    let rhs = self.parse_factor(cursor)?;
                    let op = if op == Operator::Times {
                        BinaryOp::Mul
                    } else {
                        BinaryOp::Div
                    };
                    run.push(Node::binary(lhs, op, rhs));
                }
                // brackets and any non-operator element multiply implicitly
                _ => run.push(self.parse_factor(cursor)?),
            }
        }

        Ok(build_multiplication_tree(run))
    }

    /// Parses a single factor.
    pub fn parse_factor(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let info = match cursor.current() {
            Some(info) => info,
            None => {
                return Err(Error::syntax(
                    "Expected a value but reached the end of the group",
                    cursor.line(),
                ))
            }
        };
        let line = Some(info.line);

        match info.name {
            "mn" => self.parse_number(cursor),
            "mi" | "mtext" => {
                let ident = self.parse_identifier(cursor)?;
                // `f ⁡ args` binds tighter than any operator around it
                if cursor.operator() == Some(Operator::FunctionApplication) {
                    cursor.expect("mo")?;
                    let args = self.parse_arguments(cursor)?;
                    return self.invocation(ident, args, line);
                }
                Ok(Node::Identifier(ident))
            }
            "mrow" | "mfenced" => self.parse_group(cursor),
            "mo" => match info.operator() {
                Some(Operator::Plus) | Some(Operator::Minus) => {
                    cursor.expect("mo")?;
                    let op = if info.operator() == Some(Operator::Plus) {
                        UnaryOp::Plus
                    } else {
                        UnaryOp::Minus
                    };
                    Ok(Node::unary(op, self.parse_factor(cursor)?))
                }
                Some(Operator::Open(open)) => self.parse_bracketed_expr(cursor, open),
                Some(Operator::FunctionApplication) => Err(Error::syntax(
                    "Function application must follow a function name",
                    line,
                )),
                Some(_) => Err(Error::syntax(
                    format!("Can't factor operator `{}`", info.value),
                    line,
                )),
                None => Err(Error::syntax(
                    format!("Unsupported operator `{}`", info.value),
                    line,
                )),
            },
            "mfrac" => {
                let (lhs, rhs) = self.parse_pair(cursor, "mfrac")?;
                Ok(Node::binary(lhs, BinaryOp::Div, rhs))
            }
            "msup" => {
                let (base, exponent) = self.parse_pair(cursor, "msup")?;
                Ok(Node::invocation("pow", vec![base, exponent]))
            }
            "mroot" => {
                let (radicand, index) = self.parse_pair(cursor, "mroot")?;
                Ok(Node::invocation("root", vec![radicand, index]))
            }
            "msqrt" => {
                let mut inner = cursor.child_cursor()?;
                cursor.expect("msqrt")?;
                if inner.element_count() == 0 {
                    return Err(Error::Arity {
                        construct: "<msqrt>".to_string(),
                        expected: 1,
                        found: 0,
                        line,
                    });
                }
                let radicand = self.parse_window_expr(&mut inner)?;
                Ok(Node::invocation("sqrt", vec![radicand]))
            }
            tag if UNSUPPORTED_TAGS.contains(&tag) => {
                Err(Error::not_implemented(format!("<{}>", tag), line))
            }
            tag => Err(Error::syntax(format!("Unsupported tag <{}>", tag), line)),
        }
    }

    /* Expressions.Literals */
    /// Parses an `<mn>` element. Integers are preferred over floats.
    pub fn parse_number(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let info = cursor.expect("mn")?;
        if info.value.is_empty() {
            return Err(Error::syntax(
                "Found empty number tag <mn>",
                Some(info.line),
            ));
        }
        match Number::parse(info.value) {
            Some(num) => Ok(Node::Number(num)),
            None => Err(Error::syntax(
                format!("Failed to parse number tag <mn>{}</mn>", info.value),
                Some(info.line),
            )),
        }
    }

    /* Expressions.Identifier */
    /// Parses an `<mi>` or `<mtext>` element and returns its name.
    pub fn parse_identifier(&self, cursor: &mut Cursor<'_>) -> Result<String, Error> {
        let info = match cursor.current() {
            Some(info) if info.name == "mi" || info.name == "mtext" => info,
            Some(info) => {
                return Err(Error::syntax(
                    format!("Expected an identifier but found <{}>", info.name),
                    Some(info.line),
                ))
            }
            None => {
                return Err(Error::syntax(
                    "Expected an identifier but reached the end of the group",
                    cursor.line(),
                ))
            }
        };
        cursor.expect(info.name)?;
        if info.value.is_empty() {
            return Err(Error::syntax(
                format!("Found empty identifier tag <{}>", info.name),
                Some(info.line),
            ));
        }
        Ok(info.value.to_string())
    }

    /* Expressions.Groups */
    /// Parses an `<mrow>` or `<mfenced>` group. An empty group is [`Node::Empty`].
    fn parse_group(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let mut inner = cursor.child_cursor()?;
        let tag = cursor.current().map_or("mrow", |info| info.name);
        cursor.expect(tag)?;
        if inner.is_exhausted() {
            return Ok(Node::Empty);
        }
        self.parse_window_expr(&mut inner)
    }

    /// Parses `( expr )` with brackets as sibling `<mo>` elements.
    fn parse_bracketed_expr(&self, cursor: &mut Cursor<'_>, open: Bracket) -> Result<Node, Error> {
        cursor.expect("mo")?;
        let expr = self.parse_expr(cursor)?;
        match cursor.operator() {
            Some(Operator::Close(close)) if close == open => {
                cursor.expect("mo")?;
                Ok(expr)
            }
            _ if cursor.is_exhausted() => {
                Err(Error::syntax("Missing closing bracket", cursor.line()))
            }
            _ => Err(self.expected_close(cursor, open)),
        }
    }

    /// Parses the two operands of a fraction, power or root.
    fn parse_pair(&self, cursor: &mut Cursor<'_>, tag: &str) -> Result<(Node, Node), Error> {
        let line = cursor.line();
        let construct = format!("<{}>", tag);
        let mut inner = cursor.child_cursor()?;
        cursor.expect(tag)?;
        if inner.element_count() != 2 {
            return Err(Error::Arity {
                construct: construct.to_string(),
                expected: 2,
                found: inner.element_count(),
                line,
            });
        }
        let first = self.parse_operand(&mut inner, &construct)?;
        let second = self.parse_operand(&mut inner, &construct)?;
        Ok((first, second))
    }

    /// Parses one child of a special form as a complete expression.
    fn parse_operand(&self, cursor: &mut Cursor<'_>, construct: &str) -> Result<Node, Error> {
        let line = cursor.line();
        let mut window = cursor.take_window()?;
        match self.parse_window_expr(&mut window)? {
            Node::Empty => Err(Error::syntax(format!("Empty operand in {}", construct), line)),
            node => Ok(node),
        }
    }

    /* Expressions.Invocation */
    /// Parses the arguments following a function application operator.
    fn parse_arguments(&self, cursor: &mut Cursor<'_>) -> Result<Vec<Node>, Error> {
        if let Some(Operator::Open(open)) = cursor.operator() {
            // flat form: `f ⁡ ( a , b )` in the same row
            return self.parse_bracketed(cursor, open, |cursor| self.parse_expr(cursor));
        }
        let group = self.unnest(cursor.take_window()?)?;
        self.parse_group_list(group, |cursor| self.parse_expr(cursor))
    }

    /// Builds an invocation, validating the arity of builtin functions.
    fn invocation(&self, ident: String, args: Vec<Node>, line: Option<usize>) -> Result<Node, Error> {
        if let Some(expected) = builtin_arity(&ident) {
            if args.len() != expected {
                return Err(Error::Arity {
                    construct: ident,
                    expected,
                    found: args.len(),
                    line,
                });
            }
        }
        Ok(Node::Invocation { ident, args })
    }
}
