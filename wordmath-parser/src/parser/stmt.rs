use super::*;
use crate::ast::{builtin_arity, Statement, PI};

impl<'a> Parser<'a> {
    /// Parses a `<math>` statement container.
    pub fn parse_statement(&self, container: &Element) -> Result<Statement, Error> {
        if container.name != "math" {
            return Err(Error::syntax(
                format!("Expected <math> but found <{}>", container.name),
                Some(container.line),
            ));
        }

        let mut cursor = Cursor::new(container);
        // a statement wrapped in a single row is unwrapped
        while cursor.element_count() == 1 && cursor.current().map(|info| info.name) == Some("mrow") {
            cursor = cursor.child_cursor()?;
        }

        let body = match cursor.peek() {
            Some(next) if next.operator() == Some(Operator::Equals) => {
                self.parse_declaration(&mut cursor)?
            }
            _ => self.parse_expr(&mut cursor)?,
        };
        self.expect_end(&cursor)?;

        Ok(Statement {
            body,
            line: Some(container.line),
        })
    }

    /// Parses `ident = expr` or `ident(params) = expr`.
    fn parse_declaration(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let info = match cursor.current() {
            Some(info) => info,
            None => return Err(Error::Internal("declaration without target".to_string())),
        };
        match info.name {
            "mi" | "mtext" => {
                let ident = self.parse_identifier(cursor)?;
                if ident == PI {
                    return Err(Error::syntax(
                        format!("Can't assign to the constant {}", PI),
                        Some(info.line),
                    ));
                }
                cursor.expect("mo")?; // '='
                let expr = self.parse_expr(cursor)?;
                Ok(Node::Assignment {
                    ident,
                    expr: Box::new(expr),
                })
            }
            "mrow" => self.parse_fn_declaration(cursor),
            tag => Err(Error::syntax(
                format!("Can't assign to <{}>", tag),
                Some(info.line),
            )),
        }
    }

    /// Parses `ident ⁡ params = body` where the head is a single `<mrow>`.
    fn parse_fn_declaration(&self, cursor: &mut Cursor<'_>) -> Result<Node, Error> {
        let mut head = cursor.child_cursor()?;
        let line = cursor.line();
        cursor.expect("mrow")?;

        let ident = self.parse_identifier(&mut head)?;
        if builtin_arity(&ident).is_some() || ident == PI {
            return Err(Error::syntax(
                format!("Can't redeclare builtin function `{}`", ident),
                line,
            ));
        }
        match head.operator() {
            Some(Operator::FunctionApplication) => {
                head.expect("mo")?;
            }
            _ => {
                return Err(Error::syntax(
                    format!("Expected a parameter list after `{}`", ident),
                    head.line(),
                ))
            }
        }

        let params = if head.remaining() == 1 {
            let group = self.unnest(head.take_window()?)?;
            self.parse_group_list(group, |cursor| self.parse_identifier(cursor))?
        } else {
            self.parse_list(&mut head, |cursor| self.parse_identifier(cursor))?
        };
        for (i, param) in params.iter().enumerate() {
            if param == PI {
                return Err(Error::syntax(
                    format!("Can't use the constant {} as a parameter", PI),
                    line,
                ));
            }
            if params[..i].contains(param) {
                return Err(Error::syntax(
                    format!("Duplicate parameter `{}` in `{}`", param, ident),
                    line,
                ));
            }
        }

        cursor.expect("mo")?; // '='
        let body = self.parse_expr(cursor)?;
        Ok(Node::FnDeclaration {
            ident,
            params,
            body: Box::new(body),
        })
    }
}
