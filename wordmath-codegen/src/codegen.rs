//! Lowers the AST into a [`Unit`].

use tracing::debug;
use wordmath_parser::ast::{BinaryOp, Node, Number, Program, Statement, UnaryOp};
use wordmath_passes::infer::{infer, NumKind};
use wordmath_passes::naming::Naming;
use wordmath_passes::resolve::{FunctionRef, SymbolTable, ValueRef};
use wordmath_source::Error;
use wordmath_target::unit::{
    BinOp, Callee, Expr, Field, Function, MathFn, RuntimeHelper, Stmt, Ty, Unit, UnitHeader,
};

/// Maps a builtin function name to its target callee.
fn builtin_callee(ident: &str) -> Option<Callee> {
    let callee = match ident {
        "sin" => Callee::Math(MathFn::Sin),
        "cos" => Callee::Math(MathFn::Cos),
        "tan" => Callee::Math(MathFn::Tan),
        "pow" => Callee::Math(MathFn::Pow),
        "sqrt" => Callee::Math(MathFn::Sqrt),
        "sec" => Callee::Runtime(RuntimeHelper::Sec),
        "csc" => Callee::Runtime(RuntimeHelper::Csc),
        "cot" => Callee::Runtime(RuntimeHelper::Cot),
        "sech" => Callee::Runtime(RuntimeHelper::Sech),
        "csch" => Callee::Runtime(RuntimeHelper::Csch),
        "coth" => Callee::Runtime(RuntimeHelper::Coth),
        "root" => Callee::Runtime(RuntimeHelper::NthRoot),
        _ => return None,
    };
    Some(callee)
}

fn ty_of(kind: NumKind) -> Ty {
    match kind {
        NumKind::Integer => Ty::Long,
        NumKind::Float => Ty::Double,
    }
}

/// Generate a [`Unit`] from an abstract syntax tree.
pub struct Codegen {
    unit: Unit,
    naming: Naming,
    /// Top-level bindings declared so far.
    globals: SymbolTable,
}

impl Codegen {
    pub fn new(header: UnitHeader) -> Self {
        Self::with_naming(header, Naming::default())
    }

    pub fn with_naming(header: UnitHeader, naming: Naming) -> Self {
        Self {
            unit: Unit::new(header),
            naming,
            globals: SymbolTable::new(),
        }
    }

    /// Consumes `self` and returns the generated [`Unit`].
    #[must_use]
    pub fn into_inner_unit(self) -> Unit {
        self.unit
    }

    pub fn globals(&self) -> &SymbolTable {
        &self.globals
    }

    /// Lowers every statement of `program` in document order.
    /// There is no tolerant mode: the first error aborts lowering.
    pub fn codegen_program(&mut self, program: &Program) -> Result<(), Error> {
        for stmt in &program.statements {
            self.codegen_statement(stmt)?;
        }
        Ok(())
    }

    /// Lowers a top-level statement: its declarations plus a trace line and a result line in `Main`.
    pub fn codegen_statement(&mut self, stmt: &Statement) -> Result<(), Error> {
        let line = stmt.line;
        let text = stmt.to_string();

        let result = match &stmt.body {
            Node::Assignment { ident, expr } => {
                // lowered before declaring: `x = x + 1` reads the previous binding
                let body = self.lower_expr(expr, &self.globals, line)?;
                let kind = infer(expr, &self.globals);
                let ty = ty_of(kind);
                let field = self.globals.declare_variable(ident, kind, &self.naming);
                let init = self.naming.init(&field);
                self.unit.fields.push(Field {
                    name: field.clone(),
                    ty,
                    init: init.clone(),
                });
                self.unit.functions.push(Function {
                    name: init,
                    params: Vec::new(),
                    ret: ty,
                    body,
                });
                Stmt::WriteValue {
                    label: Some(ident.clone()),
                    value: Expr::Var(field),
                }
            }
            Node::FnDeclaration {
                ident,
                params,
                body,
            } => {
                let local = self.globals.enter_function(params, &self.naming);
                let body = self.lower_expr(body, &local, line)?;
                // declared after the body: no recursion
                let name = self
                    .globals
                    .declare_function(ident, params.len(), &self.naming);
                let locals = params
                    .iter()
                    .map(|param| self.naming.parameter(param))
                    .collect();
                self.unit.functions.push(Function {
                    name,
                    params: locals,
                    ret: Ty::Double,
                    body,
                });
                Stmt::WriteLine(format!("{}({}) declared", ident, params.join(", ")))
            }
            body => Stmt::WriteValue {
                label: None,
                value: self.lower_expr(body, &self.globals, line)?,
            },
        };

        debug!(?line, "lowered `{}`", text);
        self.unit.main.push(Stmt::WriteLine(text));
        self.unit.main.push(result);
        Ok(())
    }

    /// Lowers an expression in `scope`.
    fn lower_expr(&self, node: &Node, scope: &SymbolTable, line: Option<usize>) -> Result<Expr, Error> {
        let expr = match node {
            Node::Number(Number::Integer(val)) => Expr::Long(*val),
            Node::Number(Number::Float(val)) => Expr::Double(*val),
            Node::Identifier(ident) => match scope.lookup_value(ident, line)? {
                ValueRef::Pi => Expr::Pi,
                ValueRef::Bound(name) => Expr::Var(name.to_string()),
                ValueRef::Free => Expr::call(
                    Callee::Runtime(RuntimeHelper::ReadNumber),
                    vec![Expr::Str(ident.clone())],
                ),
            },
            Node::Binary { lhs, op, rhs } => {
                let lhs = self.lower_expr(lhs, scope, line)?;
                let rhs = self.lower_expr(rhs, scope, line)?;
                match op {
                    BinaryOp::Add => Expr::binary(lhs, BinOp::Add, rhs),
                    BinaryOp::Sub => Expr::binary(lhs, BinOp::Sub, rhs),
                    BinaryOp::Mul => Expr::binary(lhs, BinOp::Mul, rhs),
                    // never integer division
                    BinaryOp::Div => Expr::binary(Expr::cast(Ty::Double, lhs), BinOp::Div, rhs),
                }
            }
            Node::Unary {
                op: UnaryOp::Plus,
                arg,
            } => self.lower_expr(arg, scope, line)?,
            Node::Unary {
                op: UnaryOp::Minus,
                arg,
            } => Expr::Neg(Box::new(self.lower_expr(arg, scope, line)?)),
            Node::Invocation { ident, args } => {
                let callee = match scope.lookup_function(ident, args.len(), line)? {
                    FunctionRef::Builtin => builtin_callee(ident).ok_or_else(|| {
                        Error::Internal(format!("builtin `{}` has no target function", ident))
                    })?,
                    FunctionRef::User(name) => Callee::User(name.to_string()),
                };
                let args = args
                    .iter()
                    .map(|arg| self.lower_expr(arg, scope, line))
                    .collect::<Result<Vec<_>, _>>()?;
                Expr::call(callee, args)
            }
            Node::Assignment { .. } | Node::FnDeclaration { .. } => {
                return Err(Error::not_implemented(
                    "declaration in expression position",
                    line,
                ))
            }
            Node::Empty => {
                return Err(Error::not_implemented("empty expression", line));
            }
        };
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordmath_parser::parser::Parser;
    use wordmath_passes::resolve::Symbol;
    use wordmath_source::Source;

    fn codegen(markup: &str) -> Result<Codegen, Error> {
        let source = Source::new(markup);
        let program = Parser::new(&source).parse_program()?;
        let mut codegen = Codegen::new(UnitHeader::default());
        codegen.codegen_program(&program)?;
        Ok(codegen)
    }

    fn lower(markup: &str) -> Unit {
        codegen(markup).unwrap().into_inner_unit()
    }

    fn long(val: i64) -> Expr {
        Expr::Long(val)
    }

    #[test]
    fn test_assignment() {
        let unit = lower(
            "<math><mi>x</mi><mo>=</mo><mn>2</mn><mo>+</mo><mn>3</mn><mo>*</mo><mn>4</mn></math>",
        );
        assert_eq!(
            unit.fields,
            vec![Field {
                name: "v_x".to_string(),
                ty: Ty::Long,
                init: "Init_v_x".to_string(),
            }]
        );
        let init = unit.function("Init_v_x").unwrap();
        assert_eq!(init.ret, Ty::Long);
        assert_eq!(
            init.body,
            Expr::binary(long(2), BinOp::Add, Expr::binary(long(3), BinOp::Mul, long(4)))
        );
        assert_eq!(
            unit.main,
            vec![
                Stmt::WriteLine("x = 2 + 3 * 4".to_string()),
                Stmt::WriteValue {
                    label: Some("x".to_string()),
                    value: Expr::Var("v_x".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_division_casts_lhs() {
        let unit = lower("<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>");
        assert_eq!(
            unit.main[1],
            Stmt::WriteValue {
                label: None,
                value: Expr::binary(Expr::cast(Ty::Double, long(1)), BinOp::Div, long(2)),
            }
        );
    }

    #[test]
    fn test_identifiers() {
        let unit = lower("<math><mi>π</mi><mo>+</mo><mi>y</mi></math>");
        assert_eq!(
            unit.main[1],
            Stmt::WriteValue {
                label: None,
                value: Expr::binary(
                    Expr::Pi,
                    BinOp::Add,
                    Expr::call(
                        Callee::Runtime(RuntimeHelper::ReadNumber),
                        vec![Expr::Str("y".to_string())]
                    )
                ),
            }
        );
    }

    #[test]
    fn test_unary() {
        let unit = lower("<math><mo>+</mo><mn>2</mn><mo>-</mo><mo>-</mo><mn>3</mn></math>");
        assert_eq!(
            unit.main[1],
            Stmt::WriteValue {
                label: None,
                value: Expr::binary(long(2), BinOp::Sub, Expr::Neg(Box::new(long(3)))),
            }
        );
    }

    #[test]
    fn test_builtins() {
        let unit = lower(
            "<math><mi>sec</mi><mo>&#x2061;</mo><mi>x</mi><mo>+</mo><mroot><mn>8</mn><mn>3</mn></mroot></math>",
        );
        let read_x = Expr::call(
            Callee::Runtime(RuntimeHelper::ReadNumber),
            vec![Expr::Str("x".to_string())],
        );
        assert_eq!(
            unit.main[1],
            Stmt::WriteValue {
                label: None,
                value: Expr::binary(
                    Expr::call(Callee::Runtime(RuntimeHelper::Sec), vec![read_x]),
                    BinOp::Add,
                    Expr::call(Callee::Runtime(RuntimeHelper::NthRoot), vec![long(8), long(3)]),
                ),
            }
        );
        for ident in ["sin", "cos", "tan", "pow", "sqrt", "sec", "csc", "cot", "sech", "csch", "coth", "root"] {
            assert!(builtin_callee(ident).is_some(), "{}", ident);
        }
    }

    #[test]
    fn test_function_declarations() {
        let codegen = codegen(
            r#"<doc>
<math><mrow><mi>f</mi><mo>&#x2061;</mo><mrow><mo>(</mo><mi>x</mi><mo>)</mo></mrow></mrow><mo>=</mo><mi>x</mi><mo>*</mo><mi>k</mi></math>
<math><mrow><mi>g</mi><mo>&#x2061;</mo><mrow><mo>(</mo><mi>x</mi><mo>)</mo></mrow></mrow><mo>=</mo><mi>x</mi><mo>+</mo><mn>1</mn></math>
<math><mi>f</mi><mo>&#x2061;</mo><mrow><mo>(</mo><mn>2</mn><mo>)</mo></mrow></math>
</doc>"#,
        )
        .unwrap();

        // parameters never leak into the global scope
        assert!(!codegen.globals().contains("x"));
        assert_eq!(
            codegen.globals().get("g"),
            Some(&Symbol::Function {
                mangled: "f_g".to_string(),
                arity: 1
            })
        );

        let unit = codegen.into_inner_unit();
        let f = unit.function("f_f").unwrap();
        assert_eq!(f.params, ["v_x"]);
        assert_eq!(f.ret, Ty::Double);
        assert_eq!(
            f.body,
            Expr::binary(
                Expr::Var("v_x".to_string()),
                BinOp::Mul,
                Expr::call(
                    Callee::Runtime(RuntimeHelper::ReadNumber),
                    vec![Expr::Str("k".to_string())]
                )
            )
        );
        assert_eq!(unit.main.len(), 6);
        assert_eq!(unit.main[1], Stmt::WriteLine("f(x) declared".to_string()));
        assert_eq!(
            unit.main[5],
            Stmt::WriteValue {
                label: None,
                value: Expr::call(Callee::User("f_f".to_string()), vec![long(2)]),
            }
        );
    }

    #[test]
    fn test_rebinding() {
        let unit = lower(
            r#"<doc>
<math><mi>x</mi><mo>=</mo><mn>1</mn></math>
<math><mi>x</mi><mo>=</mo><mi>x</mi><mo>/</mo><mn>2</mn></math>
</doc>"#,
        );
        assert_eq!(unit.fields.len(), 2);
        assert_eq!(unit.fields[1].name, "v_x_2");
        assert_eq!(unit.fields[1].ty, Ty::Double);
        assert_eq!(
            unit.function("Init_v_x_2").unwrap().body,
            Expr::binary(
                Expr::cast(Ty::Double, Expr::Var("v_x".to_string())),
                BinOp::Div,
                long(2)
            )
        );
    }

    #[test]
    fn test_errors() {
        let err = codegen("<math><mi>h</mi><mo>&#x2061;</mo><mi>x</mi></math>").err();
        assert_eq!(
            err,
            Some(Error::UnknownFunction {
                name: "h".to_string(),
                line: Some(1)
            })
        );

        let mut codegen = Codegen::new(UnitHeader::default());
        let stmt = Statement {
            body: Node::Empty,
            line: Some(4),
        };
        assert_eq!(
            codegen.codegen_statement(&stmt),
            Err(Error::not_implemented("empty expression", Some(4)))
        );
        assert!(codegen.into_inner_unit().main.is_empty());
    }
}
