//! A single class of an imperative, statically typed target language.
//! Nodes are owned by the [`Unit`]; nothing is shared with the AST it was lowered from.

/// Numeric types of the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    /// 64 bit signed integer.
    Long,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

/// Functions of the target's native math library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Pow,
    Sqrt,
}

impl MathFn {
    pub fn name(self) -> &'static str {
        match self {
            MathFn::Sin => "Sin",
            MathFn::Cos => "Cos",
            MathFn::Tan => "Tan",
            MathFn::Pow => "Pow",
            MathFn::Sqrt => "Sqrt",
        }
    }
}

/// Helpers emitted into every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeHelper {
    /// `NthRoot(x, n) = Pow(x, 1.0 / n)`
    NthRoot,
    /// Prompts for a named value until the user types a valid number.
    ReadNumber,
    Sec,
    Csc,
    Cot,
    Sech,
    Csch,
    Coth,
}

impl RuntimeHelper {
    pub const ALL: [RuntimeHelper; 8] = [
        RuntimeHelper::NthRoot,
        RuntimeHelper::ReadNumber,
        RuntimeHelper::Sec,
        RuntimeHelper::Csc,
        RuntimeHelper::Cot,
        RuntimeHelper::Sech,
        RuntimeHelper::Csch,
        RuntimeHelper::Coth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuntimeHelper::NthRoot => "NthRoot",
            RuntimeHelper::ReadNumber => "ReadNumber",
            RuntimeHelper::Sec => "Sec",
            RuntimeHelper::Csc => "Csc",
            RuntimeHelper::Cot => "Cot",
            RuntimeHelper::Sech => "Sech",
            RuntimeHelper::Csch => "Csch",
            RuntimeHelper::Coth => "Coth",
        }
    }

    /// The native function a reciprocal helper inverts: `Sec(x) = 1.0 / Cos(x)`, `Coth(x) = 1.0 / Tanh(x)`.
    pub fn reciprocal_of(self) -> Option<&'static str> {
        match self {
            RuntimeHelper::Sec => Some("Cos"),
            RuntimeHelper::Csc => Some("Sin"),
            RuntimeHelper::Cot => Some("Tan"),
            RuntimeHelper::Sech => Some("Cosh"),
            RuntimeHelper::Csch => Some("Sinh"),
            RuntimeHelper::Coth => Some("Tanh"),
            RuntimeHelper::NthRoot | RuntimeHelper::ReadNumber => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Math(MathFn),
    Runtime(RuntimeHelper),
    /// A generated function of the unit.
    User(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Long(i64),
    Double(f64),
    Str(String),
    /// A field or parameter.
    Var(String),
    /// The native floating point π constant.
    Pi,
    Binary {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
    },
    Neg(Box<Expr>),
    Cast {
        ty: Ty,
        expr: Box<Expr>,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn binary(lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
        Expr::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn cast(ty: Ty, expr: Expr) -> Expr {
        Expr::Cast {
            ty,
            expr: Box::new(expr),
        }
    }

    pub fn call(callee: Callee, args: Vec<Expr>) -> Expr {
        Expr::Call { callee, args }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Prints a line of literal text.
    WriteLine(String),
    /// Prints `value`, prefixed by `label = ` if there is a label.
    WriteValue { label: Option<String>, value: Expr },
}

/// A `static readonly` field computed once by its init function.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    /// Name of the parameterless function computing the value.
    pub init: String,
}

/// A static function whose body is a single returned expression.
/// Parameters are always [`Ty::Double`].
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub ret: Ty,
    pub body: Expr,
}

/// Namespace and class wrapping the generated members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHeader {
    pub namespace: String,
    pub class_name: String,
}

impl Default for UnitHeader {
    fn default() -> Self {
        Self {
            namespace: "TranspiledMML".to_string(),
            class_name: "Program".to_string(),
        }
    }
}

/// A complete program: one class holding fields, functions, runtime helpers and the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub header: UnitHeader,
    /// Fields in initialization order.
    pub fields: Vec<Field>,
    /// Init functions and user functions in declaration order.
    pub functions: Vec<Function>,
    pub runtime: Vec<RuntimeHelper>,
    /// Body of the entry point.
    pub main: Vec<Stmt>,
}

impl Unit {
    /// Create an empty unit carrying every runtime helper.
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            fields: Vec::new(),
            functions: Vec::new(),
            runtime: RuntimeHelper::ALL.to_vec(),
            main: Vec::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}
