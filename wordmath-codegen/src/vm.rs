//! Reference interpreter for a [`Unit`], following the semantics of the emitted program.

use crate::value::Value;
use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};
use tracing::trace;
use wordmath_target::unit::{Callee, Expr, MathFn, RuntimeHelper, Stmt, Ty, Unit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    RuntimeError { message: String },
}

/// Where `ReadNumber` gets its lines from.
pub trait InputSource {
    /// Returns the next line without its terminator, or `None` at the end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Input from a fixed list of lines.
#[derive(Debug, Clone, Default)]
pub struct LinesInput {
    lines: VecDeque<String>,
}

impl LinesInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for LinesInput {
    fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Input from the process' standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()),
        }
    }
}

type Locals<'u> = HashMap<&'u str, Value>;

pub struct Vm<'u, 'io> {
    unit: &'u Unit,
    /// Fields initialized so far.
    fields: HashMap<&'u str, Value>,
    output: &'io mut dyn Write,
    input: &'io mut dyn InputSource,
}

impl<'u, 'io> Vm<'u, 'io> {
    pub fn new(
        unit: &'u Unit,
        output: &'io mut dyn Write,
        input: &'io mut dyn InputSource,
    ) -> Self {
        Self {
            unit,
            fields: HashMap::new(),
            output,
            input,
        }
    }

    /// Runs the static initialization of every field in declaration order, then `Main`.
    pub fn interpret(&mut self) -> InterpretResult {
        match self.run() {
            Ok(()) => InterpretResult::Ok,
            Err(message) => InterpretResult::RuntimeError { message },
        }
    }

    fn run(&mut self) -> Result<(), String> {
        let unit = self.unit;
        for field in &unit.fields {
            let value = self.call(&field.init, Vec::new())?.cast(field.ty);
            trace!("{} = {}", field.name, value);
            self.fields.insert(&field.name, value);
        }
        for stmt in &unit.main {
            self.exec(stmt)?;
        }
        self.output.flush().map_err(|err| err.to_string())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), String> {
        let line = match stmt {
            Stmt::WriteLine(text) => text.clone(),
            Stmt::WriteValue { label, value } => {
                let value = self.eval(value, &Locals::new())?;
                match label {
                    Some(label) => format!("{} = {}", label, value),
                    None => value.to_string(),
                }
            }
        };
        writeln!(self.output, "{}", line).map_err(|err| err.to_string())
    }

    fn eval(&mut self, expr: &Expr, locals: &Locals<'_>) -> Result<Value, String> {
        let value = match expr {
            Expr::Long(val) => Value::Long(*val),
            Expr::Double(val) => Value::Double(*val),
            Expr::Str(text) => return Err(format!("String \"{}\" used as a number.", text)),
            Expr::Var(name) => match locals.get(name.as_str()).or_else(|| self.fields.get(name.as_str())) {
                Some(value) => *value,
                None => return Err(format!("Use of unassigned variable `{}`.", name)),
            },
            Expr::Pi => Value::Double(std::f64::consts::PI),
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.eval(lhs, locals)?;
                let rhs = self.eval(rhs, locals)?;
                lhs.binary(*op, rhs)?
            }
            Expr::Neg(arg) => self.eval(arg, locals)?.neg(),
            Expr::Cast { ty, expr } => self.eval(expr, locals)?.cast(*ty),
            Expr::Call {
                callee: Callee::Runtime(RuntimeHelper::ReadNumber),
                args,
            } => match args.as_slice() {
                [Expr::Str(name)] => Value::Double(self.read_number(name)?),
                _ => return Err("ReadNumber expects a name.".to_string()),
            },
            Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, locals))
                    .collect::<Result<Vec<_>, _>>()?;
                match callee {
                    Callee::Math(function) => Value::Double(math(*function, &args)?),
                    Callee::Runtime(helper) => Value::Double(runtime(*helper, &args)?),
                    Callee::User(name) => self.call(name, args)?,
                }
            }
        };
        Ok(value)
    }

    /// Calls a function of the unit. The result is converted to its return type.
    fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, String> {
        let unit = self.unit;
        let function = match unit.function(name) {
            Some(function) => function,
            None => return Err(format!("Function `{}` is not defined.", name)),
        };
        if function.params.len() != args.len() {
            return Err(format!(
                "Expected {} arguments, received {}.",
                function.params.len(),
                args.len()
            ));
        }
        // parameters are doubles
        let locals = function
            .params
            .iter()
            .map(String::as_str)
            .zip(args.into_iter().map(|arg| arg.cast(Ty::Double)))
            .collect::<Locals<'_>>();
        Ok(self.eval(&function.body, &locals)?.cast(function.ret))
    }

    /// Prompts for `name` until a valid number is entered.
    fn read_number(&mut self, name: &str) -> Result<f64, String> {
        loop {
            write!(self.output, "{} = ", name).map_err(|err| err.to_string())?;
            self.output.flush().map_err(|err| err.to_string())?;
            let line = match self.input.read_line() {
                Some(line) => line,
                None => return Err(format!("No input for {}.", name)),
            };
            match line.trim().replace(',', ".").parse::<f64>() {
                Ok(val) => return Ok(val),
                Err(_) => {
                    writeln!(self.output, "Invalid number, try again.").map_err(|err| err.to_string())?
                }
            }
        }
    }
}

fn arg(args: &[Value], i: usize) -> Result<f64, String> {
    match args.get(i) {
        Some(value) => Ok(value.as_f64()),
        None => Err(format!("Missing argument {}.", i + 1)),
    }
}

fn math(function: MathFn, args: &[Value]) -> Result<f64, String> {
    let x = arg(args, 0)?;
    let val = match function {
        MathFn::Sin => x.sin(),
        MathFn::Cos => x.cos(),
        MathFn::Tan => x.tan(),
        MathFn::Pow => x.powf(arg(args, 1)?),
        MathFn::Sqrt => x.sqrt(),
    };
    Ok(val)
}

fn runtime(helper: RuntimeHelper, args: &[Value]) -> Result<f64, String> {
    let x = arg(args, 0)?;
    let val = match helper {
        RuntimeHelper::NthRoot => x.powf(1.0 / arg(args, 1)?),
        RuntimeHelper::Sec => 1.0 / x.cos(),
        RuntimeHelper::Csc => 1.0 / x.sin(),
        RuntimeHelper::Cot => 1.0 / x.tan(),
        RuntimeHelper::Sech => 1.0 / x.cosh(),
        RuntimeHelper::Csch => 1.0 / x.sinh(),
        RuntimeHelper::Coth => 1.0 / x.tanh(),
        RuntimeHelper::ReadNumber => return Err("ReadNumber expects a name.".to_string()),
    };
    Ok(val)
}

/// Runs `unit` and returns everything it printed.
pub fn interpret(unit: &Unit, input: &mut dyn InputSource) -> (String, InterpretResult) {
    let mut output = Vec::new();
    let result = Vm::new(unit, &mut output, input).interpret();
    (String::from_utf8_lossy(&output).into_owned(), result)
}
