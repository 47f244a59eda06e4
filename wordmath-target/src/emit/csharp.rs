use super::{binary, double_literal, escape_format, parenthesize, Emitter, Language, Writer};
use crate::unit::{Callee, Expr, Field, Function, RuntimeHelper, Stmt, Ty, Unit};

/// Emits C# source.
///
/// Arithmetic on `long` constants is folded by the C# compiler, so an overflow
/// the reference VM wraps, such as `9223372036854775807L + 1L`, fails to compile.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpEmitter;

fn ty(ty: Ty) -> &'static str {
    match ty {
        Ty::Long => "long",
        Ty::Double => "double",
    }
}

fn string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for c in text.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

fn expr(expr: &Expr) -> String {
    match expr {
        Expr::Long(val) => format!("{}L", val),
        Expr::Double(val) => double_literal(*val),
        Expr::Str(text) => string_literal(text),
        Expr::Var(name) => name.clone(),
        Expr::Pi => "Math.PI".to_string(),
        Expr::Binary { lhs, op, rhs } => binary(lhs, *op, rhs, self::expr),
        Expr::Neg(arg) => format!("-{}", parenthesize(arg, 4, &mut self::expr)),
        Expr::Cast { ty: target, expr: arg } => {
            format!("({}){}", ty(*target), parenthesize(arg, 4, &mut self::expr))
        }
        Expr::Call { callee, args } => {
            let args = args.iter().map(self::expr).collect::<Vec<_>>().join(", ");
            match callee {
                Callee::Math(function) => format!("Math.{}({})", function.name(), args),
                Callee::Runtime(helper) => format!("{}({})", helper.name(), args),
                Callee::User(name) => format!("{}({})", name, args),
            }
        }
    }
}

fn stmt(writer: &mut Writer, stmt: &Stmt) {
    match stmt {
        Stmt::WriteLine(text) => {
            writer.line(&format!("Console.WriteLine({});", string_literal(text)));
        }
        Stmt::WriteValue { label, value } => {
            let format = match label {
                Some(label) => format!("{} = {{0}}", escape_format(label)),
                None => "{0}".to_string(),
            };
            writer.line(&format!(
                "Console.WriteLine(string.Format(CultureInfo.InvariantCulture, {}, {}));",
                string_literal(&format),
                expr(value)
            ));
        }
    }
}

fn field(writer: &mut Writer, field: &Field) {
    writer.line(&format!("static readonly {} {};", ty(field.ty), field.name));
}

/// An explicit static constructor clears `beforefieldinit`, so every field is
/// initialized, in order, before `Main` runs.
fn static_constructor(writer: &mut Writer, unit: &Unit) {
    writer.line(&format!("static {}()", unit.header.class_name));
    writer.line("{");
    writer.indent();
    for f in &unit.fields {
        writer.line(&format!("{} = {}();", f.name, f.init));
    }
    writer.dedent();
    writer.line("}");
}

fn function(writer: &mut Writer, function: &Function) {
    let params = function
        .params
        .iter()
        .map(|param| format!("double {}", param))
        .collect::<Vec<_>>()
        .join(", ");
    writer.line(&format!("static {} {}({})", ty(function.ret), function.name, params));
    writer.line("{");
    writer.indent();
    writer.line(&format!("return {};", expr(&function.body)));
    writer.dedent();
    writer.line("}");
}

fn runtime_helper(writer: &mut Writer, helper: RuntimeHelper) {
    match helper {
        RuntimeHelper::NthRoot => {
            writer.line("static double NthRoot(double x, double n)");
            writer.line("{");
            writer.indent();
            writer.line("return Math.Pow(x, 1.0 / n);");
            writer.dedent();
            writer.line("}");
        }
        RuntimeHelper::ReadNumber => {
            writer.line("static double ReadNumber(string name)");
            writer.line("{");
            writer.indent();
            writer.line("while (true)");
            writer.line("{");
            writer.indent();
            writer.line("Console.Write(name + \" = \");");
            writer.line("string line = Console.ReadLine();");
            writer.line("if (line == null)");
            writer.line("{");
            writer.indent();
            writer.line("throw new InvalidOperationException(\"No input for \" + name);");
            writer.dedent();
            writer.line("}");
            writer.line("double value;");
            writer.line(
                "if (double.TryParse(line.Trim().Replace(',', '.'), NumberStyles.Float, CultureInfo.InvariantCulture, out value))",
            );
            writer.line("{");
            writer.indent();
            writer.line("return value;");
            writer.dedent();
            writer.line("}");
            writer.line("Console.WriteLine(\"Invalid number, try again.\");");
            writer.dedent();
            writer.line("}");
            writer.dedent();
            writer.line("}");
        }
        helper => {
            let native = match helper.reciprocal_of() {
                Some(native) => native,
                None => return,
            };
            writer.line(&format!("static double {}(double x)", helper.name()));
            writer.line("{");
            writer.indent();
            writer.line(&format!("return 1.0 / Math.{}(x);", native));
            writer.dedent();
            writer.line("}");
        }
    }
}

impl Emitter for CSharpEmitter {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn emit_source(&self, unit: &Unit) -> String {
        let mut writer = Writer::new();
        writer.line("using System;");
        writer.line("using System.Globalization;");
        writer.blank();
        writer.line(&format!("namespace {}", unit.header.namespace));
        writer.line("{");
        writer.indent();
        writer.line(&format!("public static class {}", unit.header.class_name));
        writer.line("{");
        writer.indent();

        for f in &unit.fields {
            field(&mut writer, f);
        }
        if !unit.fields.is_empty() {
            writer.blank();
            static_constructor(&mut writer, unit);
            writer.blank();
        }
        for f in &unit.functions {
            function(&mut writer, f);
            writer.blank();
        }
        for helper in &unit.runtime {
            runtime_helper(&mut writer, *helper);
            writer.blank();
        }

        writer.line("static void Main()");
        writer.line("{");
        writer.indent();
        for s in &unit.main {
            stmt(&mut writer, s);
        }
        writer.dedent();
        writer.line("}");

        writer.dedent();
        writer.line("}");
        writer.dedent();
        writer.line("}");
        writer.finish()
    }
}
