use super::{binary, double_literal, escape_format, parenthesize, Emitter, Language, Writer};
use crate::unit::{Callee, Expr, Field, Function, RuntimeHelper, Stmt, Ty, Unit};

/// Emits Visual Basic .NET source.
///
/// Identifiers are case insensitive in Visual Basic: `x` and `X` name the same field.
/// `Long` arithmetic is checked, so an overflow the reference VM wraps throws
/// `OverflowException` here.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualBasicEmitter;

fn ty(ty: Ty) -> &'static str {
    match ty {
        Ty::Long => "Long",
        Ty::Double => "Double",
    }
}

fn string_literal(text: &str) -> String {
    let mut parts = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            parts.push("vbLf".to_string());
        }
        parts.push(format!("\"{}\"", line.replace('"', "\"\"")));
    }
    parts.join(" & ")
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
        Expr::Cast { ty: Ty::Double, expr: arg } => format!("CDbl({})", self::expr(arg)),
        Expr::Cast { ty: Ty::Long, expr: arg } => format!("CLng({})", self::expr(arg)),
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
            writer.line(&format!("Console.WriteLine({})", string_literal(text)));
        }
        Stmt::WriteValue { label, value } => {
            let format = match label {
                Some(label) => format!("{} = {{0}}", escape_format(label)),
                None => "{0}".to_string(),
            };
            writer.line(&format!(
                "Console.WriteLine(String.Format(CultureInfo.InvariantCulture, {}, {}))",
                string_literal(&format),
                expr(value)
            ));
        }
    }
}

fn field(writer: &mut Writer, field: &Field) {
    writer.line(&format!(
        "Private Shared ReadOnly {} As {}",
        field.name,
        ty(field.ty)
    ));
}

/// Initializes the fields in order before `Main` runs.
fn shared_constructor(writer: &mut Writer, unit: &Unit) {
    writer.line("Shared Sub New()");
    writer.indent();
    for f in &unit.fields {
        writer.line(&format!("{} = {}()", f.name, f.init));
    }
    writer.dedent();
    writer.line("End Sub");
}

fn function(writer: &mut Writer, function: &Function) {
    let params = function
        .params
        .iter()
        .map(|param| format!("ByVal {} As Double", param))
        .collect::<Vec<_>>()
        .join(", ");
    writer.line(&format!(
        "Private Shared Function {}({}) As {}",
        function.name,
        params,
        ty(function.ret)
    ));
    writer.indent();
    writer.line(&format!("Return {}", expr(&function.body)));
    writer.dedent();
    writer.line("End Function");
}

fn runtime_helper(writer: &mut Writer, helper: RuntimeHelper) {
    match helper {
        RuntimeHelper::NthRoot => {
            writer.line("Private Shared Function NthRoot(ByVal x As Double, ByVal n As Double) As Double");
            writer.indent();
            writer.line("Return Math.Pow(x, 1.0 / n)");
            writer.dedent();
            writer.line("End Function");
        }
        RuntimeHelper::ReadNumber => {
            writer.line("Private Shared Function ReadNumber(ByVal name As String) As Double");
            writer.indent();
            writer.line("Do");
            writer.indent();
            writer.line("Console.Write(name & \" = \")");
            writer.line("Dim line As String = Console.ReadLine()");
            writer.line("If line Is Nothing Then");
            writer.indent();
            writer.line("Throw New InvalidOperationException(\"No input for \" & name)");
            writer.dedent();
            writer.line("End If");
            writer.line("Dim value As Double");
            writer.line(
                "If Double.TryParse(line.Trim().Replace(\",\"c, \".\"c), NumberStyles.Float, CultureInfo.InvariantCulture, value) Then",
            );
            writer.indent();
            writer.line("Return value");
            writer.dedent();
            writer.line("End If");
            writer.line("Console.WriteLine(\"Invalid number, try again.\")");
            writer.dedent();
            writer.line("Loop");
            writer.dedent();
            writer.line("End Function");
        }
        helper => {
            let native = match helper.reciprocal_of() {
                Some(native) => native,
                None => return,
            };
            writer.line(&format!(
                "Private Shared Function {}(ByVal x As Double) As Double",
                helper.name()
            ));
            writer.indent();
            writer.line(&format!("Return 1.0 / Math.{}(x)", native));
            writer.dedent();
            writer.line("End Function");
        }
    }
}

impl Emitter for VisualBasicEmitter {
    fn language(&self) -> Language {
        Language::VisualBasic
    }

    fn emit_source(&self, unit: &Unit) -> String {
        let mut writer = Writer::new();
        writer.line("Imports System");
        writer.line("Imports System.Globalization");
        writer.blank();
        writer.line(&format!("Namespace {}", unit.header.namespace));
        writer.indent();
        writer.line(&format!("Public Class {}", unit.header.class_name));
        writer.indent();

        for f in &unit.fields {
            field(&mut writer, f);
        }
        if !unit.fields.is_empty() {
            writer.blank();
            shared_constructor(&mut writer, unit);
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

        writer.line("Public Shared Sub Main()");
        writer.indent();
        for s in &unit.main {
            stmt(&mut writer, s);
        }
        writer.dedent();
        writer.line("End Sub");

        writer.dedent();
        writer.line("End Class");
        writer.dedent();
        writer.line("End Namespace");
        writer.finish()
    }
}
