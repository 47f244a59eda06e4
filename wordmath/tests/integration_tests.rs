use wordmath::{compile, interpret, transpile, Config, Error};
use wordmath_codegen::vm::{InterpretResult, LinesInput};
use wordmath_source::Error as SourceError;
use wordmath_target::Language;

const APPLY: &str = "<mo>&#x2061;</mo>";

/// Wraps each statement in `<math>` inside a document root, one statement per line.
fn doc(statements: &[&str]) -> String {
    let body = statements
        .iter()
        .map(|stmt| format!("<math>{}</math>", stmt))
        .collect::<Vec<_>>()
        .join("\n");
    format!("<document>\n{}\n</document>", body)
}

fn paren(inner: &str) -> String {
    format!("<mrow><mo>(</mo>{}<mo>)</mo></mrow>", inner)
}

fn call(ident: &str, args: &str) -> String {
    format!("<mi>{}</mi>{}{}", ident, APPLY, paren(args))
}

fn run_with(markup: &str, config: &Config, input: &[&str]) -> String {
    let mut input = LinesInput::new(input.iter().copied());
    let (output, result) = interpret(markup, config, &mut input).unwrap();
    assert_eq!(result, InterpretResult::Ok, "output so far: {:?}", output);
    output
}

fn run(markup: &str, input: &[&str]) -> String {
    run_with(markup, &Config::default(), input)
}

#[test]
fn precedence() {
    let markup = doc(&["<mi>x</mi><mo>=</mo><mn>2</mn><mo>+</mo><mn>3</mn><mo>*</mo><mn>4</mn>"]);
    assert_eq!(run(&markup, &[]), "x = 2 + 3 * 4\nx = 14\n");
}

#[test]
fn fraction_is_never_integer_division() {
    let markup = doc(&[
        "<mfrac><mn>1</mn><mn>2</mn></mfrac>",
        "<mn>7</mn><mo>/</mo><mn>2</mn>",
    ]);
    assert_eq!(run(&markup, &[]), "1 / 2\n0.5\n7 / 2\n3.5\n");
}

#[test]
fn pi_is_a_constant() {
    let markup = doc(&["<mi>π</mi>", "<mn>2</mn><mi>π</mi>"]);
    assert_eq!(
        run(&markup, &[]),
        "π\n3.141592653589793\n2 * π\n6.283185307179586\n"
    );
}

#[test]
fn special_forms() {
    let markup = doc(&[
        "<msup><mn>2</mn><mn>10</mn></msup>",
        "<msqrt><mn>16</mn></msqrt>",
        "<mroot><mn>9</mn><mn>2</mn></mroot>",
        &call("cos", "<mn>0</mn>"),
    ]);
    assert_eq!(
        run(&markup, &[]),
        "2^10\n1024\nsqrt(16)\n4\nroot(9, 2)\n3\ncos(0)\n1\n"
    );
}

#[test]
fn calls_after_operators_and_signs() {
    let markup = doc(&[
        &format!("<mn>2</mn><mo>*</mo><mi>sin</mi>{}<mn>0</mn>", APPLY),
        &format!("<mo>-</mo><mi>cos</mi>{}<mn>0</mn>", APPLY),
        &format!(
            "<mi>y</mi><mo>=</mo><mn>1</mn><mo>/</mo><mi>cos</mi>{}<mn>0</mn>",
            APPLY
        ),
    ]);
    assert_eq!(
        run(&markup, &[]),
        "2 * sin(0)\n0\n-cos(0)\n-1\ny = 1 / cos(0)\ny = 1\n"
    );
}

#[test]
fn free_variables_are_prompted() {
    let markup = doc(&[
        "<mi>a</mi><mo>=</mo><mi>x</mi><mo>*</mo><mn>2</mn>",
        "<mi>y</mi><mo>+</mo><mn>1</mn>",
    ]);
    // fields are initialized before the first statement runs
    assert_eq!(
        run(&markup, &["three", "3", "4,5"]),
        "x = Invalid number, try again.\nx = a = x * 2\na = 6\ny + 1\ny = 5.5\n"
    );

    let compilation = compile(&markup, &Config::default()).unwrap();
    assert_eq!(compilation.free_variables, ["x", "y"]);

    let (output, result) =
        interpret(&markup, &Config::default(), &mut LinesInput::default()).unwrap();
    assert_eq!(output, "x = ");
    assert!(matches!(result, InterpretResult::RuntimeError { .. }));
}

#[test]
fn rebinding() {
    let markup = doc(&[
        "<mi>x</mi><mo>=</mo><mn>1</mn>",
        "<mi>x</mi><mo>=</mo><mi>x</mi><mo>+</mo><mn>1</mn>",
        "<mi>x</mi>",
    ]);
    assert_eq!(
        run(&markup, &[]),
        "x = 1\nx = 1\nx = x + 1\nx = 2\nx\n2\n"
    );
}

#[test]
fn function_scopes() {
    let inner = format!("<mi>f</mi>{}{}", APPLY, paren("<mn>3</mn>"));
    let markup = doc(&[
        &format!(
            "<mrow><mi>f</mi>{}{}</mrow><mo>=</mo><mi>x</mi><mo>*</mo><mn>2</mn>",
            APPLY,
            paren("<mi>x</mi>")
        ),
        &format!(
            "<mrow><mi>g</mi>{}{}</mrow><mo>=</mo><mi>x</mi><mo>+</mo><mn>1</mn>",
            APPLY,
            paren("<mi>x</mi>")
        ),
        &call("g", &inner),
        // the parameter does not leak: a top-level `x` is free
        "<mi>x</mi>",
    ]);
    assert_eq!(
        run(&markup, &["10"]),
        "f(x) = x * 2\nf(x) declared\ng(x) = x + 1\ng(x) declared\ng(f(3))\n7\nx\nx = 10\n"
    );
}

#[test]
fn two_parameter_function() {
    let markup = doc(&[
        &format!(
            "<mrow><mi>avg</mi>{}{}</mrow><mo>=</mo><mfrac><mrow><mi>a</mi><mo>+</mo><mi>b</mi></mrow><mn>2</mn></mfrac>",
            APPLY,
            paren("<mi>a</mi><mo>,</mo><mi>b</mi>")
        ),
        &call("avg", "<mn>3</mn><mo>,</mo><mn>4</mn>"),
    ]);
    assert_eq!(
        run(&markup, &[]),
        "avg(a, b) = (a + b) / 2\navg(a, b) declared\navg(3, 4)\n3.5\n"
    );
}

#[test]
fn one_trace_and_one_result_line_per_statement() {
    let statements = [
        "<mn>1</mn>",
        "<mn>2</mn><mo>-</mo><mn>5</mn>",
        "<mi>k</mi><mo>=</mo><mn>2.5</mn>",
        "<mi>k</mi><mo>*</mo><mi>k</mi>",
        "<mo>-</mo><mi>k</mi>",
    ];
    let markup = doc(&statements);
    let compilation = compile(&markup, &Config::default()).unwrap();
    assert_eq!(compilation.unit.main.len(), 2 * statements.len());

    let output = run(&markup, &[]);
    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        ["1", "1", "2 - 5", "-3", "k = 2.5", "k = 2.5", "k * k", "6.25", "-k", "-2.5"]
    );
}

#[test]
fn tolerant_mode() {
    let markup = doc(&[
        "<mn>1</mn>",
        "<mfrac><mn>1</mn></mfrac>",
        "<mn>2</mn>",
    ]);

    let err = compile(&markup, &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Transpile(SourceError::Arity {
            line: Some(3),
            ..
        })
    ));

    let config = Config {
        ignore_errors: true,
        ..Config::default()
    };
    let compilation = compile(&markup, &config).unwrap();
    assert_eq!(compilation.skipped.len(), 1);
    assert_eq!(run_with(&markup, &config, &[]), "1\n1\n2\n2\n");
}

#[test]
fn lowering_errors_abort() {
    let markup = doc(&["<mn>1</mn>", &call("h", "<mn>1</mn>")]);
    let err = compile(&markup, &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Transpile(SourceError::UnknownFunction { ref name, line: Some(3) }) if name == "h"
    ));

    let markup = doc(&[&call("sin", "<mn>1</mn><mo>,</mo><mn>2</mn>")]);
    assert!(matches!(
        compile(&markup, &Config::default()),
        Err(Error::Transpile(SourceError::Arity {
            expected: 1,
            found: 2,
            ..
        }))
    ));
}

#[test]
fn transpile_csharp() {
    let markup = doc(&[
        "<mi>x</mi><mo>=</mo><mfrac><mn>1</mn><mi>y</mi></mfrac>",
        &call("sec", "<mi>x</mi>"),
    ]);
    let source = transpile(&markup, &Config::default()).unwrap();
    assert!(source.contains("namespace TranspiledMML"));
    assert!(source.contains("static readonly double v_x;"));
    assert!(source.contains("static Program()\n        {\n            v_x = Init_v_x();\n        }"));
    assert!(source.contains("return (double)1L / ReadNumber(\"y\");"));
    assert!(source.contains("Console.WriteLine(\"x = 1 / y\");"));
    assert!(source.contains(
        "Console.WriteLine(string.Format(CultureInfo.InvariantCulture, \"{0}\", Sec(v_x)));"
    ));
    assert!(source.contains("static double NthRoot(double x, double n)"));
    assert!(source.contains("static double ReadNumber(string name)"));
}

#[test]
fn transpile_visual_basic() {
    let config = Config {
        language: Language::VisualBasic,
        namespace: "Physics".to_string(),
        ..Config::default()
    };
    let markup = doc(&["<mi>v</mi><mo>=</mo><mn>3</mn><mo>*</mo><mn>4</mn>"]);
    let source = transpile(&markup, &config).unwrap();
    assert!(source.contains("Namespace Physics"));
    assert!(source.contains("Public Class Program"));
    assert!(source.contains("Private Shared ReadOnly v_v As Long\n"));
    assert!(source.contains("Shared Sub New()\n            v_v = Init_v_v()\n        End Sub"));
    assert!(source.contains("Return 3L * 4L"));
    assert!(source.contains(
        "Console.WriteLine(String.Format(CultureInfo.InvariantCulture, \"v = {0}\", v_v))"
    ));
    assert!(source.trim_end().ends_with("End Namespace"));
}
