//! Transpiles formulas written in MathML into C# or Visual Basic programs.
//!
//! # Example
//! ```
//! use wordmath::{interpret, Config};
//! use wordmath_codegen::vm::{InterpretResult, LinesInput};
//!
//! let markup = "<math><mi>x</mi><mo>=</mo><mn>2</mn><mo>+</mo><mn>3</mn><mo>*</mo><mn>4</mn></math>";
//! let (output, result) = interpret(markup, &Config::default(), &mut LinesInput::default()).unwrap();
//! assert_eq!(result, InterpretResult::Ok);
//! assert_eq!(output, "x = 2 + 3 * 4\nx = 14\n");
//! ```

pub mod config;

pub use config::Config;

use std::io;
use thiserror::Error;
use tracing::{info, trace};
use wordmath_codegen::vm::{self, InputSource, InterpretResult};
use wordmath_codegen::Codegen;
use wordmath_parser::Parser;
use wordmath_passes::resolve::Resolver;
use wordmath_source::Source;
use wordmath_target::Unit;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Transpile(#[from] wordmath_source::Error),
}

/// A lowered document.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub unit: Unit,
    /// Names read from the user at runtime, in first-use order.
    pub free_variables: Vec<String>,
    /// Statements skipped because `ignoreErrors` is set.
    pub skipped: Vec<wordmath_source::Error>,
}

/// Parses `markup` and lowers it into a [`Unit`].
pub fn compile(markup: &str, config: &Config) -> Result<Compilation, Error> {
    let source = Source::new(markup);

    info!("building AST");
    let program = Parser::with_options(&source, config.parse_options()).parse_program()?;

    let mut resolver = Resolver::with_naming(config.naming());
    resolver.resolve_program(&program)?;
    for ident in resolver.free_variables() {
        info!("`{}` is read from input", ident);
    }

    info!("generating code");
    let mut codegen = Codegen::with_naming(config.header(), config.naming());
    codegen.codegen_program(&program)?;

    Ok(Compilation {
        unit: codegen.into_inner_unit(),
        free_variables: resolver.free_variables().to_vec(),
        skipped: source.errors.errors(),
    })
}

/// Returns the source of `unit` in the configured language.
pub fn emit(unit: &Unit, config: &Config) -> String {
    let source = config.language.emitter().emit_source(unit);
    trace!("{}", source);
    source
}

/// Transpiles `markup` into source code in the configured language.
pub fn transpile(markup: &str, config: &Config) -> Result<String, Error> {
    let compilation = compile(markup, config)?;
    Ok(emit(&compilation.unit, config))
}

/// Runs `markup` in the reference VM and returns what the program printed.
pub fn interpret(
    markup: &str,
    config: &Config,
    input: &mut dyn InputSource,
) -> Result<(String, InterpretResult), Error> {
    let compilation = compile(markup, config)?;
    Ok(vm::interpret(&compilation.unit, input))
}
