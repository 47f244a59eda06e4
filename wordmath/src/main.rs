use clap::{Arg, ArgAction, ArgMatches, Command};
use console::style;
use std::fs;
use std::io;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;
use wordmath::{compile, emit, Config, Error};
use wordmath_codegen::vm::{InterpretResult, StdinInput, Vm};
use wordmath_target::Language;

/// Read from the working directory when `--config` is not given.
const DEFAULT_CONFIG: &str = "appsettings.json";

fn command() -> Command {
    Command::new("wordmath")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transpiles MathML formulas into C# or Visual Basic programs")
        .arg(
            Arg::new("input")
                .help("MathML document whose root holds one <math> element per statement")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to the JSON configuration (default: ./appsettings.json if present)"),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .short('l')
                .help("Target language, overrides the configuration")
                .value_parser(["csharp", "vb"]),
        )
        .arg(
            Arg::new("ignore-errors")
                .long("ignore-errors")
                .help("Skip statements that fail to parse")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .help("Run the program in the reference VM instead of printing its source")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the generated source to this file instead of stdout"),
        )
}

fn load_config(matches: &ArgMatches) -> Result<Config, Error> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(DEFAULT_CONFIG)?,
        None => Config::default(),
    };
    match matches.get_one::<String>("language").map(String::as_str) {
        Some("csharp") => config.language = Language::CSharp,
        Some("vb") => config.language = Language::VisualBasic,
        _ => {}
    }
    if matches.get_flag("ignore-errors") {
        config.ignore_errors = true;
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<bool, Error> {
    let config = load_config(matches)?;
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or_default();
    let markup = fs::read_to_string(input)?;

    let compilation = compile(&markup, &config)?;
    for err in &compilation.skipped {
        eprintln!("{} {}", style("skipped:").yellow().bold(), err);
    }

    if matches.get_flag("run") {
        let mut stdout = io::stdout();
        let mut stdin = StdinInput;
        return match Vm::new(&compilation.unit, &mut stdout, &mut stdin).interpret() {
            InterpretResult::Ok => Ok(true),
            InterpretResult::RuntimeError { message } => {
                eprintln!("{} {}", style("runtime error:").red().bold(), message);
                Ok(false)
            }
        };
    }

    let source = emit(&compilation.unit, &config);
    match matches.get_one::<String>("output") {
        Some(path) => fs::write(path, source)?,
        None => print!("{}", source),
    }
    Ok(true)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let matches = command().get_matches();
    match run(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            process::exit(1);
        }
    }
}
