//! mccomp - command-line driver for the Mini-C front end.
//!
//! Drives the pipeline stages directly (`mcc_par::Parser` wraps
//! `mcc_lex::Lexer` internally, then `mcc_sem::analyze_and_emit` walks
//! the AST once, type-checking and lowering to IR in the same visit) and
//! writes the resulting module to disk.

mod config;
mod error;

use std::path::PathBuf;

use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use error::{DriverError, Result};
use mcc_par::Parser as MccParser;
use mcc_util::{Handler, SourceMap};

/// Compiles a single Mini-C source file to textual LLVM-compatible IR.
#[derive(ClapParser, Debug)]
#[command(name = "mccomp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles a Mini-C source file to textual LLVM IR", long_about = None)]
struct Cli {
    /// Mini-C source file to compile
    source: PathBuf,

    /// Path to write the emitted IR (default: from config, else output.ll)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to an mccomp.toml configuration file
    #[arg(short, long, env = "MCCOMP_CONFIG")]
    config: Option<PathBuf>,

    /// Disable colored diagnostics
    #[arg(long, env = "MCCOMP_NO_COLOR")]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        // Syntax/Sema errors are rendered with their caret-line and hint
        // from inside `run`, where the handler and source map are still in
        // scope; everything else (I/O, config, internal) falls back to the
        // plain message here.
        if !matches!(err, DriverError::Syntax(_) | DriverError::Sema(_)) {
            eprintln!("error: {}", err);
        }
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config, cli.no_color)?;

    let source_name = cli.source.to_string_lossy().into_owned();
    tracing::info!(file = %source_name, "reading source");
    let source = std::fs::read_to_string(&cli.source)?;

    let handler = Handler::new();
    let mut source_map = SourceMap::new();
    let file_id = source_map.add_file(source_name.clone(), source.clone());

    tracing::debug!("parsing");
    let mut parser = MccParser::new(&source, file_id, &handler);
    let mut program = match parser.parse_program() {
        Ok(program) => program,
        Err(err) => {
            let err = DriverError::from(err);
            report_error(&handler, &source_map, &err);
            return Err(err);
        }
    };

    tracing::debug!("type-checking and emitting IR");
    let module = match run_sema(&mut program, &source_name, &handler) {
        Ok(module) => module,
        Err(err) => {
            report_error(&handler, &source_map, &err);
            return Err(err);
        }
    };

    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output_path));
    tracing::info!(path = %output_path.display(), "writing IR");
    module.write_to_file(&output_path)?;

    Ok(())
}

/// Prints a diagnostic the way §4.7/§7 call for: the caret-rendered source
/// line and hint when the handler actually collected one (lexical errors
/// from the lexer, scope/type errors from the checker), falling back to the
/// bare `Display` message for errors the handler never sees (a syntax error
/// with no lexical cause, or one raised before any diagnostic was emitted).
fn report_error(handler: &Handler, source_map: &SourceMap, err: &DriverError) {
    match handler.first_error() {
        Some(diagnostic) => eprint!("{}", diagnostic.render(source_map)),
        None => eprintln!("error: {}", err),
    }
}

/// Runs the combined type-checking/emission walker, converting an
/// internal panic (an unterminated block, a widen-value invariant
/// violation) into the driver's own internal-error variant rather than
/// letting it unwind out of `main` — per §6, that's exit code 2, not a
/// process abort.
fn run_sema(
    program: &mut mcc_par::Program,
    source_name: &str,
    handler: &Handler,
) -> Result<mcc_ir::Module> {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        mcc_sem::analyze_and_emit(program, source_name, handler)
    }))
    .map_err(|_| DriverError::Internal("an internal invariant was violated during IR emission".to_string()))?;
    Ok(outcome?)
}

fn init_logging(config: &Config, no_color: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("MCCOMP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));

    let subscriber = fmt::layer()
        .with_ansi(!no_color && config.color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| DriverError::Internal(format!("failed to initialize logging: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_a_bare_source_path() {
        let cli = Cli::parse_from(["mccomp", "main.mc"]);
        assert_eq!(cli.source, PathBuf::from("main.mc"));
        assert!(cli.output.is_none());
    }

    #[test]
    fn cli_parses_an_explicit_output_path() {
        let cli = Cli::parse_from(["mccomp", "main.mc", "--output", "build/main.ll"]);
        assert_eq!(cli.output, Some(PathBuf::from("build/main.ll")));
    }

    #[test]
    fn cli_parses_no_color() {
        let cli = Cli::parse_from(["mccomp", "main.mc", "--no-color"]);
        assert!(cli.no_color);
    }
}
