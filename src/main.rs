use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use cheflang::{error::write_diag, Interpreter, LineIndex};

/// Compile and run a Chef recipe
#[derive(Debug, Parser)]
#[command(name = "chef", version)]
struct Cli {
    /// Treat all warnings as errors
    #[arg(long)]
    strict: bool,

    /// Enable a debug logging channel (e.g. "parser" or "interpreter")
    #[arg(long, value_name = "CATEGORY")]
    debug_only: Option<String>,

    /// Fixed seed for the 'Mix' shuffle, for reproducible runs
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Chef source file
    file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug_only.as_deref());
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug_only: Option<&str>) {
    let filter = match debug_only {
        Some(category) => {
            tracing_subscriber::EnvFilter::new(format!("cheflang::{category}=trace"))
        }
        None => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("cannot read '{}'", cli.file.display()))?;
    let file_name = cli.file.display().to_string();

    let mut result = cheflang::parse(&source);
    if cli.strict {
        result.report_mut().promote_warnings();
    }
    result
        .report()
        .eprint(&file_name, &source)
        .context("cannot write diagnostics")?;
    if !result.is_valid() {
        return Ok(ExitCode::FAILURE);
    }
    let program = result.unwrap_output();

    let mut interpreter = Interpreter::new(&program, io::stdin().lock(), io::stdout().lock());
    if let Some(seed) = cli.seed {
        interpreter = interpreter.seed(seed);
    }
    match interpreter.run() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            let lidx = LineIndex::new(&source);
            write_diag(io::stderr().lock(), &err.into_diag(), &lidx, &file_name)
                .context("cannot write diagnostics")?;
            Ok(ExitCode::FAILURE)
        }
    }
}
