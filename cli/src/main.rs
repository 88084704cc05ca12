use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use hustgen::{check_with, compile_with, schema_to_json, CompileOptions};
use hustgen_compiler::{CompileError, Diagnostic, MAX_SOURCE_BYTES};

#[derive(Parser)]
#[command(name = "hustgen", version)]
#[command(about = "Check IDL files or dump their resolved schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// When to highlight the offending token in diagnostics
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    /// Reject source files of this many bytes or more
    #[arg(long, value_name = "BYTES", default_value_t = MAX_SOURCE_BYTES, global = true)]
    max_size: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile `.idl` files and report every problem found
    Check {
        /// Input `.idl` files, each compiled on its own
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print diagnostics as JSON lines instead of annotated source
        #[arg(long)]
        json: bool,
    },

    /// Compile one `.idl` file and print its schema as JSON
    Dump {
        /// Input `.idl` file
        input: PathBuf,

        /// Output `.json` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => std::io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("HUSTGEN_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let options = CompileOptions { max_source_bytes: cli.max_size };
    let color = cli.color.enabled();

    match &cli.command {
        Commands::Check { files, json } => {
            for file in files {
                let diagnostics: Vec<Diagnostic> = match check_with(file, &options) {
                    Ok(violations) => violations.into_iter().map(|v| v.diagnostic).collect(),
                    Err(err) => vec![err.to_diagnostic()],
                };
                if diagnostics.is_empty() {
                    println!("{}: ok", file.display());
                    continue;
                }
                report(&diagnostics, *json, color);
                eprintln!("compile failed!");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }

        Commands::Dump { input, output } => match dump(input, output.as_ref(), &options) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                report(&[err.to_diagnostic()], false, color);
                eprintln!("compile failed!");
                ExitCode::FAILURE
            }
        },
    }
}

fn dump(input: &Path, output: Option<&PathBuf>, options: &CompileOptions) -> Result<(), CompileError> {
    let schema = compile_with(input, options)?;
    let json = schema_to_json(&schema).map_err(|e| CompileError::Io {
        path:   input.to_path_buf(),
        source: e.into(),
    })?;
    match output {
        Some(out_path) => {
            std::fs::write(out_path, &json).map_err(|source| CompileError::Io {
                path: out_path.clone(),
                source,
            })?;
            tracing::info!(input = %input.display(), output = %out_path.display(), "schema written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn report(diagnostics: &[Diagnostic], json: bool, color: bool) {
    for diag in diagnostics {
        if json {
            match serde_json::to_string(diag) {
                Ok(line) => println!("{}", line),
                Err(_) => eprintln!("{}", diag),
            }
        } else {
            eprint!("{}", diag.render(color));
        }
    }
}
