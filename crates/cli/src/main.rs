//! Entry point for the kmodcloak CLI, a source-level obfuscator for C kernel modules.
//!
//! This module parses command-line arguments and dispatches to subcommands for renaming
//! annotated symbols, hiding wrapped string literals, or randomizing module metadata. It
//! initializes logging and maps failures to a non-zero exit status.

use clap::Parser;
use kmodcloak_cli::commands::{Cmd, Command};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Command-line interface for kmodcloak.
///
/// kmodcloak rewrites C sources before compilation: annotated declarations are renamed
/// through a generated macro header, `O_STRING("...")` literals are replaced by XOR-encoded
/// byte arrays decoded at runtime, and module metadata macros get plausible random values.
#[derive(Parser)]
#[command(name = "kmodcloak")]
#[command(about = "kmodcloak: C source obfuscator for kernel modules")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the kmodcloak CLI with the provided arguments.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
