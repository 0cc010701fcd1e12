use clap::Subcommand;
use serde::Serialize;
use std::error::Error;
use std::fs;

pub mod metadata;
pub mod strings;
pub mod symbols;

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Rename annotated functions and variables through a generated macro header
    Symbols(symbols::SymbolsArgs),

    /// Replace wrapped string literals with XOR-encoded byte arrays
    Strings(strings::StringsArgs),

    /// Randomize the module name, author, and description macros of a header
    Metadata(metadata::MetadataArgs),
}

pub trait Command {
    fn execute(self) -> Result<(), Box<dyn Error>>;
}

impl Command for Cmd {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Self::Symbols(args) => args.execute(),
            Self::Strings(args) => args.execute(),
            Self::Metadata(args) => args.execute(),
        }
    }
}

/// Writes a run report as pretty-printed JSON.
pub(crate) fn emit_report<T: Serialize>(path: &str, report: &T) -> Result<(), Box<dyn Error>> {
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    println!("Wrote report to {path}");
    Ok(())
}
