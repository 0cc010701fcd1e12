//! Module for the `symbols` subcommand, which renames annotated declarations.
//!
//! Declarations in a header that end with `// obfuscate` are collected, each gets a random
//! alias, and a macro header performing the rename is written beside the output source.
//! The output source includes that header ahead of everything else.

use clap::Args;
use kmodcloak_core::SymbolConfig;
use kmodcloak_transform::obfuscator::obfuscate_symbols;
use kmodcloak_utils::errors::ObfuscateError;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `symbols` subcommand.
#[derive(Debug, Args)]
pub struct SymbolsArgs {
    /// Header with the annotated declarations.
    pub declarations: PathBuf,
    /// C source to rewrite (left untouched).
    pub source: PathBuf,
    /// Path of the rewritten source.
    pub output: PathBuf,
    /// Extra header to include right after the macro header (e.g. randomized metadata).
    pub custom_header: Option<String>,
    /// File name of the generated macro header, written next to the output.
    #[arg(long, default_value = "func_obf_macros.h")]
    macro_header: String,
    /// Fixed prefix of every alias.
    #[arg(long, default_value = "f_")]
    prefix: String,
    /// Number of random characters after the prefix.
    #[arg(long, default_value_t = 8)]
    length: usize,
    /// Trailing comment tag marking declarations for renaming.
    #[arg(long, default_value = "obfuscate")]
    marker: String,
    /// Seed for reproducible aliases (default: fresh aliases every run).
    #[arg(long)]
    seed: Option<u64>,
    /// Path to emit the symbol map as JSON (optional).
    #[arg(long)]
    emit: Option<String>,
}

impl SymbolsArgs {
    fn config(&self) -> SymbolConfig {
        SymbolConfig {
            marker: self.marker.clone(),
            alias_prefix: self.prefix.clone(),
            alias_len: self.length,
            macro_header: self.macro_header.clone(),
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Executes the `symbols` subcommand.
impl super::Command for SymbolsArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        println!(
            "Symbol obfuscation: {} + {} -> {}",
            self.declarations.display(),
            self.source.display(),
            self.output.display()
        );

        let config = self.config();
        let report = match obfuscate_symbols(
            &self.declarations,
            &self.source,
            &self.output,
            self.custom_header.as_deref(),
            &config,
        ) {
            Ok(report) => report,
            Err(ObfuscateError::NoSymbols) => {
                println!(
                    "Add '// {}' after function prototypes and variable declarations in {}.",
                    config.marker,
                    self.declarations.display()
                );
                return Err(ObfuscateError::NoSymbols.into());
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(path) = &self.emit {
            super::emit_report(path, &report)?;
        }

        println!(
            "Generated {} with {} symbol renames",
            report.macro_header.display(),
            report.name_map.len()
        );
        println!("Created obfuscated source {}", report.output.display());
        Ok(())
    }
}
