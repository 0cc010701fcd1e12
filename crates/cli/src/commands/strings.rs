//! Module for the `strings` subcommand, which hides `O_STRING("...")` literals.

use clap::Args;
use kmodcloak_core::StringConfig;
use kmodcloak_transform::obfuscator::obfuscate_strings;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `strings` subcommand.
#[derive(Debug, Args)]
pub struct StringsArgs {
    /// C source containing wrapped literals (left untouched).
    pub source: PathBuf,
    /// Path of the rewritten source.
    pub output: PathBuf,
    /// Path of the generated byte-array header; included by this name.
    pub header: PathBuf,
    /// Single-byte XOR key: decimal, 0x hex, 0o octal, or 0b binary.
    #[arg(default_value = "0xAA", value_parser = parse_key)]
    pub key: u8,
    /// Call-style wrapper marking literals to hide.
    #[arg(long, default_value = "O_STRING")]
    wrapper: String,
    /// Runtime routine emitted at call sites.
    #[arg(long, default_value = "deobfuscate")]
    decoder: String,
    /// Path to emit the string table as JSON (optional).
    #[arg(long)]
    emit: Option<String>,
}

/// Parses a key the way C integer literals are written.
pub fn parse_key(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    let value = u32::from_str_radix(digits, radix).map_err(|e| format!("invalid key '{s}': {e}"))?;
    u8::try_from(value).map_err(|_| format!("key '{s}' does not fit in one byte"))
}

/// Executes the `strings` subcommand.
impl super::Command for StringsArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        let config = StringConfig {
            key: self.key,
            wrapper: self.wrapper.clone(),
            decoder: self.decoder.clone(),
            ..Default::default()
        };
        let report = obfuscate_strings(&self.source, &self.output, &self.header, &config)?;

        if let Some(path) = &self.emit {
            super::emit_report(path, &report)?;
        }

        println!(
            "Updated {} and generated {} ({} strings, key 0x{:02X})",
            report.output.display(),
            report.header.display(),
            report.strings.len(),
            report.key
        );
        Ok(())
    }
}
