use clap::Args;
use kmodcloak_core::MetadataConfig;
use kmodcloak_transform::obfuscator::randomize_metadata;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct MetadataArgs {
    /// Header defining MODULE_NAME, MODULE_AUTHOR_NAME, and MODULE_DESC.
    pub input: PathBuf,
    /// Path of the rewritten header (may equal the input).
    pub output: PathBuf,
    /// Seed for reproducible values (default: fresh values every run).
    #[arg(long)]
    seed: Option<u64>,
    /// Path to emit the chosen values as JSON (optional).
    #[arg(long)]
    emit: Option<String>,
}

impl super::Command for MetadataArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        let config = MetadataConfig { seed: self.seed };
        let report = randomize_metadata(&self.input, &self.output, &config)?;

        if let Some(path) = &self.emit {
            super::emit_report(path, &report)?;
        }

        println!("Randomized metadata:");
        println!("  Name: {}", report.metadata.name);
        println!("  Author: {}", report.metadata.author);
        println!("  Description: {}", report.metadata.description);
        if !report.rewritten {
            println!("No metadata macros found in {}", self.input.display());
        }
        println!("Updated {} with randomized metadata", report.output.display());
        Ok(())
    }
}
