use std::path::PathBuf;
use thiserror::Error;

/// Error type for building an annotation scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The annotation marker is empty or only whitespace.
    #[error("annotation marker must not be empty")]
    EmptyMarker,
    /// A declaration pattern failed to compile.
    #[error("invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Error type for alias generation.
#[derive(Debug, Error)]
pub enum NameError {
    /// The alias prefix cannot start a C identifier.
    #[error("alias prefix '{0}' is not a valid C identifier prefix")]
    InvalidPrefix(String),
    /// The random part of the alias must be at least one character long.
    #[error("alias length must be greater than zero")]
    ZeroLength,
    /// No unused alias could be drawn within the retry budget.
    #[error("no unused alias for '{symbol}' after {attempts} attempts")]
    Exhausted { symbol: String, attempts: usize },
}

/// Error type for source transforms.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A rewrite pattern failed to compile.
    #[error("invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// A configured identifier (wrapper, decoder, header name) is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur while running one of the obfuscation pipelines.
#[derive(Debug, Error)]
pub enum ObfuscateError {
    /// An input file could not be read.
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An output file could not be written.
    #[error("could not write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The output path resolves to the input path.
    #[error("refusing to overwrite input '{}' in place", .path.display())]
    SameFile { path: PathBuf },
    /// Two outputs of one run resolve to the same file.
    #[error("two outputs of this run resolve to the same file '{}'", .path.display())]
    OutputClash { path: PathBuf },
    /// The declarations file has no annotated symbols.
    #[error("no symbols found marked for obfuscation")]
    NoSymbols,
    /// Scanner construction failed.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    /// Alias generation failed.
    #[error("name error: {0}")]
    Name(#[from] NameError),
    /// A transform pass failed.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
