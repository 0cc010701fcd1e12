//! End-to-end pipelines: symbol renaming, string hiding, metadata randomization.
//!
//! Each pipeline reads its inputs once, computes everything in memory, then
//! writes its outputs. Nothing is rolled back if a later write fails.

use crate::include::{EnsureInclude, PrependIncludes};
use crate::metadata::{MetadataRewrite, ModuleMetadata};
use crate::registration::RegistrationRewrite;
use crate::string_encrypt::StringEncrypt;
use crate::{pass, SourceUnit, Transform};
use kmodcloak_core::header::{emit_macro_header, emit_string_header};
use kmodcloak_core::{
    run_rng, AnnotationScanner, MetadataConfig, NameGenerator, NameMap, StringConfig, StringEntry,
    StringTable, Symbol, SymbolConfig,
};
use kmodcloak_utils::errors::{ObfuscateError, TransformError};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the symbol renaming pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    /// Symbols discovered in the declarations file
    pub symbols: Vec<Symbol>,
    /// Alias assigned to each symbol
    pub name_map: NameMap,
    /// Where the rename-macro header was written
    pub macro_header: PathBuf,
    /// Where the rewritten source was written
    pub output: PathBuf,
    /// Names of transforms that changed the source
    pub transforms_applied: Vec<String>,
}

/// Result of the string obfuscation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringReport {
    /// One entry per distinct wrapped literal
    pub strings: Vec<StringEntry>,
    pub key: u8,
    pub header: PathBuf,
    pub output: PathBuf,
    pub transforms_applied: Vec<String>,
}

/// Result of the metadata randomizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataReport {
    pub metadata: ModuleMetadata,
    pub output: PathBuf,
    /// Whether any of the three macros was found and rewritten
    pub rewritten: bool,
}

fn read_file(path: &Path) -> Result<String, ObfuscateError> {
    fs::read_to_string(path).map_err(|source| ObfuscateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), ObfuscateError> {
    fs::write(path, contents).map_err(|source| ObfuscateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Rejects an output path that is an existing input file.
fn ensure_not_input(output: &Path, inputs: &[&Path]) -> Result<(), ObfuscateError> {
    let Ok(out) = fs::canonicalize(output) else {
        return Ok(());
    };
    for input in inputs {
        if fs::canonicalize(input).is_ok_and(|i| i == out) {
            return Err(ObfuscateError::SameFile {
                path: output.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Resolves `path` through the filesystem where possible, falling back to
/// its canonical parent directory for files not yet written.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Rejects two outputs of one run that would land on the same file.
fn ensure_distinct_outputs(first: &Path, second: &Path) -> Result<(), ObfuscateError> {
    if resolve(first) == resolve(second) {
        return Err(ObfuscateError::OutputClash {
            path: second.to_path_buf(),
        });
    }
    Ok(())
}

fn run_passes(
    text: &str,
    passes: &[Box<dyn Transform>],
    rng: &mut StdRng,
) -> Result<(String, Vec<String>), TransformError> {
    let mut unit = SourceUnit::new(text);
    let applied = pass::run(&mut unit, passes, rng)?;
    Ok((
        unit.into_text(),
        applied.into_iter().map(str::to_string).collect(),
    ))
}

/// Rewrites a source file for the rename macros in `macro_header`.
///
/// Registration macros are pointed at their aliases first, then the macro
/// header (and the optional custom header after it) is included above every
/// other line. Nothing else in the file changes.
pub fn rewrite_symbol_source(
    source: &str,
    names: &NameMap,
    macro_header: &str,
    custom_header: Option<&str>,
) -> Result<(String, Vec<String>), TransformError> {
    let headers = std::iter::once(macro_header).chain(custom_header);
    let passes: Vec<Box<dyn Transform>> = vec![
        Box::new(RegistrationRewrite::new(names.clone())),
        Box::new(PrependIncludes::new(headers)?),
    ];
    // Neither pass draws randomness.
    run_passes(source, &passes, &mut run_rng(Some(0)))
}

/// Symbol renaming pipeline.
///
/// Scans `declarations` for annotated symbols, writes the rename-macro header
/// next to `output`, and writes the rewritten `source` to `output`.
pub fn obfuscate_symbols(
    declarations: &Path,
    source: &Path,
    output: &Path,
    custom_header: Option<&str>,
    config: &SymbolConfig,
) -> Result<SymbolReport, ObfuscateError> {
    tracing::debug!("Starting symbol pipeline:");
    tracing::debug!("  Declarations: {}", declarations.display());
    tracing::debug!("  Source: {}", source.display());
    tracing::debug!("  Config: {:?}", config);

    let macro_header = output
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(&config.macro_header);
    ensure_not_input(output, &[declarations, source])?;
    ensure_not_input(&macro_header, &[declarations, source])?;
    ensure_distinct_outputs(output, &macro_header)?;

    let scanner = AnnotationScanner::new(&config.marker)?;
    let symbols = scanner.scan_file(declarations);
    if symbols.is_empty() {
        return Err(ObfuscateError::NoSymbols);
    }

    let generator = NameGenerator::new(config.alias_prefix.clone(), config.alias_len)?;
    let mut rng = run_rng(config.seed);
    let names = generator.generate(&symbols, &mut rng)?;

    let text = read_file(source)?;
    let (rewritten, applied) =
        rewrite_symbol_source(&text, &names, &config.macro_header, custom_header)?;

    write_file(&macro_header, &emit_macro_header(&names, &config.header_guard))?;
    tracing::info!(
        "Generated {} with {} symbol renames",
        macro_header.display(),
        names.len()
    );
    write_file(output, &rewritten)?;
    tracing::info!("Created obfuscated source {}", output.display());

    Ok(SymbolReport {
        symbols: symbols.iter().collect(),
        name_map: names,
        macro_header,
        output: output.to_path_buf(),
        transforms_applied: applied,
    })
}

/// Runs the string sub-pipeline in memory.
///
/// Returns the rewritten source, the header text, and the table both were
/// built from.
pub fn obfuscate_string_source(
    source: &str,
    header_name: &str,
    config: &StringConfig,
) -> Result<(String, String, StringTable, Vec<String>), TransformError> {
    let table = StringTable::scan(source, config)?;
    let passes: Vec<Box<dyn Transform>> = vec![
        Box::new(StringEncrypt::new(&table, config)?),
        Box::new(EnsureInclude::new(header_name)?),
    ];
    let (rewritten, applied) = run_passes(source, &passes, &mut run_rng(Some(0)))?;
    let header = emit_string_header(&table, &config.header_guard);
    Ok((rewritten, header, table, applied))
}

/// String obfuscation pipeline: writes the byte-array header to `header` and
/// the rewritten `source` to `output`.
pub fn obfuscate_strings(
    source: &Path,
    output: &Path,
    header: &Path,
    config: &StringConfig,
) -> Result<StringReport, ObfuscateError> {
    tracing::debug!("Starting string pipeline:");
    tracing::debug!("  Source: {}", source.display());
    tracing::debug!("  Key: 0x{:02X}", config.key);

    ensure_not_input(output, &[source])?;
    ensure_not_input(header, &[source])?;
    ensure_distinct_outputs(output, header)?;

    let text = read_file(source)?;
    let header_name = header.to_string_lossy();
    let (rewritten, header_text, table, applied) =
        obfuscate_string_source(&text, &header_name, config)?;

    write_file(header, &header_text)?;
    write_file(output, &rewritten)?;
    tracing::info!(
        "Updated {} and generated {} ({} strings)",
        output.display(),
        header.display(),
        table.len()
    );

    Ok(StringReport {
        strings: table.entries().cloned().collect(),
        key: table.key(),
        header: header.to_path_buf(),
        output: output.to_path_buf(),
        transforms_applied: applied,
    })
}

/// Metadata randomizer: rewrites the three metadata macros of `input` into
/// `output`. Input and output may be the same file.
pub fn randomize_metadata(
    input: &Path,
    output: &Path,
    config: &MetadataConfig,
) -> Result<MetadataReport, ObfuscateError> {
    let text = read_file(input)?;
    let mut rng = run_rng(config.seed);
    let metadata = ModuleMetadata::random(&mut rng);
    let passes: Vec<Box<dyn Transform>> = vec![Box::new(MetadataRewrite::new(metadata.clone())?)];
    let (rewritten, applied) = run_passes(&text, &passes, &mut rng)?;

    write_file(output, &rewritten)?;
    tracing::info!("Randomized metadata:");
    tracing::info!("  Name: {}", metadata.name);
    tracing::info!("  Author: {}", metadata.author);
    tracing::info!("  Description: {}", metadata.description);

    Ok(MetadataReport {
        metadata,
        output: output.to_path_buf(),
        rewritten: !applied.is_empty(),
    })
}
