//! Line-oriented recognition of declarations annotated for renaming.
//!
//! Each physical line is matched on its own against a fixed set of
//! declaration shapes ending in `; // <marker>`. There is no C grammar behind
//! this: a prototype or initializer split across several lines is never
//! recognized, and anything that does not fit one of the shapes is skipped
//! without a diagnostic.

use crate::is_c_identifier;
use crate::symbol::{SymbolKind, SymbolSet};
use kmodcloak_utils::errors::ScanError;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

/// Placeholder substituted with the escaped marker when patterns are compiled.
const MARKER: &str = "@MARKER@";

/// Function prototypes: plain, pointer-returning, and `static inline`.
const FUNCTION_FORMS: [&str; 3] = [
    r"^\s*[\w\s]+\s+(\w+)\s*\([^)]*\)\s*;\s*//\s*@MARKER@\b",
    r"^\s*[\w\s]+\s*\*\s*(\w+)\s*\([^)]*\)\s*;\s*//\s*@MARKER@\b",
    r"^\s*static\s+inline\s+[\w\s]+\s+(\w+)\s*\([^)]*\)\s*;\s*//\s*@MARKER@\b",
];

/// Initialized variables: plain, pointer, `static`, and `static` pointer.
const VARIABLE_FORMS: [&str; 4] = [
    r"^\s*[\w\s]+\s+(\w+)\s*=\s*[^;]*;\s*//\s*@MARKER@\b",
    r"^\s*[\w\s]+\s*\*\s*(\w+)\s*=\s*[^;]*;\s*//\s*@MARKER@\b",
    r"^\s*static\s+[\w\s]+\s+(\w+)\s*=\s*[^;]*;\s*//\s*@MARKER@\b",
    r"^\s*static\s+[\w\s]+\s*\*\s*(\w+)\s*=\s*[^;]*;\s*//\s*@MARKER@\b",
];

/// Names this short are ignored; they are almost always keywords or noise.
const MIN_NAME_LEN: usize = 3;

/// Scanner for one annotation marker.
#[derive(Debug, Clone)]
pub struct AnnotationScanner {
    functions: Vec<Regex>,
    variables: Vec<Regex>,
}

impl AnnotationScanner {
    /// Compiles the declaration patterns for `marker` (e.g. `obfuscate`).
    pub fn new(marker: &str) -> Result<Self, ScanError> {
        let marker = marker.trim();
        if marker.is_empty() {
            return Err(ScanError::EmptyMarker);
        }
        let escaped = regex::escape(marker);
        let compile = |forms: &[&str]| -> Result<Vec<Regex>, ScanError> {
            forms
                .iter()
                .map(|form| {
                    Regex::new(&format!("(?i){}", form.replace(MARKER, &escaped)))
                        .map_err(ScanError::from)
                })
                .collect()
        };
        Ok(Self {
            functions: compile(&FUNCTION_FORMS)?,
            variables: compile(&VARIABLE_FORMS)?,
        })
    }

    /// Collects every annotated symbol declared in `text`.
    pub fn scan_str(&self, text: &str) -> SymbolSet {
        let mut symbols = SymbolSet::new();

        for (kind, patterns) in [
            (SymbolKind::Function, &self.functions),
            (SymbolKind::Variable, &self.variables),
        ] {
            for (lineno, line) in text.lines().enumerate() {
                for pattern in patterns {
                    let Some(name) = pattern.captures(line).and_then(|c| c.get(1)) else {
                        continue;
                    };
                    let name = name.as_str();
                    if name.chars().count() < MIN_NAME_LEN {
                        debug!("line {}: skipping short name '{}'", lineno + 1, name);
                        continue;
                    }
                    if !is_c_identifier(name) {
                        debug!("line {}: skipping non-identifier '{}'", lineno + 1, name);
                        continue;
                    }
                    if symbols.insert(name, kind) {
                        debug!("line {}: {} '{}'", lineno + 1, kind, name);
                    }
                }
            }
        }

        info!(
            "Found {} functions marked for obfuscation: {:?}",
            symbols.names_of(SymbolKind::Function).len(),
            symbols.names_of(SymbolKind::Function)
        );
        info!(
            "Found {} variables marked for obfuscation: {:?}",
            symbols.names_of(SymbolKind::Variable).len(),
            symbols.names_of(SymbolKind::Variable)
        );
        symbols
    }

    /// Reads and scans a declarations file.
    ///
    /// An unreadable file is reported and yields an empty set; callers treat
    /// empty as "nothing to do".
    pub fn scan_file(&self, path: impl AsRef<Path>) -> SymbolSet {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => self.scan_str(&text),
            Err(e) => {
                error!("could not read header file {}: {}", path.display(), e);
                SymbolSet::new()
            }
        }
    }
}

impl Default for AnnotationScanner {
    fn default() -> Self {
        Self::new("obfuscate").expect("default marker patterns compile")
    }
}
