//! Per-run configuration for the three pipelines.

use serde::{Deserialize, Serialize};

/// Configuration for the symbol renaming pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Trailing comment tag that opts a declaration in (matched case-insensitively)
    pub marker: String,
    /// Fixed prefix of every generated alias
    pub alias_prefix: String,
    /// Number of random characters after the prefix
    pub alias_len: usize,
    /// File name of the generated rename-macro header
    pub macro_header: String,
    /// Include guard of the generated header
    pub header_guard: String,
    /// Seed for alias generation; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            marker: "obfuscate".to_string(),
            alias_prefix: "f_".to_string(),
            alias_len: 8,
            macro_header: "func_obf_macros.h".to_string(),
            header_guard: "FUNC_OBF_MACROS_H".to_string(),
            seed: None,
        }
    }
}

/// Configuration for the string obfuscation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringConfig {
    /// Single-byte XOR key, carried explicitly through every stage
    pub key: u8,
    /// Call-style wrapper marking a literal for hiding
    pub wrapper: String,
    /// Runtime decode routine emitted at call sites
    pub decoder: String,
    /// Prefix of derived macro names
    pub macro_prefix: String,
    /// Include guard of the generated byte-array header
    pub header_guard: String,
}

impl Default for StringConfig {
    fn default() -> Self {
        Self {
            key: 0xAA,
            wrapper: "O_STRING".to_string(),
            decoder: "deobfuscate".to_string(),
            macro_prefix: "OBF_".to_string(),
            header_guard: "OBFUSCATED_STRINGS_H".to_string(),
        }
    }
}

/// Configuration for the metadata randomizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Seed for value generation; `None` draws from the OS
    pub seed: Option<u64>,
}
