//! Literal strings marked for hiding, and their XOR-encoded form.

use crate::config::StringConfig;
use indexmap::IndexMap;
use kmodcloak_utils::errors::TransformError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One distinct wrapped literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEntry {
    /// Text between the quotes, verbatim
    pub original: String,
    /// Header identifier of the byte array
    pub macro_name: String,
    /// XOR-encoded bytes including the trailing zero
    pub cipher: Vec<u8>,
    pub key: u8,
}

impl StringEntry {
    pub fn len_macro(&self) -> String {
        format!("{}_LEN", self.macro_name)
    }

    pub fn key_macro(&self) -> String {
        format!("{}_KEY", self.macro_name)
    }

    /// Reverses the encoding, stopping before the terminator.
    pub fn decode(&self) -> Vec<u8> {
        xor_decode(&self.cipher, self.key)
    }
}

/// Uppercases `text` and replaces every non-identifier character with `_`.
pub fn macro_name(prefix: &str, text: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + text.len());
    name.push_str(prefix);
    name.extend(text.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    name
}

/// XORs each byte of `text` with `key` and appends a zero terminator.
pub fn xor_encode(text: &str, key: u8) -> Vec<u8> {
    text.bytes().map(|b| b ^ key).chain(std::iter::once(0)).collect()
}

/// Mirrors the runtime decode routine: XOR each byte until the terminator.
pub fn xor_decode(cipher: &[u8], key: u8) -> Vec<u8> {
    let body = match cipher.split_last() {
        Some((&0, body)) => body,
        _ => cipher,
    };
    body.iter().map(|b| b ^ key).collect()
}

/// Distinct wrapped literals of one source file, in order of first appearance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringTable {
    key: u8,
    entries: IndexMap<String, StringEntry>,
}

impl StringTable {
    pub fn new(key: u8) -> Self {
        Self {
            key,
            entries: IndexMap::new(),
        }
    }

    /// Matches `WRAPPER("text")` calls for the configured wrapper.
    pub fn wrapper_pattern(wrapper: &str) -> Result<Regex, TransformError> {
        if !crate::is_c_identifier(wrapper) {
            return Err(TransformError::InvalidConfig(format!(
                "wrapper '{wrapper}' is not a C identifier"
            )));
        }
        Ok(Regex::new(&format!(r#"\b{}\("([^"\n]+)"\)"#, regex::escape(wrapper)))?)
    }

    /// Builds the table for every wrapper call in `source`.
    pub fn scan(source: &str, config: &StringConfig) -> Result<Self, TransformError> {
        let pattern = Self::wrapper_pattern(&config.wrapper)?;
        let mut table = Self::new(config.key);
        let mut calls = 0;
        for caps in pattern.captures_iter(source) {
            calls += 1;
            table.add(&caps[1], &config.macro_prefix);
        }
        info!(
            "Found {} {} calls covering {} distinct strings",
            calls,
            config.wrapper,
            table.len()
        );
        Ok(table)
    }

    /// Adds `text` if not yet present and returns its entry.
    ///
    /// Each entry defines three identifiers: the array, `_LEN` and `_KEY`.
    /// A text whose identifiers clash with any already defined gets a numeric
    /// suffix so no header definition is lost or shadowed.
    pub fn add(&mut self, text: &str, prefix: &str) -> &StringEntry {
        if !self.entries.contains_key(text) {
            let used: HashSet<String> = self
                .entries
                .values()
                .flat_map(|e| [e.macro_name.clone(), e.len_macro(), e.key_macro()])
                .collect();
            let taken = |name: &str| {
                used.contains(name)
                    || used.contains(&format!("{name}_LEN"))
                    || used.contains(&format!("{name}_KEY"))
            };
            let base = macro_name(prefix, text);
            let mut name = base.clone();
            let mut n = 2;
            while taken(&name) {
                name = format!("{base}_{n}");
                n += 1;
            }
            if name != base {
                warn!(
                    "macro name {} already used by another string, \"{}\" becomes {}",
                    base, text, name
                );
            }
            debug!("\"{}\" -> {}", text, name);
            let entry = StringEntry {
                original: text.to_string(),
                macro_name: name,
                cipher: xor_encode(text, self.key),
                key: self.key,
            };
            self.entries.insert(text.to_string(), entry);
        }
        &self.entries[text]
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn get(&self, text: &str) -> Option<&StringEntry> {
        self.entries.get(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &StringEntry> {
        self.entries.values()
    }
}
