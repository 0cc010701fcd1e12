use crate::is_c_identifier;
use crate::symbol::SymbolSet;
use kmodcloak_utils::errors::NameError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Characters drawn for the random part of an alias.
const ALIAS_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Draws per symbol before giving up.
const MAX_ATTEMPTS: usize = 64;

/// Original symbol name to generated alias, sorted by original name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameMap(BTreeMap<String, String>);

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: impl Into<String>, alias: impl Into<String>) {
        self.0.insert(original.into(), alias.into());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.0.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(original, alias)` pairs in sorted order of the original name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Generates aliases of the shape `<prefix><len random [a-z0-9]>`.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    prefix: String,
    len: usize,
}

impl NameGenerator {
    pub fn new(prefix: impl Into<String>, len: usize) -> Result<Self, NameError> {
        let prefix = prefix.into();
        if !is_c_identifier(&prefix) {
            return Err(NameError::InvalidPrefix(prefix));
        }
        if len == 0 {
            return Err(NameError::ZeroLength);
        }
        Ok(Self { prefix, len })
    }

    /// Draws one candidate alias.
    pub fn random_name(&self, rng: &mut impl Rng) -> String {
        let mut name = String::with_capacity(self.prefix.len() + self.len);
        name.push_str(&self.prefix);
        for _ in 0..self.len {
            let idx = rng.random_range(0..ALIAS_CHARSET.len());
            name.push(ALIAS_CHARSET[idx] as char);
        }
        name
    }

    /// Assigns every symbol a fresh alias.
    ///
    /// Aliases are unique within the map and never coincide with one of the
    /// original names; a clashing draw is discarded and retried.
    pub fn generate(&self, symbols: &SymbolSet, rng: &mut impl Rng) -> Result<NameMap, NameError> {
        let mut used: HashSet<String> = symbols.names().map(str::to_string).collect();
        let mut map = NameMap::new();

        for name in symbols.names() {
            let mut attempts = 0;
            let alias = loop {
                if attempts == MAX_ATTEMPTS {
                    return Err(NameError::Exhausted {
                        symbol: name.to_string(),
                        attempts,
                    });
                }
                attempts += 1;
                let candidate = self.random_name(rng);
                if used.insert(candidate.clone()) {
                    break candidate;
                }
                debug!("alias {} already taken, redrawing", candidate);
            };
            debug!("{} -> {}", name, alias);
            map.insert(name, alias);
        }
        Ok(map)
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self {
            prefix: "f_".to_string(),
            len: 8,
        }
    }
}
