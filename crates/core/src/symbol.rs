use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category a declaration was recognized under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Variable,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// An annotated declaration selected for renaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

/// Set of symbols keyed by name, iterated in sorted order.
///
/// Functions and variables share one namespace: inserting a name that is
/// already present keeps the first kind recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: BTreeMap<String, SymbolKind>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol, returning false if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, kind: SymbolKind) -> bool {
        let name = name.into();
        if self.symbols.contains_key(&name) {
            return false;
        }
        self.symbols.insert(name, kind);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.symbols.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Sorted names of every symbol.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    /// Sorted names of the symbols of one kind.
    pub fn names_of(&self, kind: SymbolKind) -> Vec<&str> {
        self.symbols
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().map(|(name, kind)| Symbol {
            name: name.clone(),
            kind: *kind,
        })
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = Self::new();
        for symbol in iter {
            set.insert(symbol.name, symbol.kind);
        }
        set
    }
}
