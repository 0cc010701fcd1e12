pub mod config;
pub mod header;
pub mod literal;
pub mod names;
pub mod scanner;
pub mod symbol;

pub use config::{MetadataConfig, StringConfig, SymbolConfig};
pub use literal::{StringEntry, StringTable};
pub use names::{NameGenerator, NameMap};
pub use scanner::AnnotationScanner;
pub use symbol::{Symbol, SymbolKind, SymbolSet};

use rand::{rngs::StdRng, SeedableRng};

/// Builds the RNG for one run: reproducible when a seed is given, OS-seeded otherwise.
pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Returns true if `s` is a well-formed C identifier.
pub fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
