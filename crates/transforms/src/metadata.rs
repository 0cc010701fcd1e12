//! Replaces the module name, author, and description macros of a header with
//! plausible-looking random values.

use crate::{SourceUnit, Transform};
use kmodcloak_utils::errors::TransformError;
use once_cell::sync::Lazy;
use rand::Rng;
use rand::rngs::StdRng;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

const NAME_PREFIXES: &[&str] = &[
    "kmod", "kern", "sys", "drv", "mod", "hw", "dev", "net", "usb", "pci",
];
const NAME_SUFFIXES: &[&str] = &[
    "core", "utils", "helper", "driver", "support", "handler", "mgmt", "ctrl",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Chris", "Jordan", "Sam", "Taylor", "Morgan", "Casey", "Riley", "Avery", "Blake",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Wilson", "Davis", "Miller", "Garcia", "Anderson", "Thomas",
    "Jackson",
];

const COMPONENTS: &[&str] = &[
    "Device", "System", "Hardware", "Network", "Memory", "Process", "Driver", "Interface",
];
const ACTIONS: &[&str] = &[
    "Management", "Control", "Support", "Handler", "Monitor", "Utility", "Helper", "Service",
];
const PURPOSES: &[&str] = &[
    "for enhanced performance",
    "with advanced features",
    "providing core functionality",
    "with optimized handling",
    "for system stability",
    "with improved efficiency",
];

static NAME_DEFINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#define\s+MODULE_NAME\s+"[^"]*""#).unwrap());
static AUTHOR_DEFINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#define\s+MODULE_AUTHOR_NAME\s+"[^"]*""#).unwrap());
static DESC_DEFINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#define\s+MODULE_DESC\s+"[^"]*""#).unwrap());

fn pick<'a>(words: &[&'a str], rng: &mut impl Rng) -> &'a str {
    words[rng.random_range(0..words.len())]
}

/// The three metadata values written into the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub author: String,
    pub description: String,
}

impl ModuleMetadata {
    /// `<prefix>_<suffix>_<10..=99>`, e.g. `drv_mgmt_42`.
    pub fn random_name(rng: &mut impl Rng) -> String {
        format!(
            "{}_{}_{}",
            pick(NAME_PREFIXES, rng),
            pick(NAME_SUFFIXES, rng),
            rng.random_range(10..=99)
        )
    }

    pub fn random_author(rng: &mut impl Rng) -> String {
        format!("{} {}", pick(FIRST_NAMES, rng), pick(LAST_NAMES, rng))
    }

    pub fn random_description(rng: &mut impl Rng) -> String {
        format!(
            "{} {} {}",
            pick(COMPONENTS, rng),
            pick(ACTIONS, rng),
            pick(PURPOSES, rng)
        )
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            name: Self::random_name(rng),
            author: Self::random_author(rng),
            description: Self::random_description(rng),
        }
    }
}

/// Writes fixed metadata values over the three recognized macro definitions;
/// every other line passes through unchanged.
#[derive(Debug, Clone)]
pub struct MetadataRewrite {
    values: ModuleMetadata,
}

impl MetadataRewrite {
    pub fn new(values: ModuleMetadata) -> Result<Self, TransformError> {
        for value in [&values.name, &values.author, &values.description] {
            if value.contains(['"', '\n']) {
                return Err(TransformError::InvalidConfig(format!(
                    "metadata value {value:?} cannot be a C string literal"
                )));
            }
        }
        Ok(Self { values })
    }
}

impl Transform for MetadataRewrite {
    fn name(&self) -> &'static str {
        "MetadataRewrite"
    }

    fn apply(&self, unit: &mut SourceUnit, _rng: &mut StdRng) -> Result<bool, TransformError> {
        let mut changed = false;
        for (pattern, macro_name, value) in [
            (&NAME_DEFINE, "MODULE_NAME", &self.values.name),
            (&AUTHOR_DEFINE, "MODULE_AUTHOR_NAME", &self.values.author),
            (&DESC_DEFINE, "MODULE_DESC", &self.values.description),
        ] {
            if !pattern.is_match(&unit.text) {
                debug!("{} not defined, skipping", macro_name);
                continue;
            }
            let define = format!("#define {macro_name} \"{value}\"");
            unit.text = pattern.replace_all(&unit.text, NoExpand(&define)).into_owned();
            changed = true;
        }
        Ok(changed)
    }
}
