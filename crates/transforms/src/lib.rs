pub mod include;
pub mod metadata;
pub mod obfuscator;
pub mod pass;
pub mod registration;
pub mod string_encrypt;

use kmodcloak_utils::errors::TransformError;
use rand::rngs::StdRng;

/// Text of one file flowing through a sequence of transforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUnit {
    pub text: String,
}

impl SourceUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Trait for source obfuscation transforms.
pub trait Transform: Send + Sync {
    /// Returns the transform's name for logging and identification.
    fn name(&self) -> &'static str;
    /// Applies the transform to the unit, returning whether changes were made.
    fn apply(&self, unit: &mut SourceUnit, rng: &mut StdRng) -> Result<bool, TransformError>;
}
