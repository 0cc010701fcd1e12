use crate::{SourceUnit, Transform};
use kmodcloak_core::NameMap;
use kmodcloak_utils::errors::TransformError;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use regex::{Captures, Regex};
use tracing::debug;

/// `module_init(name)` / `module_exit(name)`, whitespace-tolerant.
static REGISTRATION_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(module_init|module_exit)\s*\(\s*(\w+)\s*\)").unwrap()
});

/// Points the module lifecycle registration macros at the aliases directly,
/// so they never depend on the rename macros reaching their arguments.
#[derive(Debug, Clone)]
pub struct RegistrationRewrite {
    names: NameMap,
}

impl RegistrationRewrite {
    pub fn new(names: NameMap) -> Self {
        Self { names }
    }
}

impl Transform for RegistrationRewrite {
    fn name(&self) -> &'static str {
        "RegistrationRewrite"
    }

    fn apply(&self, unit: &mut SourceUnit, _rng: &mut StdRng) -> Result<bool, TransformError> {
        let mut rewritten = 0;
        let text = REGISTRATION_CALL.replace_all(&unit.text, |caps: &Captures<'_>| {
            match self.names.get(&caps[2]) {
                Some(alias) => {
                    rewritten += 1;
                    debug!("{}({}) -> {}({})", &caps[1], &caps[2], &caps[1], alias);
                    format!("{}({})", &caps[1], alias)
                }
                None => caps[0].to_string(),
            }
        });

        if rewritten == 0 {
            return Ok(false);
        }
        unit.text = text.into_owned();
        Ok(true)
    }
}
