use crate::{SourceUnit, Transform};
use kmodcloak_utils::errors::TransformError;
use rand::rngs::StdRng;
use tracing::info;

/// Runs `passes` over `unit` in order, returning the names of those that changed it.
///
/// A failing pass aborts the run; earlier passes are not undone.
pub fn run(
    unit: &mut SourceUnit,
    passes: &[Box<dyn Transform>],
    rng: &mut StdRng,
) -> Result<Vec<&'static str>, TransformError> {
    let mut applied = Vec::new();

    for pass in passes {
        let mutated = pass.apply(unit, rng)?;
        info!(
            "{:>18} {}",
            pass.name(),
            if mutated { "✓" } else { "×" }
        );
        if mutated {
            applied.push(pass.name());
        }
    }
    Ok(applied)
}
