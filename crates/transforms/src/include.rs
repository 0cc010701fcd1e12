//! Insertion of `#include` directives for generated headers.

use crate::{SourceUnit, Transform};
use kmodcloak_utils::errors::TransformError;
use rand::rngs::StdRng;
use tracing::debug;

pub fn include_directive(header: &str) -> String {
    format!("#include \"{header}\"\n")
}

fn check_header(header: &str) -> Result<(), TransformError> {
    if header.is_empty() || header.contains(['"', '\n', '\r']) {
        return Err(TransformError::InvalidConfig(format!(
            "header name {header:?} cannot be used in an #include directive"
        )));
    }
    Ok(())
}

/// Puts include directives above every other line of the file, in order.
///
/// The rename macros must precede every token they apply to, including the
/// ones pulled in by pre-existing includes.
#[derive(Debug, Clone)]
pub struct PrependIncludes {
    headers: Vec<String>,
}

impl PrependIncludes {
    pub fn new<I, S>(headers: I) -> Result<Self, TransformError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        for header in &headers {
            check_header(header)?;
        }
        Ok(Self { headers })
    }
}

impl Transform for PrependIncludes {
    fn name(&self) -> &'static str {
        "PrependIncludes"
    }

    fn apply(&self, unit: &mut SourceUnit, _rng: &mut StdRng) -> Result<bool, TransformError> {
        if self.headers.is_empty() {
            return Ok(false);
        }
        let mut text: String = self.headers.iter().map(|h| include_directive(h)).collect();
        text.push_str(&unit.text);
        unit.text = text;
        Ok(true)
    }
}

/// Includes a header right after the first existing `#include`, or at the
/// top when the file has none. A file that already includes it is left alone.
#[derive(Debug, Clone)]
pub struct EnsureInclude {
    header: String,
}

impl EnsureInclude {
    pub fn new(header: impl Into<String>) -> Result<Self, TransformError> {
        let header = header.into();
        check_header(&header)?;
        Ok(Self { header })
    }
}

impl Transform for EnsureInclude {
    fn name(&self) -> &'static str {
        "EnsureInclude"
    }

    fn apply(&self, unit: &mut SourceUnit, _rng: &mut StdRng) -> Result<bool, TransformError> {
        let directive = include_directive(&self.header);
        if unit.text.lines().any(|l| l.trim() == directive.trim_end()) {
            debug!("{} already included", self.header);
            return Ok(false);
        }

        let mut offset = 0;
        let mut anchor = None;
        for line in unit.text.split_inclusive('\n') {
            offset += line.len();
            if line.starts_with("#include") {
                anchor = Some((offset, line.ends_with('\n')));
                break;
            }
        }

        match anchor {
            Some((at, true)) => unit.text.insert_str(at, &directive),
            Some((at, false)) => unit.text.insert_str(at, &format!("\n{}", directive.trim_end())),
            None => unit.text.insert_str(0, &directive),
        }
        Ok(true)
    }
}
