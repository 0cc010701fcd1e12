use crate::{SourceUnit, Transform};
use kmodcloak_core::{StringConfig, StringEntry, StringTable};
use kmodcloak_utils::errors::TransformError;
use rand::rngs::StdRng;
use regex::{NoExpand, Regex};
use tracing::debug;

/// Rewrites every wrapper call into a call of the runtime decode routine.
///
/// A call closing a statement keeps its `;` and gains a block comment with
/// the original text; calls inside larger expressions are substituted bare.
#[derive(Debug)]
pub struct StringEncrypt {
    rewrites: Vec<CallRewrite>,
}

#[derive(Debug)]
struct CallRewrite {
    terminated: Regex,
    bare: Regex,
    with_comment: String,
    call: String,
}

impl StringEncrypt {
    pub fn new(table: &StringTable, config: &StringConfig) -> Result<Self, TransformError> {
        if !kmodcloak_core::is_c_identifier(&config.decoder) {
            return Err(TransformError::InvalidConfig(format!(
                "decoder '{}' is not a C identifier",
                config.decoder
            )));
        }
        let rewrites = table
            .entries()
            .map(|entry| CallRewrite::new(entry, config))
            .collect::<Result<_, _>>()?;
        Ok(Self { rewrites })
    }
}

impl CallRewrite {
    fn new(entry: &StringEntry, config: &StringConfig) -> Result<Self, TransformError> {
        let site = format!(
            r"\b{}",
            regex::escape(&format!("{}(\"{}\")", config.wrapper, entry.original))
        );
        let call = format!(
            "{}({}, {}, {})",
            config.decoder,
            entry.macro_name,
            entry.len_macro(),
            entry.key_macro()
        );
        Ok(Self {
            terminated: Regex::new(&format!(r"{site}\s*;"))?,
            bare: Regex::new(&site)?,
            with_comment: format!("{call}; /* \"{}\" */", block_comment_safe(&entry.original)),
            call,
        })
    }
}

/// Keeps the provenance comment from closing early.
fn block_comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}

impl Transform for StringEncrypt {
    fn name(&self) -> &'static str {
        "StringEncrypt"
    }

    fn apply(&self, unit: &mut SourceUnit, _rng: &mut StdRng) -> Result<bool, TransformError> {
        let mut changed = false;
        for rewrite in &self.rewrites {
            let sites = rewrite.bare.find_iter(&unit.text).count();
            if sites == 0 {
                continue;
            }
            let text = rewrite
                .terminated
                .replace_all(&unit.text, NoExpand(&rewrite.with_comment));
            let text = rewrite.bare.replace_all(&text, NoExpand(&rewrite.call)).into_owned();
            debug!("{} call sites -> {}", sites, rewrite.call);
            unit.text = text;
            changed = true;
        }
        Ok(changed)
    }
}
