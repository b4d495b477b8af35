//! `if` and `unless` blocks.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::Result;
use crate::parser::Block;
use crate::processor::{BuildError, Context, Options, Output, Pass, PassExt, ProcessorError};

const PASS: &str = "if";

/// Keeps or drops a block body depending on its pairs.
///
/// Every pair of the block is a condition. `format` and `form` compare against
/// the form being built; any other key must be one of the custom conditions
/// given through the `conditions` option, which also override the two built-in
/// keys. `if` keeps the body when all conditions hold, `unless` when any fails.
#[derive(Debug, Clone, Default)]
pub struct Conditional {
    conditions: IndexMap<String, String>,
}

impl Conditional {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Reads custom conditions from the `conditions` option. Scalar values are
    /// compared by their textual form.
    pub fn from_options(options: &Options) -> std::result::Result<Self, ProcessorError> {
        let invalid = |option: &str, reason: &str| ProcessorError::InvalidOption {
            pass: PASS.to_owned(),
            option: option.to_owned(),
            reason: reason.to_owned(),
        };

        if options.get("embed").and_then(Value::as_bool) == Some(true) {
            return Err(invalid("embed", "embedded condition values are not supported"));
        }

        let mut pass = Self::new();
        match options.get("conditions") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    let value = match value {
                        Value::String(value) => value.clone(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(invalid("conditions", "condition values must be scalars"));
                        }
                        other => other.to_string(),
                    };
                    pass = pass.with_condition(key.clone(), value);
                }
            }
            Some(_) => return Err(invalid("conditions", "expected a map of condition values")),
        }
        Ok(pass)
    }

    pub fn conditions(&self) -> &IndexMap<String, String> {
        &self.conditions
    }

    fn condition<'a>(&'a self, ctx: &'a Context, key: &str) -> Option<&'a str> {
        if let Some(value) = self.conditions.get(key) {
            return Some(value.as_str());
        }
        let form = ctx.form();
        match key {
            "format" => Some(form.format.as_str()),
            "form" => Some(form.name.as_str()),
            _ => None,
        }
    }

    fn matches(&self, ctx: &Context, block: &Block) -> Result<bool> {
        for (key, expected) in block.pairs() {
            let Some(actual) = self.condition(ctx, key) else {
                return Err(BuildError::hook(
                    format!("unknown condition `{key}`"),
                    block.location().clone(),
                )
                .into());
            };
            if actual != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Pass for Conditional {
    fn name(&self) -> &str {
        PASS
    }

    fn process_block(&self, ctx: &mut Context, block: Block) -> Result<Output> {
        let matched = self.matches(ctx, &block)?;
        let keep = if block.name() == "unless" { !matched } else { matched };
        if !keep {
            return Ok(Output::Drop);
        }
        Ok(ctx.accept(block.body().clone().into())?.into())
    }
}

pub(super) fn factory(options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    let pass = Conditional::from_options(options)?;
    Ok(Some(Rc::new(pass.unrestricted_pairs().named(["if", "unless"]))))
}
