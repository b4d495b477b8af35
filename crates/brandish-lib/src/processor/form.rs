//! Output forms: a format, an entry document and an ordered pass list.

use std::sync::Arc;

use serde::Deserialize;

use super::context::Context;
use super::documents::Documents;
use super::registry::{Options, PassRef, Registry};
use crate::Result;
use crate::parser::Node;

pub const DEFAULT_ENTRY: &str = "index.br";

fn default_entry() -> String {
    DEFAULT_ENTRY.to_owned()
}

/// One `(pass, options)` entry of a form.
#[derive(Debug, Clone, Deserialize)]
pub struct PassSpec {
    pub pass: PassRef,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Form {
    pub name: String,
    pub format: String,
    #[serde(default = "default_entry")]
    pub entry: String,
    #[serde(default)]
    pub passes: Vec<PassSpec>,
}

impl Form {
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
            entry: default_entry(),
            passes: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Appends a pass to the form's pipeline.
    pub fn use_pass(mut self, pass: PassRef, options: Options) -> Self {
        self.passes.push(PassSpec { pass, options });
        self
    }

    /// Loads the entry document and runs it through a fresh context.
    pub fn build(&self, registry: &Registry, documents: &Arc<Documents>) -> Result<Option<Node>> {
        log::debug!("building form {} ({}) from {}", self.name, self.format, self.entry);
        let root = documents.load(&self.entry)?;
        let mut ctx = Context::new(self.clone()).with_documents(Arc::clone(documents));
        ctx.use_form_passes(registry)?;
        ctx.process(root)
    }
}
