//! Pass registry and pass references.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use super::error::ProcessorError;
use super::pass::Pass;
use crate::Result;

/// Format whose passes apply to every output format.
pub const ALL_FORMAT: &str = "all";

/// Per-use pass options, as written in the form configuration.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Builds a pass from its options. `None` keeps the pass out of the context.
pub type PassFactory = Arc<dyn Fn(&Options) -> Result<Option<Rc<dyn Pass>>> + Send + Sync>;

/// How a form names a pass.
#[derive(Clone)]
pub enum PassRef {
    /// Looked up under the form's own format.
    Named(String),
    Qualified { format: String, name: String },
    /// Bypasses the registry.
    Direct(PassFactory),
}

impl PassRef {
    pub fn named(name: impl Into<String>) -> Self {
        PassRef::Named(name.into())
    }

    pub fn qualified(format: impl Into<String>, name: impl Into<String>) -> Self {
        PassRef::Qualified {
            format: format.into(),
            name: name.into(),
        }
    }

    pub fn direct<F>(factory: F) -> Self
    where
        F: Fn(&Options) -> Result<Option<Rc<dyn Pass>>> + Send + Sync + 'static,
    {
        PassRef::Direct(Arc::new(factory))
    }
}

impl fmt::Debug for PassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassRef::Named(name) => write!(f, "{name}"),
            PassRef::Qualified { format, name } => write!(f, "{format}:{name}"),
            PassRef::Direct(_) => f.write_str("<direct>"),
        }
    }
}

/// `"format:name"` is qualified, a bare `"name"` is looked up under the
/// form's format.
impl FromStr for PassRef {
    type Err = ProcessorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ProcessorError::InvalidReference(s.to_owned());
        match s.split_once(':') {
            Some((format, name)) => {
                if format.is_empty() || name.is_empty() || name.contains(':') {
                    return Err(invalid());
                }
                Ok(PassRef::qualified(format, name))
            }
            None if s.is_empty() => Err(invalid()),
            None => Ok(PassRef::named(s)),
        }
    }
}

impl<'de> Deserialize<'de> for PassRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Mapping from `(format, name)` to pass factories.
///
/// Factories are `Send + Sync`, so one registry can be shared by concurrent
/// builds; each build instantiates its own passes from it.
#[derive(Clone, Default)]
pub struct Registry {
    factories: IndexMap<(String, String), PassFactory>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.factories.keys().map(|(format, name)| format!("{format}:{name}")))
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the format-independent built-in passes.
    pub fn with_builtins() -> std::result::Result<Self, ProcessorError> {
        let mut registry = Self::new();
        crate::passes::register_builtins(&mut registry)?;
        Ok(registry)
    }

    pub fn register<F>(
        &mut self,
        format: impl Into<String>,
        name: impl Into<String>,
        factory: F,
    ) -> std::result::Result<(), ProcessorError>
    where
        F: Fn(&Options) -> Result<Option<Rc<dyn Pass>>> + Send + Sync + 'static,
    {
        let key = (format.into(), name.into());
        if self.factories.contains_key(&key) {
            let (format, name) = key;
            return Err(ProcessorError::Duplicate { format, name });
        }
        log::debug!("registered pass {}:{}", key.0, key.1);
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    pub fn get(&self, format: &str, name: &str) -> Option<&PassFactory> {
        self.factories.get(&(format.to_owned(), name.to_owned()))
    }

    pub fn contains(&self, format: &str, name: &str) -> bool {
        self.get(format, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered `(format, name)` keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.factories
            .keys()
            .map(|(format, name)| (format.as_str(), name.as_str()))
    }

    /// Factory behind `pass`, looking bare names up under `format`.
    pub fn resolve(
        &self,
        pass: &PassRef,
        format: &str,
    ) -> std::result::Result<PassFactory, ProcessorError> {
        let (format, name) = match pass {
            PassRef::Direct(factory) => return Ok(Arc::clone(factory)),
            PassRef::Named(name) => (format, name.as_str()),
            PassRef::Qualified { format, name } => (format.as_str(), name.as_str()),
        };
        self.get(format, name)
            .cloned()
            .ok_or_else(|| ProcessorError::Unknown {
                format: format.to_owned(),
                name: name.to_owned(),
            })
    }
}
