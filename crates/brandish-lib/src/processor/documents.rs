//! Source resolution and the shared cache of parsed documents.

use std::fmt;
use std::io;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use crate::parser::{self, Root};
use crate::scanner::ScannerOptions;
use crate::{Error, Result};

/// Maps a document name to its source text.
pub trait Resolve: Send + Sync {
    fn read(&self, name: &str) -> io::Result<String>;
}

impl<F> Resolve for F
where
    F: Fn(&str) -> io::Result<String> + Send + Sync,
{
    fn read(&self, name: &str) -> io::Result<String> {
        self(name)
    }
}

/// Resolver over an in-memory set of documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: IndexMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.files.insert(name.into(), source.into());
    }
}

impl Resolve for MemoryResolver {
    fn read(&self, name: &str) -> io::Result<String> {
        self.files.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no document named `{name}`"))
        })
    }
}

/// Parsed documents keyed by name.
///
/// Roots are immutable, so one cache can back any number of concurrent
/// builds. A document is parsed at most once per cache.
pub struct Documents {
    resolver: Box<dyn Resolve>,
    options: ScannerOptions,
    cache: RwLock<IndexMap<String, Root>>,
}

impl fmt::Debug for Documents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Documents")
            .field("options", &self.options)
            .field("cached", &cache.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Documents {
    pub fn new(resolver: impl Resolve + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            options: ScannerOptions::default(),
            cache: RwLock::new(IndexMap::new()),
        }
    }

    pub fn with_options(mut self, options: ScannerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScannerOptions {
        &self.options
    }

    /// Parsed root of `name`, reading and parsing it on first use.
    pub fn load(&self, name: &str) -> Result<Root> {
        if let Some(root) = self.cached(name) {
            return Ok(root);
        }

        log::debug!("loading document {name}");
        let source = self.resolver.read(name).map_err(|source| Error::Resolve {
            name: name.to_owned(),
            source,
        })?;
        let root = parser::parse(&source, name, &self.options)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(name.to_owned()).or_insert(root).clone())
    }

    pub fn cached(&self, name: &str) -> Option<Root> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(name).cloned()
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cached(name).is_some()
    }
}
