//! Brandish: a tagged-markup compiler core.
//!
//! Source text is scanned into tokens, parsed into an immutable node tree and
//! then rewritten by an ordered pipeline of passes.
//!
//! # Example
//!
//! ```
//! use brandish_lib::parser;
//! use brandish_lib::processor::{Context, Form, Registry};
//! use brandish_lib::scanner::ScannerOptions;
//!
//! let root = parser::parse(
//!     "Hello <comment>hidden</comment>world",
//!     "index.br",
//!     &ScannerOptions::default(),
//! )
//! .unwrap();
//!
//! let registry = Registry::with_builtins().unwrap();
//! let form = Form::new("site", "html").use_pass("all:comment".parse().unwrap(), Default::default());
//! let mut ctx = Context::for_form(form, &registry).unwrap();
//! let result = ctx.process(root).unwrap().unwrap();
//! assert_eq!(result.as_root().unwrap().flatten().unwrap(), "Hello world");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod parser;
pub mod passes;
pub mod processor;
pub mod scanner;

#[cfg(test)]
mod test_utils;

use std::io;

use brandish_core::Location;

pub use parser::{Node, NodeError, ParseError, Parser, Root};
pub use processor::{BuildError, BuildErrorKind, Context, Form, Pass, ProcessorError, Registry};
pub use scanner::{ScanError, Scanner, ScannerOptions};

/// Errors from any stage of a build.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error("no shared state under `{0}`")]
    MissingState(String),

    #[error("shared state under `{0}` has a different type")]
    StateType(String),

    #[error("cannot read document `{name}`: {source}")]
    Resolve {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Source location the error points at, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Scan(err) => Some(err.location()),
            Error::Parse(err) => Some(err.location()),
            Error::Node(err) => Some(err.location()),
            Error::Build(err) => Some(&err.location),
            Error::Processor(_)
            | Error::MissingState(_)
            | Error::StateType(_)
            | Error::Resolve { .. } => None,
        }
    }

    /// Tags a location-less error as a hook failure at `location`.
    pub fn located_at(self, location: &Location) -> Error {
        if self.location().is_some() {
            return self;
        }
        BuildError::hook(self.to_string(), location.clone()).into()
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, Error>;
