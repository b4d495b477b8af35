//! Pass engine: runs an ordered pipeline of tree-rewriting passes.
//!
//! # Architecture
//!
//! A [`Context`] owns the pipeline for one build. [`Context::accept`] folds a
//! node through the built-in [`Descend`] pass and then every registered pass,
//! left to right. Each step returns a replacement node, final text or a drop
//! (see [`Output`]). An update-prevented result ends the fold for that node.
//!
//! Traversal is driven by `Descend` alone, which accepts the children of every
//! root. Blocks are leaves to it; a pass looks inside a block by accepting the
//! block's body itself.
//!
//! Passes come from a [`Registry`] of factories keyed by `(format, name)`. A
//! [`Form`] lists the passes to use and resolves them against the registry.

mod context;
mod descend;
mod documents;
mod error;
mod filter;
mod form;
mod pass;
mod registry;

#[cfg(test)]
mod context_tests;
#[cfg(test)]
mod registry_tests;

pub use context::{Context, ReentryPolicy};
pub use descend::Descend;
pub use documents::{Documents, MemoryResolver, Resolve};
pub use error::{BuildError, BuildErrorKind, ProcessorError};
pub use filter::{AllowedPairs, NameFilter, PairFilter, PairTarget, PassExt};
pub use form::{DEFAULT_ENTRY, Form, PassSpec};
pub use pass::{Output, Pass, dispatch};
pub use registry::{ALL_FORMAT, Options, PassFactory, PassRef, Registry};
