//! Parser: token stream to an immutable node tree.
//!
//! # Architecture
//!
//! A hand-written recursive-descent parser over the scanner's tokens.
//!
//! - The token stream always ends in `Eof`, and `Eof` is never consumed, so
//!   lookahead needs no end-of-stream checks.
//! - There is no error recovery: the first unexpected token aborts the parse.
//! - Composite nodes are located at the union of their delimiters and parts.
//!   An empty root falls back to a default location (end of input for the
//!   document, the end of the opening tag for a block body).
//! - Nesting depth is bounded by a recursion limit.

mod core;
mod dump;
mod error;
mod grammar;
mod node;


pub use core::{DEFAULT_RECURSION_LIMIT, Parser};
pub use error::{NodeError, ParseError};
pub use node::{Block, Command, Field, Node, Pair, Pairs, Root, Str, Text};

use std::sync::Arc;

use crate::scanner::{Scanner, ScannerOptions};

/// Scans and parses `source` in one step.
pub fn parse(
    source: &str,
    file: impl Into<Arc<str>>,
    options: &ScannerOptions,
) -> crate::Result<Root> {
    let tokens = Scanner::new(source, file)
        .with_options(options.clone())
        .scan()?;
    Ok(Parser::new(tokens).parse()?)
}
