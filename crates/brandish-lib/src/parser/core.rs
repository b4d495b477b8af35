//! Parser state and low-level token operations.

use brandish_core::Location;

use super::error::ParseError;
use super::node::Root;
use crate::scanner::{Token, TokenKind, TokenSet};

pub const DEFAULT_RECURSION_LIMIT: u32 = 512;

/// Union of two locations taken from one token stream, which always share a
/// file.
pub(super) fn cover(a: &Location, b: &Location) -> Location {
    a.union(b).unwrap_or_else(|_| a.clone())
}

/// Recursive-descent parser over a scanned token stream.
///
/// The stream always ends in an `Eof` token, so peeking never runs dry.
#[derive(Debug)]
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) depth: u32,
    recursion_limit: u32,
    root: Option<Root>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        match tokens.last() {
            Some(last) if last.is(TokenKind::Eof) => {}
            Some(last) => {
                let location = last.location.clone();
                tokens.push(Token::eof(location));
            }
            None => tokens.push(Token::eof(Location::default())),
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            root: None,
        }
    }

    /// Maximum block/command nesting depth.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Parses the token stream into a document root.
    ///
    /// The first successful result is cached, so later calls return the same
    /// tree without reparsing.
    pub fn parse(&mut self) -> Result<Root, ParseError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        self.pos = 0;
        self.depth = 0;
        let root = self.parse_document()?;
        log::trace!("parsed document with {} top-level nodes", root.children().len());
        self.root = Some(root.clone());
        Ok(root)
    }

    pub(super) fn peek(&self) -> &Token {
        self.nth(0)
    }

    pub(super) fn nth(&self, lookahead: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + lookahead).min(last)]
    }

    pub(super) fn at_set(&self, set: TokenSet) -> bool {
        set.contains(self.peek().kind)
    }

    /// Consumes the current token. `Eof` is never consumed.
    pub(super) fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is(TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect_set(TokenSet::single(kind))
    }

    pub(super) fn expect_set(&mut self, set: TokenSet) -> Result<Token, ParseError> {
        if self.at_set(set) {
            return Ok(self.bump());
        }
        Err(self.unexpected(set))
    }

    pub(super) fn unexpected(&self, expected: TokenSet) -> ParseError {
        let found = self.peek();
        ParseError::UnexpectedToken {
            found: found.kind,
            expected,
            location: found.location.clone(),
        }
    }

    pub(super) fn skip_trivia(&mut self) {
        while self.peek().kind.is_trivia() {
            self.pos += 1;
        }
    }

    /// Consumes tokens while they belong to `set`.
    pub(super) fn collect_while(&mut self, set: TokenSet) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.at_set(set) {
            tokens.push(self.bump());
        }
        tokens
    }

    pub(super) fn enter_recursion(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.recursion_limit {
            return Err(ParseError::RecursionLimitExceeded {
                location: self.peek().location.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
