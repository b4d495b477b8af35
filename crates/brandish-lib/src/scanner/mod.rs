//! Scanner: source text to located tokens.
//!
//! Scanning is total. Anything that is not an escape, an operator, a number
//! or whitespace becomes `Text`, so the only failure left is a misconfigured
//! operator set. Scanning the same source twice yields identical tokens.

mod lexer;
mod token;


use std::sync::Arc;

use brandish_core::{ANONYMOUS_FILE, Location};
use serde::Deserialize;

pub use token::{Token, TokenKind, TokenSet, token_sets};

/// Errors raised while scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// No lexer rule matched. The fallback text rule makes this unreachable.
    #[error("{location}: unrecognized input `{text}`")]
    Unrecognized { text: String, location: Location },

    #[error("{location}: invalid tag delimiters: {reason}")]
    InvalidOperators { reason: String, location: Location },
}

impl ScanError {
    pub fn location(&self) -> &Location {
        match self {
            Self::Unrecognized { location, .. } | Self::InvalidOperators { location, .. } => {
                location
            }
        }
    }
}

/// Characters that are operators regardless of configuration.
const FIXED_OPERATORS: [(char, TokenKind); 3] = [
    ('=', TokenKind::Equal),
    ('"', TokenKind::Quote),
    ('/', TokenKind::Slash),
];

/// Construction-time scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScannerOptions {
    /// Opening and closing tag delimiters.
    pub tags: (char, char),
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self { tags: ('<', '>') }
    }
}

impl ScannerOptions {
    pub fn with_tags(mut self, open: char, close: char) -> Self {
        self.tags = (open, close);
        self
    }

    /// Token kind of `c` when it is one of the configured operators.
    pub fn operator_kind(&self, c: char) -> Option<TokenKind> {
        if c == self.tags.0 {
            return Some(TokenKind::TagOpen);
        }
        if c == self.tags.1 {
            return Some(TokenKind::TagClose);
        }
        FIXED_OPERATORS
            .iter()
            .find(|(op, _)| *op == c)
            .map(|(_, kind)| *kind)
    }

    /// Tag delimiters must be two distinct ASCII punctuation characters that
    /// do not clash with the fixed operators or the escape character.
    fn validate(&self, file: &Arc<str>) -> Result<(), ScanError> {
        let (open, close) = self.tags;
        let reason = if open == close {
            Some(format!("`{open}` used for both opening and closing"))
        } else {
            [open, close].into_iter().find_map(|c| {
                if !c.is_ascii_punctuation() {
                    Some(format!("`{c}` is not ASCII punctuation"))
                } else if c == '\\' {
                    Some("`\\` is reserved for escapes".to_owned())
                } else if FIXED_OPERATORS.iter().any(|(op, _)| *op == c) {
                    Some(format!("`{c}` is already an operator"))
                } else {
                    None
                }
            })
        };

        match reason {
            Some(reason) => Err(ScanError::InvalidOperators {
                reason,
                location: Location::new(Arc::clone(file), 1, 0),
            }),
            None => Ok(()),
        }
    }
}

/// Scanner over one source text.
#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    source: &'src str,
    file: Arc<str>,
    options: ScannerOptions,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str, file: impl Into<Arc<str>>) -> Self {
        Self {
            source,
            file: file.into(),
            options: ScannerOptions::default(),
        }
    }

    /// Scanner for a source with no file name.
    pub fn anonymous(source: &'src str) -> Self {
        Self::new(source, ANONYMOUS_FILE)
    }

    pub fn with_options(mut self, options: ScannerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScannerOptions {
        &self.options
    }

    /// Scans the whole source. Does not consume the scanner, so calling it
    /// again reproduces the same tokens.
    pub fn scan(&self) -> Result<Vec<Token>, ScanError> {
        self.options.validate(&self.file)?;
        let tokens = lexer::tokenize(self.source, Arc::clone(&self.file), &self.options)?;
        log::trace!("scanned {} tokens from {}", tokens.len(), self.file);
        Ok(tokens)
    }
}

/// Scans `source` from `file` with the given options.
pub fn scan(
    source: &str,
    file: impl Into<Arc<str>>,
    options: &ScannerOptions,
) -> Result<Vec<Token>, ScanError> {
    Scanner::new(source, file)
        .with_options(options.clone())
        .scan()
}
