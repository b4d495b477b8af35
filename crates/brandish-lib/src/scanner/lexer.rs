//! Logos-driven raw lexer and the post-pass that turns raw lexemes into tokens.
//!
//! Logos only knows the static shape of the language: escapes, single ASCII
//! punctuation characters, numbers, line breaks, spaces and words. Which
//! punctuation characters are operators is decided at runtime from
//! [`ScannerOptions`]; every non-operator punctuation character is coalesced
//! with neighbouring words into one maximal `Text` token.

use std::ops::Range;
use std::sync::Arc;

use brandish_core::Location;
use logos::Logos;

use super::token::{Token, TokenKind};
use super::{ScanError, ScannerOptions};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Raw {
    #[regex(r"\\[^\r\n]")]
    #[regex(r"\\(\r\n|\r|\n)")]
    Escape,

    /// Any single ASCII punctuation character, backslash included.
    #[regex(r"[!-/:-@\[-`{-~]")]
    Punct,

    #[regex(r"0x[0-9a-fA-F]+")]
    #[regex(r"[+-]?[0-9]+(\.[0-9]+)?")]
    Numeric,

    #[regex(r"\r\n|\r|\n")]
    Line,

    #[regex(r"[ \t\x0B\x0C]+")]
    Space,

    /// Everything that is not a digit, whitespace or ASCII punctuation.
    #[regex(r"[^0-9 \t\x0B\x0C\r\n!-/:-@\[-`{-~]+")]
    Word,
}

/// Tracks the line/column cursor while tokens are emitted in source order.
struct Emitter<'src> {
    source: &'src str,
    file: Arc<str>,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    /// Byte range of a `Text` run that has not been emitted yet.
    pending_text: Option<Range<usize>>,
}

impl<'src> Emitter<'src> {
    fn new(source: &'src str, file: Arc<str>) -> Self {
        Self {
            source,
            file,
            line: 1,
            column: 0,
            tokens: Vec::new(),
            pending_text: None,
        }
    }

    fn location(&self, width: u32) -> Location {
        Location::new(
            Arc::clone(&self.file),
            self.line,
            self.column..self.column + width,
        )
    }

    fn extend_text(&mut self, span: Range<usize>) {
        self.pending_text = match self.pending_text.take() {
            Some(pending) => Some(pending.start..span.end),
            None => Some(span),
        };
    }

    fn flush_text(&mut self) {
        if let Some(span) = self.pending_text.take() {
            self.push(TokenKind::Text, span);
        }
    }

    fn push(&mut self, kind: TokenKind, span: Range<usize>) {
        let value = &self.source[span];
        let width = value.chars().count() as u32;
        let location = self.location(width);
        self.tokens.push(Token::new(kind, value, location));

        if ends_with_line_break(value) {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += width;
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_text();
        let location = self.location(0);
        self.tokens.push(Token::eof(location));
        self.tokens
    }
}

fn ends_with_line_break(value: &str) -> bool {
    value.ends_with('\n') || value.ends_with('\r')
}

/// Scans `source` into tokens, terminated by a single `Eof`.
pub(super) fn tokenize(
    source: &str,
    file: Arc<str>,
    options: &ScannerOptions,
) -> Result<Vec<Token>, ScanError> {
    let mut emitter = Emitter::new(source, file);
    let mut lexer = Raw::lexer(source);

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let Ok(raw) = raw else {
            emitter.flush_text();
            return Err(ScanError::Unrecognized {
                text: source[span].to_owned(),
                location: emitter.location(1),
            });
        };

        match raw {
            Raw::Word => emitter.extend_text(span),
            Raw::Punct => {
                let c = char_at(source, span.start);
                match options.operator_kind(c) {
                    Some(kind) => {
                        emitter.flush_text();
                        emitter.push(kind, span);
                    }
                    // A lone backslash only happens at end of input.
                    None => emitter.extend_text(span),
                }
            }
            Raw::Numeric => {
                let sign = char_at(source, span.start);
                let signed = matches!(sign, '+' | '-');
                match options.operator_kind(sign) {
                    Some(kind) => {
                        emitter.flush_text();
                        emitter.push(kind, span.start..span.start + 1);
                        emitter.push(TokenKind::Numeric, span.start + 1..span.end);
                    }
                    // A sign right after text belongs to that text run.
                    None if signed && emitter.pending_text.is_some() => {
                        emitter.extend_text(span.start..span.start + 1);
                        emitter.flush_text();
                        emitter.push(TokenKind::Numeric, span.start + 1..span.end);
                    }
                    None => {
                        emitter.flush_text();
                        emitter.push(TokenKind::Numeric, span);
                    }
                }
            }
            Raw::Escape => {
                emitter.flush_text();
                emitter.push(TokenKind::Escape, span);
            }
            Raw::Line => {
                emitter.flush_text();
                emitter.push(TokenKind::Line, span);
            }
            Raw::Space => {
                emitter.flush_text();
                emitter.push(TokenKind::Space, span);
            }
        }
    }

    Ok(emitter.finish())
}

fn char_at(source: &str, offset: usize) -> char {
    source[offset..].chars().next().unwrap_or_default()
}
