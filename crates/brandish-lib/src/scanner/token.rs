//! Token kinds, tokens and token sets.

use std::fmt;

use brandish_core::Location;

/// Kinds of tokens produced by the scanner.
///
/// `TagOpen`/`TagClose` are the configured tag delimiters (`<`/`>` by
/// default), named by role since the glyphs are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TokenKind {
    TagOpen = 0,
    TagClose,
    Slash,
    Equal,
    Quote,
    Text,
    Space,
    Line,
    Numeric,
    Escape,
    Eof,
}

use TokenKind::*;

impl TokenKind {
    pub const ALL: [TokenKind; 11] = [
        TagOpen, TagClose, Slash, Equal, Quote, Text, Space, Line, Numeric, Escape, Eof,
    ];

    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Space | Line)
    }

    fn describe(self) -> &'static str {
        match self {
            TagOpen => "tag opener",
            TagClose => "tag closer",
            Slash => "`/`",
            Equal => "`=`",
            Quote => "`\"`",
            Text => "text",
            Space => "space",
            Line => "line break",
            Numeric => "number",
            Escape => "escape",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A located token. `value` is the exact source text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            value: value.into(),
            location,
        }
    }

    pub fn eof(location: Location) -> Self {
        Self::new(Eof, "", location)
    }

    /// The text this token contributes to a Text or String node.
    ///
    /// An escape contributes only the escaped character, everything else its
    /// full value.
    pub fn content(&self) -> &str {
        match self.kind {
            Escape => self.value.strip_prefix('\\').unwrap_or(self.value.as_str()),
            _ => &self.value,
        }
    }

    /// The escaped character, for escape tokens.
    pub fn escaped(&self) -> Option<char> {
        match self.kind {
            Escape => self.content().chars().next(),
            _ => None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Bitset of `TokenKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u16);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    #[inline]
    pub const fn new(kinds: &[TokenKind]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << kinds[i] as u8;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        TokenSet(1 << kind as u8)
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// Tokens allowed inside a Text node.
    pub const TEXT: TokenSet =
        TokenSet::new(&[Text, Space, Line, Numeric, Escape, Quote, Equal, Slash]);

    /// Tokens allowed inside a quoted String, besides the closing quote.
    pub const STRING: TokenSet = TokenSet::new(&[
        Text, Space, Line, Numeric, Escape, Equal, Slash, TagOpen, TagClose,
    ]);

    /// Bare (unquoted) attribute values.
    pub const BARE_VALUE: TokenSet = TokenSet::new(&[Text, Numeric]);

    pub const TRIVIA: TokenSet = TokenSet::new(&[Space, Line]);

    /// FIRST set of a document element.
    pub const ELEMENT_FIRST: TokenSet = TEXT.union(TokenSet::single(TagOpen));

    /// What may follow a tag name or argument.
    pub const TAG_TAIL: TokenSet = TokenSet::new(&[Text, Slash, TagClose]);

    pub const ATTRIBUTE_VALUE: TokenSet = BARE_VALUE.union(TokenSet::single(Quote));
}
