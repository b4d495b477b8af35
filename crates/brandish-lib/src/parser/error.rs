use brandish_core::Location;

use crate::scanner::{TokenKind, TokenSet};

/// Errors raised while parsing. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{location}: unexpected {found}, expected one of: {expected}")]
    UnexpectedToken {
        found: TokenKind,
        expected: TokenSet,
        location: Location,
    },

    #[error("{location}: closing tag `{found}` does not match opening tag `{expected}`")]
    MismatchedTag {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("{location}: tags nested too deeply")]
    RecursionLimitExceeded { location: Location },

    #[error(transparent)]
    Node(#[from] NodeError),
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            Self::UnexpectedToken { location, .. }
            | Self::MismatchedTag { location, .. }
            | Self::RecursionLimitExceeded { location } => location,
            Self::Node(error) => error.location(),
        }
    }
}

/// Errors raised by node construction, update and flattening.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("{location}: cannot update `{field}` on a {variant} node")]
    UnknownField {
        field: &'static str,
        variant: &'static str,
        location: Location,
    },

    #[error("{location}: {variant} node is update-prevented")]
    UpdatePrevented {
        variant: &'static str,
        location: Location,
    },

    #[error("{location}: unexpected {found} node, expected {expected}")]
    UnexpectedNode {
        found: &'static str,
        expected: &'static str,
        location: Location,
    },

    #[error("{location}: {kind} is not allowed in a {variant} node")]
    InvalidToken {
        kind: TokenKind,
        variant: &'static str,
        location: Location,
    },

    #[error("{location}: cannot build a {variant} node from no tokens")]
    Empty {
        variant: &'static str,
        location: Location,
    },
}

impl NodeError {
    pub fn location(&self) -> &Location {
        match self {
            Self::UnknownField { location, .. }
            | Self::UpdatePrevented { location, .. }
            | Self::UnexpectedNode { location, .. }
            | Self::InvalidToken { location, .. }
            | Self::Empty { location, .. } => location,
        }
    }
}
