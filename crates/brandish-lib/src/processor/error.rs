use std::fmt;

use brandish_core::Location;

/// What went wrong while running a pass over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildErrorKind {
    /// A hook failed; also used for errors re-tagged with the node's location.
    Hook,
    /// A block or command survived to the `verify` pass.
    Verification,
    /// A node carried attribute pairs the pass does not allow.
    Pair,
    /// A node was missing a pair its pass requires.
    Syntax,
    /// The same root was accepted twice under `ReentryPolicy::Forbid`.
    Reentry,
}

impl fmt::Display for BuildErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hook => "hook",
            Self::Verification => "verification",
            Self::Pair => "pair",
            Self::Syntax => "syntax",
            Self::Reentry => "reentry",
        })
    }
}

/// Failure raised while processing a document, tagged with the offending
/// node's location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {message}")]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub message: String,
    pub location: Location,
}

impl BuildError {
    pub fn new(kind: BuildErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn hook(message: impl Into<String>, location: Location) -> Self {
        Self::new(BuildErrorKind::Hook, message, location)
    }

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::new(BuildErrorKind::Syntax, message, location)
    }
}

/// Setup-time failures. These happen before any document is touched, so they
/// carry no location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessorError {
    #[error("pass `{format}:{name}` is already registered")]
    Duplicate { format: String, name: String },

    #[error("no pass registered as `{format}:{name}`")]
    Unknown { format: String, name: String },

    #[error("invalid option `{option}` for pass `{pass}`: {reason}")]
    InvalidOption {
        pass: String,
        option: String,
        reason: String,
    },

    #[error("invalid pass reference `{0}`")]
    InvalidReference(String),
}
