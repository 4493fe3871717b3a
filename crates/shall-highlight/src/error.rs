use crate::options::OptionType;
use std::fmt;

/// Errors raised by option declarations and option stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    /// The option is not declared by the lexer or formatter.
    #[error("unknown option `{name}` for {owner}")]
    UnknownOption { owner: &'static str, name: String },

    /// The value failed coercion or validation. The previous value is kept.
    #[error("invalid value for option `{name}` of {owner}: {reason}")]
    InvalidOptionValue {
        owner: &'static str,
        name: String,
        reason: String,
    },

    /// An option was re-declared with a different type.
    #[error("option `{name}` of {owner} re-declared as {new} (previously {previous})")]
    ConflictingDeclaration {
        owner: &'static str,
        name: &'static str,
        previous: OptionType,
        new: OptionType,
    },
}

impl OptionError {
    /// Name of the lexer or formatter the error relates to.
    pub fn owner(&self) -> &'static str {
        match self {
            Self::UnknownOption { owner, .. }
            | Self::InvalidOptionValue { owner, .. }
            | Self::ConflictingDeclaration { owner, .. } => owner,
        }
    }
}

/// Errors raised by formatter hooks.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error(transparent)]
    Fmt(#[from] fmt::Error),

    #[error("{formatter}: {message}")]
    Custom {
        formatter: &'static str,
        message: String,
    },
}

/// Errors raised while highlighting.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("formatter failed: {0}")]
    Format(#[from] FormatError),

    /// A formatter hook was called out of order.
    #[error("formatter lifecycle violation: {hook} called while {state}")]
    Lifecycle {
        hook: &'static str,
        state: &'static str,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Something a lexer recovered from while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Input ended inside an open construct (unterminated string, comment...).
    /// `depth` states were implicitly popped.
    MalformedInput {
        lexer: &'static str,
        offset: usize,
        depth: usize,
    },

    /// The lexer stopped making progress and one character was forced out as
    /// an `ERROR` token.
    Stalled { lexer: &'static str, offset: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput {
                lexer,
                offset,
                depth,
            } => write!(
                f,
                "{lexer}: input ended at byte {offset} with {depth} unclosed state(s)"
            ),
            Self::Stalled { lexer, offset } => {
                write!(f, "{lexer}: no progress at byte {offset}")
            }
        }
    }
}
