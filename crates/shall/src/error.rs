use shall_highlight::{HighlightError, OptionError};

/// Errors raised by registry lookups and the high-level highlighters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No lexer answers to the name, file name, MIME type or content.
    #[error("no lexer found for {query}")]
    LexerNotFound { query: String },

    /// Several lexers claim the file name with equally specific patterns.
    #[error("file name `{filename}` matches several lexers: {}", .candidates.join(", "))]
    AmbiguousLexer {
        filename: String,
        candidates: Vec<&'static str>,
    },

    #[error("no formatter named `{name}`")]
    FormatterNotFound { name: String },

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Highlight(#[from] HighlightError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Error {
    pub(crate) fn not_found(query: impl Into<String>) -> Self {
        Self::LexerNotFound {
            query: query.into(),
        }
    }
}

/// Errors raised while building a [`Registry`](crate::Registry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A class declares the same option twice with different types.
    #[error("invalid option schema: {0}")]
    Schema(#[from] OptionError),

    #[error("invalid pattern `{pattern}` in {owner}: {source}")]
    Pattern {
        owner: &'static str,
        pattern: &'static str,
        source: regex::Error,
    },

    /// Two lexers (or two formatters) share a name or alias.
    #[error("`{name}` is registered by both {first} and {second}")]
    Duplicate {
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
}
