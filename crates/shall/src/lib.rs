//! Shall - syntax highlighting with pluggable lexers and formatters
//!
//! This crate provides:
//! - A [`Registry`] of lexer and formatter classes, with lookup by name,
//!   file name, MIME type and interpreter, and guessing from content
//! - The builtin lexers ([`lexers`]), selected with feature flags
//! - The [`Highlighter`] and [`AnsiHighlighter`] facades
//!
//! # Usage
//!
//! Enable the languages you need via feature flags:
//!
//! ```toml
//! [dependencies]
//! shall = { version = "0.1", default-features = false, features = ["lang-c", "lang-json"] }
//! ```
//!
//! `text` and `diff` are always available.
//!
//! # Example
//!
//! ```rust,ignore
//! use shall::Highlighter;
//!
//! let hl = Highlighter::new()?;
//! let html = hl.highlight("c", "int main(void) { return 0; }")?;
//!
//! // Options ride along with the lexer name.
//! let html = hl.highlight("php?start_inline&secondary=html", "echo 1;")?;
//! ```
//!
//! Lower level, the registry hands out configured lexers and formatters which
//! [`highlight::highlight`] wires together:
//!
//! ```rust,ignore
//! use shall::{Registry, highlight::OptionValue};
//!
//! let registry = Registry::builtin()?;
//! let lexer = registry.lexer_guess(&source, Some("index.php"), [])?;
//! let mut formatter = registry.new_formatter("html", [("linenos", OptionValue::from(true))])?;
//! let html = shall::highlight::highlight(&source, lexer.as_ref(), formatter.as_mut())?;
//! ```

pub use shall_highlight as highlight;
pub use shall_theme as theme;

pub mod error;
mod glob;
pub mod highlighter;
pub mod lexers;
pub mod registry;

pub use error::{Error, RegistryError};
pub use highlighter::{AnsiHighlighter, Config, Highlighter};
pub use registry::{FormatterEntry, LexerEntry, Registry, RegistryBuilder, split_query};
pub use shall_highlight::{
    Diagnostic, Formatter, FormatterClass, HighlightConfig, Lexer, LexerClass, OptionValue,
    Token,
};
pub use shall_theme::{Theme, TokenKind};
