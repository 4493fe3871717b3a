//! Lexer and formatter engine for shall.
//!
//! This crate holds everything a syntax highlighter needs apart from the
//! languages themselves:
//!
//! - **Options** ([`options`]): typed, validated settings declared once per
//!   lexer or formatter class and stored per instance.
//! - **Lexers** ([`lexer`]): the object-safe [`Lexer`] handle, and the
//!   [`Grammar`] + [`Machine`] pair that turns a small state machine into a
//!   lexer which always covers its input, always terminates, and can hand
//!   embedded spans to a secondary lexer.
//! - **Formatters** ([`formatter`]): the document/token lifecycle, with a
//!   base implementation for every hook.
//! - **Builtin formatters** ([`render`]): HTML, terminal, plain, XML and BBCode.
//!
//! Languages and the registry that finds them live in the `shall` crate.
//!
//! # Highlighting
//!
//! [`highlight`] wires one lexer and one formatter over a source text:
//!
//! ```text
//! start_document
//! for each token: start_token, write_token, end_token
//! end_document
//! ```
//!
//! and returns the concatenated fragments. With
//! [`HighlightConfig::coalesce_runs`], consecutive tokens of the same kind
//! share one `start_token`/`end_token` pair, which gives less markup.
//!
//! ```rust,ignore
//! use shall_highlight::{highlight, render::HTML};
//!
//! let lexer = shall::Registry::builtin()?.lexer_by_name("c", [])?;
//! let mut formatter = HTML.new_formatter()?;
//! let html = highlight("int x = 1;", lexer.as_ref(), formatter.as_mut())?;
//! ```
//!
//! # Streaming
//!
//! [`highlight_to_writer`] flushes the output as it goes instead of
//! building the whole document in memory.

pub mod error;
pub mod formatter;
pub mod lexer;
pub mod options;
pub mod render;
mod token;

pub use error::{Diagnostic, FormatError, HighlightError, OptionError};
pub use formatter::{Formatter, FormatterClass, Phase, Session};
pub use lexer::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, Machine, SECONDARY, StateStack, Step,
    TokenCursor, Tokens, no_options,
};
pub use options::{
    NoResolver, OptionDecl, OptionDefault, OptionSchema, OptionStore, OptionType, OptionValue,
    Resolver, SchemaBuilder,
};
pub use render::html_escape;
pub use shall_theme::{Theme, TokenKind};
pub use token::Token;

use std::io::Write;

/// Output buffered by [`highlight_to_writer`] before it is written out.
const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Configuration for highlighting.
#[derive(Debug, Clone, Default)]
pub struct HighlightConfig {
    /// Wrap runs of same-kind tokens in a single `start_token`/`end_token`
    /// pair instead of one pair per token.
    pub coalesce_runs: bool,
}

/// Result of a highlight run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub output: String,
    /// What the lexers recovered from (unterminated strings, stalls...).
    pub diagnostics: Vec<Diagnostic>,
}

/// Render `source` with `lexer` and `formatter`, one token at a time.
pub fn highlight(
    source: &str,
    lexer: &dyn Lexer,
    formatter: &mut dyn Formatter,
) -> Result<String, HighlightError> {
    highlight_with_config(source, lexer, formatter, &HighlightConfig::default())
        .map(|highlighted| highlighted.output)
}

/// Render `source` and report lexer diagnostics alongside the output.
pub fn highlight_with_config(
    source: &str,
    lexer: &dyn Lexer,
    formatter: &mut dyn Formatter,
    config: &HighlightConfig,
) -> Result<Highlighted, HighlightError> {
    let mut output = String::with_capacity(source.len() * 2);
    let (diagnostics, rest) = drive(source, lexer, formatter, config, |session| {
        output.push_str(&session.take_output());
        Ok(())
    })?;
    output.push_str(&rest);
    Ok(Highlighted {
        output,
        diagnostics,
    })
}

/// Render `source` into `w`, flushing as output accumulates.
pub fn highlight_to_writer<W: Write>(
    w: &mut W,
    source: &str,
    lexer: &dyn Lexer,
    formatter: &mut dyn Formatter,
    config: &HighlightConfig,
) -> Result<Vec<Diagnostic>, HighlightError> {
    let (diagnostics, rest) = drive(source, lexer, formatter, config, |session| {
        if session.pending().len() >= FLUSH_THRESHOLD {
            w.write_all(session.take_output().as_bytes())?;
        }
        Ok(())
    })?;
    w.write_all(rest.as_bytes())?;
    w.flush()?;
    Ok(diagnostics)
}

/// Run the lifecycle. `sink` sees the session after every token; the output
/// it has not taken is returned with the diagnostics.
fn drive(
    source: &str,
    lexer: &dyn Lexer,
    formatter: &mut dyn Formatter,
    config: &HighlightConfig,
    mut sink: impl FnMut(&mut Session<'_>) -> Result<(), HighlightError>,
) -> Result<(Vec<Diagnostic>, String), HighlightError> {
    tracing::debug!(
        lexer = lexer.name(),
        formatter = formatter.name(),
        len = source.len(),
        coalesce = config.coalesce_runs,
        "highlighting"
    );

    let mut session = Session::new(formatter);
    session.start_document()?;

    let mut tokens = lexer.tokenize(source);
    let mut open: Option<TokenKind> = None;
    for token in tokens.by_ref() {
        if config.coalesce_runs {
            if open != Some(token.kind) {
                if open.is_some() {
                    session.end_token()?;
                }
                session.start_token(token.kind)?;
                open = Some(token.kind);
            }
            session.write_token(&token)?;
        } else {
            session.token(&token)?;
        }
        sink(&mut session)?;
    }
    if open.is_some() {
        session.end_token()?;
    }
    session.end_document()?;

    let diagnostics = tokens.diagnostics();
    for diagnostic in &diagnostics {
        tracing::debug!(%diagnostic, "lexer recovered");
    }
    Ok((diagnostics, session.finish()?))
}
