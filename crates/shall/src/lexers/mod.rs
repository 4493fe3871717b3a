//! Builtin lexers.
//!
//! Each language is a [`Grammar`](shall_highlight::Grammar) driven by the
//! shared state machine, plus a static [`LexerClass`] describing it. Most
//! are behind a `lang-*` feature; `text` and `diff` are always present.

use shall_highlight::LexerClass;

#[cfg(feature = "lang-c")]
pub mod c;
pub mod diff;
#[cfg(feature = "lang-json")]
pub mod json;
#[cfg(feature = "lang-markup")]
pub mod markup;
#[cfg(feature = "lang-php")]
pub mod php;
pub mod template;
pub mod text;

/// Builtin lexer classes, in registration order.
///
/// Lookups that can match several lexers (interpreters, MIME types) pick
/// the first one, so more general lexers come last.
pub fn builtin() -> Vec<&'static LexerClass> {
    let mut classes: Vec<&'static LexerClass> = Vec::new();
    #[cfg(feature = "lang-php")]
    classes.push(&php::PHP);
    #[cfg(feature = "lang-c")]
    classes.push(&c::C);
    #[cfg(feature = "lang-json")]
    classes.push(&json::JSON);
    #[cfg(feature = "lang-markup")]
    {
        classes.push(&markup::HTML);
        classes.push(&markup::XML);
    }
    classes.push(&diff::DIFF);
    classes.push(&text::TEXT);
    classes
}

/// True for characters that may start an identifier in C-like languages.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}
