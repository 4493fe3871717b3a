//! One line per token: `KEYWORD: "fn"`. Meant for tests and debugging.

use crate::error::FormatError;
use crate::formatter::{Formatter, FormatterClass};
use crate::lexer::no_options;
use crate::options::OptionStore;
use crate::token::Token;
use shall_theme::TokenKind;
use std::fmt::Write;

pub static PLAIN: FormatterClass = FormatterClass {
    name: "plain",
    description: "each token on its own line as `TOKEN_NAME: \"text\"`, mostly for tests",
    aliases: &["raw", "tokens"],
    options: no_options,
    create: create_plain,
};

fn create_plain(options: OptionStore) -> Box<dyn Formatter> {
    Box::new(PlainFormatter { options })
}

struct PlainFormatter {
    options: OptionStore,
}

/// Quote `text`, escaping quotes, backslashes and control characters.
fn push_quoted(out: &mut String, text: &str) -> std::fmt::Result {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => write!(out, "\\x{:02X}", u32::from(c))?,
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

impl Formatter for PlainFormatter {
    fn class(&self) -> &'static FormatterClass {
        &PLAIN
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        out.push_str(kind.name());
        out.push_str(": ");
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        push_quoted(out, token.text)?;
        Ok(())
    }

    fn end_token(&mut self, _kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        out.push('\n');
        Ok(())
    }
}
