//! BBCode output for forum posts, colored from a theme.

use crate::error::FormatError;
use crate::formatter::{Formatter, FormatterClass};
use crate::options::{OptionDecl, OptionStore, SchemaBuilder};
use crate::token::Token;
use shall_theme::{Style, Theme, TokenKind, builtin};
use std::collections::HashMap;

pub static BBCODE: FormatterClass = FormatterClass {
    name: "bbcode",
    description: "tokens formatted with bbcode tags, for forum posts",
    aliases: &["bb"],
    options: bbcode_options,
    create: create_bbcode,
};

fn bbcode_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder.declare(OptionDecl::theme("theme", Some("monokai"), "the theme to use"))
}

fn create_bbcode(options: OptionStore) -> Box<dyn Formatter> {
    Box::new(BbcodeFormatter {
        options,
        tags: HashMap::new(),
    })
}

struct BbcodeFormatter {
    options: OptionStore,
    /// Opening and closing tags per kind, built when the document starts.
    tags: HashMap<TokenKind, (String, String)>,
}

fn tags_for(style: &Style) -> (String, String) {
    let mut open = String::new();
    let mut close = String::new();
    if style.modifiers.bold {
        open.push_str("[b]");
    }
    if style.modifiers.italic {
        open.push_str("[i]");
    }
    if let Some(fg) = style.fg {
        open.push_str(&format!("[color={}]", fg.to_hex()));
        close.push_str("[/color]");
    }
    if style.modifiers.italic {
        close.push_str("[/i]");
    }
    if style.modifiers.bold {
        close.push_str("[/b]");
    }
    (open, close)
}

impl Formatter for BbcodeFormatter {
    fn class(&self) -> &'static FormatterClass {
        &BBCODE
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn start_document(&mut self, _out: &mut String) -> Result<(), FormatError> {
        let fallback;
        let theme: &Theme = match self.options.theme("theme") {
            Some(theme) => theme,
            None => {
                fallback = builtin::monokai();
                &fallback
            }
        };
        self.tags = TokenKind::ALL
            .iter()
            .filter_map(|&kind| {
                let (open, close) = tags_for(theme.style(kind)?);
                (!open.is_empty()).then_some((kind, (open, close)))
            })
            .collect();
        Ok(())
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        if let Some((open, _)) = self.tags.get(&kind) {
            out.push_str(open);
        }
        Ok(())
    }

    fn end_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        if let Some((_, close)) = self.tags.get(&kind) {
            out.push_str(close);
        }
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        out.push_str(token.text);
        Ok(())
    }
}
