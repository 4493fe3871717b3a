//! RTF output, colored from a theme.
//!
//! The color table is built from the theme when the document starts; each
//! styled token becomes a `{\b\i\ul\cbN\cfN text}` group.

use crate::error::FormatError;
use crate::formatter::{Formatter, FormatterClass};
use crate::options::{OptionDecl, OptionStore, SchemaBuilder};
use crate::token::Token;
use shall_theme::{Color, Style, Theme, TokenKind, builtin};
use std::collections::HashMap;

pub static RTF: FormatterClass = FormatterClass {
    name: "rtf",
    description: "tokens as a Rich Text Format document, for word processors",
    aliases: &[],
    options: rtf_options,
    create: create_rtf,
};

const HEADER: &str = "{\\rtf1\\ansi\\uc0\\deff0{\\fonttbl{\\f0\\fmodern\\fprq1\\fcharset0;}}";

fn rtf_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder.declare(OptionDecl::theme("theme", Some("monokai"), "the theme to use"))
}

fn create_rtf(options: OptionStore) -> Box<dyn Formatter> {
    Box::new(RtfFormatter {
        options,
        groups: HashMap::new(),
    })
}

struct RtfFormatter {
    options: OptionStore,
    /// Group opening per styled kind, built when the document starts.
    groups: HashMap<TokenKind, String>,
}

/// Indexes into `\colortbl`; entry 0 is the default color.
#[derive(Default)]
struct ColorTable {
    indexes: HashMap<Color, usize>,
    entries: String,
}

impl ColorTable {
    fn index(&mut self, color: Color) -> usize {
        if let Some(&index) = self.indexes.get(&color) {
            return index;
        }
        let index = self.indexes.len() + 1;
        self.indexes.insert(color, index);
        self.entries
            .push_str(&format!("\\red{}\\green{}\\blue{};", color.r, color.g, color.b));
        index
    }
}

fn group_for(style: &Style, colors: &mut ColorTable) -> String {
    let mut group = String::from("{");
    if style.modifiers.bold {
        group.push_str("\\b");
    }
    if style.modifiers.italic {
        group.push_str("\\i");
    }
    if style.modifiers.underline {
        group.push_str("\\ul");
    }
    if let Some(bg) = style.bg {
        group.push_str(&format!("\\cb{}", colors.index(bg)));
    }
    if let Some(fg) = style.fg {
        group.push_str(&format!("\\cf{}", colors.index(fg)));
    }
    group.push(' ');
    group
}

fn push_rtf_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\par\n"),
            '\r' => {}
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // \u takes a signed 16-bit value.
                    out.push_str(&format!("\\u{} ", *unit as i16));
                }
            }
        }
    }
}

impl Formatter for RtfFormatter {
    fn class(&self) -> &'static FormatterClass {
        &RTF
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn start_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        let fallback;
        let theme: &Theme = match self.options.theme("theme") {
            Some(theme) => theme,
            None => {
                fallback = builtin::monokai();
                &fallback
            }
        };
        let mut colors = ColorTable::default();
        self.groups = TokenKind::ALL
            .iter()
            .filter_map(|&kind| {
                let style = theme.style(kind).filter(|style| !style.is_empty())?;
                Some((kind, group_for(style, &mut colors)))
            })
            .collect();
        out.push_str(HEADER);
        out.push_str("{\\colortbl;");
        out.push_str(&colors.entries);
        out.push_str("}\\f0 ");
        Ok(())
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        if let Some(group) = self.groups.get(&kind) {
            out.push_str(group);
        }
        Ok(())
    }

    fn end_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        if self.groups.contains_key(&kind) {
            out.push('}');
        }
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        push_rtf_escaped(out, token.text);
        Ok(())
    }

    fn end_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        out.push('}');
        Ok(())
    }
}
