//! XML tree output: `<shall><token type="KEYWORD">fn</token>...</shall>`.

use super::push_html_escaped;
use crate::error::FormatError;
use crate::formatter::{Formatter, FormatterClass};
use crate::options::{OptionDecl, OptionStore, OptionValue, SchemaBuilder};
use crate::token::Token;
use shall_theme::TokenKind;

pub static XML: FormatterClass = FormatterClass {
    name: "xml",
    description: "tokens as an XML tree",
    aliases: &[],
    options: xml_options,
    create: create_xml,
};

/// Element names: a letter or `_`, then letters, digits, `_`, `-` or `.`.
fn valid_element_name(value: &OptionValue) -> Result<(), String> {
    let Some(name) = value.as_str() else {
        return Ok(());
    };
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        Ok(())
    } else {
        Err(format!("`{name}` is not an XML element name"))
    }
}

fn xml_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder.declare(
        OptionDecl::string("root", "shall", "name of the root element")
            .with_validator(valid_element_name),
    )
}

fn create_xml(options: OptionStore) -> Box<dyn Formatter> {
    Box::new(XmlFormatter { options })
}

struct XmlFormatter {
    options: OptionStore,
}

impl XmlFormatter {
    fn root(&self) -> &str {
        self.options.str("root").unwrap_or("shall")
    }
}

impl Formatter for XmlFormatter {
    fn class(&self) -> &'static FormatterClass {
        &XML
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn start_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        out.push('<');
        out.push_str(self.root());
        out.push('>');
        Ok(())
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        out.push_str("<token type=\"");
        out.push_str(kind.name());
        out.push_str("\">");
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        push_html_escaped(out, token.text);
        Ok(())
    }

    fn end_token(&mut self, _kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        out.push_str("</token>");
        Ok(())
    }

    fn end_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        out.push_str("</");
        out.push_str(self.root());
        out.push('>');
        Ok(())
    }
}
