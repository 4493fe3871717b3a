//! HTML output.
//!
//! Two markup styles, selected by `tag_style`:
//!
//! - `class` (default): `<span class="k">fn</span>`, with `prefix` prepended
//!   to the class (`prefix = "shall-"` gives `<span class="shall-k">`);
//! - `custom`: compact custom elements, `<a-k>fn</a-k>`, where `prefix`
//!   replaces the `a` (`prefix = "code"` gives `<code-k>`).
//!
//! Kinds without a CSS class (plain text, whitespace) are written bare.

use super::push_html_escaped;
use crate::error::FormatError;
use crate::formatter::{Formatter, FormatterClass};
use crate::options::{OptionDecl, OptionStore, OptionValue, SchemaBuilder};
use crate::token::Token;
use shall_theme::TokenKind;

pub static HTML: FormatterClass = FormatterClass {
    name: "html",
    description: "tokens as <span> tags within a <pre> tag",
    aliases: &["htm"],
    options: html_options,
    create: create_html,
};

const TAG_STYLES: &[&str] = &["class", "custom"];

fn non_negative(value: &OptionValue) -> Result<(), String> {
    match value.as_int() {
        Some(n) if n < 0 => Err(format!("{n} is negative")),
        _ => Ok(()),
    }
}

fn html_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder
        .declare(OptionDecl::string(
            "cssclass",
            "",
            "if set to `foo`, ` class=\"foo\"` is added to the <pre> tag",
        ))
        .declare(OptionDecl::choice(
            "tag_style",
            TAG_STYLES,
            "class",
            "`class` for <span class=..>, `custom` for custom elements",
        ))
        .declare(OptionDecl::string(
            "prefix",
            "",
            "prepended to CSS classes, or replaces `a` in custom element names",
        ))
        .declare(OptionDecl::boolean("linenos", false, "number the lines"))
        .declare(
            OptionDecl::integer("linestart", 1, "number of the first line")
                .with_validator(non_negative),
        )
}

fn create_html(options: OptionStore) -> Box<dyn Formatter> {
    Box::new(HtmlFormatter {
        options,
        line: 0,
        at_line_start: false,
    })
}

struct HtmlFormatter {
    options: OptionStore,
    /// Next line number, when numbering.
    line: i64,
    /// A line number is due before the next character.
    at_line_start: bool,
}

impl HtmlFormatter {
    fn custom_elements(&self) -> bool {
        self.options.str("tag_style") == Some("custom")
    }

    fn prefix(&self) -> &str {
        self.options.str("prefix").unwrap_or_default()
    }

    /// Opening and closing tags for a CSS class.
    fn tags(&self, class: &str) -> (String, String) {
        let prefix = self.prefix();
        if self.custom_elements() {
            let element = if prefix.is_empty() { "a" } else { prefix };
            (format!("<{element}-{class}>"), format!("</{element}-{class}>"))
        } else {
            (
                format!("<span class=\"{prefix}{class}\">"),
                "</span>".to_string(),
            )
        }
    }

    fn push_line_number(&mut self, out: &mut String) {
        let (open, close) = self.tags("ln");
        out.push_str(&open);
        out.push_str(&self.line.to_string());
        out.push_str(&close);
        self.line += 1;
        self.at_line_start = false;
    }
}

impl Formatter for HtmlFormatter {
    fn class(&self) -> &'static FormatterClass {
        &HTML
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn start_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        match self.options.str("cssclass") {
            Some(class) if !class.is_empty() => {
                out.push_str("<pre class=\"");
                push_html_escaped(out, class);
                out.push_str("\">");
            }
            _ => out.push_str("<pre>"),
        }
        self.line = self.options.int("linestart").unwrap_or(1);
        self.at_line_start = self.options.flag("linenos");
        Ok(())
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        let class = kind.css_class();
        if !class.is_empty() {
            out.push_str(&self.tags(class).0);
        }
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        if !self.options.flag("linenos") {
            push_html_escaped(out, token.text);
            return Ok(());
        }
        for line in token.text.split_inclusive('\n') {
            if self.at_line_start {
                self.push_line_number(out);
            }
            push_html_escaped(out, line);
            self.at_line_start = line.ends_with('\n');
        }
        Ok(())
    }

    fn end_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        let class = kind.css_class();
        if !class.is_empty() {
            out.push_str(&self.tags(class).1);
        }
        Ok(())
    }

    fn end_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        out.push_str("</pre>");
        Ok(())
    }
}
