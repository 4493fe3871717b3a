//! ANSI terminal output.
//!
//! Without a theme, kinds map to the classic 16-color palette. With one,
//! styles are rendered as 24-bit sequences and the theme's foreground and
//! background apply to the whole document.
//!
//! Tabs are expanded to `tab_width` columns. When `width` is positive (or
//! `-1` and a terminal size can be detected), long lines are hard wrapped
//! and the active style is re-applied on the continuation line.

use crate::error::FormatError;
use crate::formatter::{Formatter, FormatterClass};
use crate::options::{OptionDecl, OptionStore, OptionValue, SchemaBuilder};
use crate::token::Token;
use shall_theme::{Theme, TokenKind};

#[cfg(feature = "unicode-width")]
use unicode_width::UnicodeWidthChar;

pub static TERMINAL: FormatterClass = FormatterClass {
    name: "terminal",
    description: "tokens with ANSI color sequences, for output in a text console",
    aliases: &["term", "console", "ansi"],
    options: terminal_options,
    create: create_terminal,
};

/// Narrowest wrap width honoured; anything below is raised to this.
const MIN_CONTENT_WIDTH: usize = 10;

/// Widest tab stop accepted for `tab_width`.
const MAX_TAB_WIDTH: i64 = 64;

/// Reset used with the classic palette.
const CLASSIC_RESET: &str = "\x1b[39;49;00m";

fn check_tab_width(value: &OptionValue) -> Result<(), String> {
    match value.as_int() {
        Some(n) if n < 0 => Err(format!("{n} is negative")),
        Some(n) if n > MAX_TAB_WIDTH => Err(format!("{n} is wider than {MAX_TAB_WIDTH}")),
        _ => Ok(()),
    }
}

fn check_width(value: &OptionValue) -> Result<(), String> {
    match value.as_int() {
        Some(n) if n < -1 => Err(format!("{n} is neither a width nor -1")),
        _ => Ok(()),
    }
}

fn terminal_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder
        .declare(OptionDecl::theme(
            "theme",
            None,
            "24-bit colors from this theme instead of the 16-color palette",
        ))
        .declare(
            OptionDecl::integer("tab_width", 4, "columns per tab stop, 0 keeps tabs as is")
                .with_validator(check_tab_width),
        )
        .declare(
            OptionDecl::integer(
                "width",
                0,
                "wrap lines at this many columns: 0 never wraps, -1 uses the terminal width",
            )
            .with_validator(check_width),
        )
}

fn create_terminal(options: OptionStore) -> Box<dyn Formatter> {
    Box::new(TerminalFormatter {
        options,
        wrap: None,
        tab_width: 4,
        column: 0,
        active: String::new(),
        base: String::new(),
    })
}

/// Sequence for `kind` in the classic palette.
fn classic_sequence(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        NameBuiltin | NameAttribute | KeywordType => "\x1b[36m",
        NameTag => "\x1b[36;01m",
        NameVariable | NameVariableClass | NameVariableGlobal | NameVariableInstance => {
            "\x1b[31m"
        }
        NameFunction => "\x1b[32m",
        NameClass | NameNamespace => "\x1b[32;04m",
        Keyword | KeywordDeclaration => "\x1b[34m",
        Operator => "\x1b[35m",
        Number | NumberFloat | NumberDecimal | NumberBinary | NumberOctal
        | NumberHexadecimal => "\x1b[34m",
        Comment | CommentSingle | CommentMultiline | CommentDocumentation => "\x1b[37m",
        String | StringSingle | StringDouble | StringBacktick | StringInterned | StringRegex => {
            "\x1b[33m"
        }
        StringEscape => "\x1b[30;01;01m",
        StringInterpolated => "\x1b[30;01m",
        Literal | LiteralSize | LiteralDuration => "\x1b[34m",
        GenericHeading | GenericSubheading => "\x1b[37;01;01m",
        GenericInserted => "\x1b[34m",
        GenericDeleted => "\x1b[31m",
        Error => "\x1b[31;01m",
        _ => "",
    }
}

fn detect_terminal_width() -> Option<usize> {
    #[cfg(all(feature = "terminal-size", not(target_arch = "wasm32")))]
    {
        use terminal_size::{Width, terminal_size};
        if let Some((Width(w), _)) = terminal_size() {
            Some(w as usize)
        } else {
            None
        }
    }
    #[cfg(any(not(feature = "terminal-size"), target_arch = "wasm32"))]
    {
        None
    }
}

#[cfg(feature = "unicode-width")]
fn char_display_width(c: char, col: usize, tab_width: usize) -> usize {
    if c == '\t' && tab_width > 0 {
        let next_tab = ((col / tab_width) + 1) * tab_width;
        next_tab - col
    } else {
        UnicodeWidthChar::width(c).unwrap_or(0)
    }
}

#[cfg(not(feature = "unicode-width"))]
fn char_display_width(c: char, col: usize, tab_width: usize) -> usize {
    if c == '\t' && tab_width > 0 {
        let next_tab = ((col / tab_width) + 1) * tab_width;
        next_tab - col
    } else {
        1
    }
}

struct TerminalFormatter {
    options: OptionStore,
    /// Wrap column for this document.
    wrap: Option<usize>,
    tab_width: usize,
    /// Display column of the cursor.
    column: usize,
    /// Sequence of the open token, re-emitted after a wrap.
    active: String,
    /// Document style of the theme, if any.
    base: String,
}

impl TerminalFormatter {
    fn theme(&self) -> Option<&Theme> {
        self.options.theme("theme")
    }

    fn reset(&self) -> &'static str {
        if self.theme().is_some() {
            Theme::ANSI_RESET
        } else {
            CLASSIC_RESET
        }
    }

    /// Break the line, keeping the current styling on the next one.
    fn break_line(&mut self, out: &mut String) {
        let styled = !self.base.is_empty() || !self.active.is_empty();
        if styled {
            // the background must not extend to the terminal edge
            out.push_str(self.reset());
        }
        out.push('\n');
        out.push_str(&self.base);
        out.push_str(&self.active);
        self.column = 0;
    }

    fn push_text(&mut self, text: &str, out: &mut String) {
        for ch in text.chars() {
            if ch == '\n' {
                self.break_line(out);
                continue;
            }
            if ch == '\r' {
                out.push(ch);
                self.column = 0;
                continue;
            }

            let w = char_display_width(ch, self.column, self.tab_width);
            if let Some(width) = self.wrap {
                if w > 0 && self.column > 0 && self.column + w > width {
                    self.break_line(out);
                }
            }
            if ch == '\t' && self.tab_width > 0 {
                // recomputed: a wrap moves the tab to column 0
                let w = char_display_width(ch, self.column, self.tab_width);
                out.extend(std::iter::repeat_n(' ', w));
                self.column += w;
            } else {
                out.push(ch);
                self.column += w;
            }
        }
    }
}

impl Formatter for TerminalFormatter {
    fn class(&self) -> &'static FormatterClass {
        &TERMINAL
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn start_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        self.tab_width = self
            .options
            .int("tab_width")
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(4);
        self.wrap = match self.options.int("width") {
            Some(-1) => detect_terminal_width(),
            Some(n) if n > 0 => usize::try_from(n).ok(),
            _ => None,
        }
        .map(|w| w.max(MIN_CONTENT_WIDTH));
        self.column = 0;
        self.active.clear();
        self.base = self
            .theme()
            .map(Theme::ansi_base_style)
            .unwrap_or_default();
        out.push_str(&self.base);
        Ok(())
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        self.active = match self.theme() {
            Some(theme) => theme.ansi_style(kind),
            None => classic_sequence(kind).to_string(),
        };
        out.push_str(&self.active);
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        self.push_text(token.text, out);
        Ok(())
    }

    fn end_token(&mut self, _kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        if !self.active.is_empty() {
            out.push_str(self.reset());
            out.push_str(&self.base);
            self.active.clear();
        }
        Ok(())
    }

    fn end_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        if !self.base.is_empty() {
            out.push_str(Theme::ANSI_RESET);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::Session;
    use shall_theme::builtin;

    fn render(formatter: &mut dyn Formatter, tokens: &[Token<'_>]) -> String {
        let mut session = Session::new(formatter);
        session.start_document().unwrap();
        for token in tokens {
            session.token(token).unwrap();
        }
        session.end_document().unwrap();
        session.finish().unwrap()
    }

    #[test]
    fn test_classic_palette() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        let out = render(
            formatter.as_mut(),
            &[
                Token::new(TokenKind::Keyword, 0, "if"),
                Token::new(TokenKind::Text, 2, " "),
                Token::new(TokenKind::StringDouble, 3, "\"x\""),
            ],
        );
        assert_eq!(
            out,
            "\x1b[34mif\x1b[39;49;00m \x1b[33m\"x\"\x1b[39;49;00m"
        );
    }

    #[test]
    fn test_unstyled_kinds_have_no_reset() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        let out = render(
            formatter.as_mut(),
            &[Token::new(TokenKind::Punctuation, 0, ";")],
        );
        assert_eq!(out, ";");
    }

    #[test]
    fn test_theme_uses_truecolor() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        formatter.set_option("theme", "monokai".into()).unwrap();
        let theme = builtin::monokai();
        let out = render(
            formatter.as_mut(),
            &[Token::new(TokenKind::Keyword, 0, "if")],
        );
        assert!(out.contains(&theme.ansi_style(TokenKind::Keyword)));
        assert!(out.contains("38;2;"));
        assert!(out.ends_with(Theme::ANSI_RESET));
    }

    #[test]
    fn test_tabs_expand_to_stops() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        formatter.set_option("tab_width", 4.into()).unwrap();
        let out = render(
            formatter.as_mut(),
            &[Token::new(TokenKind::Text, 0, "ab\tc\n\td")],
        );
        assert_eq!(out, "ab  c\n    d");
    }

    #[test]
    fn test_zero_tab_width_keeps_tabs() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        formatter.set_option("tab_width", 0.into()).unwrap();
        let out = render(
            formatter.as_mut(),
            &[Token::new(TokenKind::Text, 0, "\tx")],
        );
        assert_eq!(out, "\tx");
    }

    #[test]
    fn test_wrapping_reapplies_style() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        formatter.set_option("width", 10.into()).unwrap();
        let out = render(
            formatter.as_mut(),
            &[Token::new(TokenKind::Comment, 0, "// 0123456789")],
        );
        assert_eq!(
            out,
            "\x1b[37m// 0123456\x1b[39;49;00m\n\x1b[37m789\x1b[39;49;00m"
        );
    }

    #[test]
    fn test_width_validation() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        assert!(formatter.set_option("width", (-2).into()).is_err());
        assert!(formatter.set_option("width", (-1).into()).is_ok());
        assert!(formatter.set_option("tab_width", (-1).into()).is_err());
    }

    #[test]
    fn test_tab_width_is_bounded() {
        let mut formatter = TERMINAL.new_formatter().unwrap();
        formatter.set_option("tab_width", 64.into()).unwrap();
        assert!(formatter.set_option("tab_width", 65.into()).is_err());
        assert!(formatter.set_option("tab_width", (1i64 << 40).into()).is_err());
        assert_eq!(formatter.get_option("tab_width").unwrap().as_int(), Some(64));

        let out = render(formatter.as_mut(), &[Token::new(TokenKind::Text, 0, "\tx")]);
        assert!(out.ends_with('x'));
        assert!(out.len() <= 80);
    }
}
