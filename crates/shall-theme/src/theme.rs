//! Colors, styles and themes.
//!
//! A [`Theme`] maps token kinds to a [`Style`]. Lookups fall back along the
//! kind's parent chain, so a theme that only styles `STRING` still colors
//! `STRING_DOUBLE`.

use crate::tokens::TokenKind;
use std::collections::HashMap;
use std::fmt::{self, Write as _};

/// Errors raised while building or parsing a theme.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("invalid color `{0}` (expected #rgb or #rrggbb)")]
    InvalidColor(String),

    #[error("unknown token kind `{0}`")]
    UnknownKind(String),

    #[error("invalid style for `{kind}`: {reason}")]
    InvalidStyle { kind: String, reason: String },

    #[cfg(feature = "toml")]
    #[error("failed to parse theme: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => Some(Self::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            6 => Some(Self::new(pair(0)?, pair(2)?, pair(4)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Text attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        bold: false,
        italic: false,
        underline: false,
    };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// How a token kind is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub modifiers: Modifiers,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.modifiers.bold = true;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.modifiers.italic = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.modifiers.underline = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.modifiers.is_empty()
    }

    /// ANSI SGR sequence (24-bit colors). Empty for an empty style.
    pub fn to_ansi(&self) -> String {
        let mut codes: Vec<String> = Vec::new();
        if self.modifiers.bold {
            codes.push("1".into());
        }
        if self.modifiers.italic {
            codes.push("3".into());
        }
        if self.modifiers.underline {
            codes.push("4".into());
        }
        if let Some(c) = self.fg {
            codes.push(format!("38;2;{};{};{}", c.r, c.g, c.b));
        }
        if let Some(c) = self.bg {
            codes.push(format!("48;2;{};{};{}", c.r, c.g, c.b));
        }
        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }

    /// CSS declarations, e.g. `color: #f92672; font-weight: bold;`.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if let Some(c) = self.fg {
            let _ = write!(css, "color: {c}; ");
        }
        if let Some(c) = self.bg {
            let _ = write!(css, "background-color: {c}; ");
        }
        if self.modifiers.bold {
            css.push_str("font-weight: bold; ");
        }
        if self.modifiers.italic {
            css.push_str("font-style: italic; ");
        }
        if self.modifiers.underline {
            css.push_str("text-decoration: underline; ");
        }
        css.truncate(css.trim_end().len());
        css
    }
}

/// A named set of styles keyed by token kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    /// Document foreground.
    pub foreground: Option<Color>,
    /// Document background.
    pub background: Option<Color>,
    styles: HashMap<TokenKind, Style>,
}

impl Theme {
    /// Resets every SGR attribute.
    pub const ANSI_RESET: &'static str = "\x1b[0m";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreground: None,
            background: None,
            styles: HashMap::new(),
        }
    }

    pub fn with_style(mut self, kind: TokenKind, style: Style) -> Self {
        self.set_style(kind, style);
        self
    }

    /// Apply one style to several kinds.
    pub fn with_styles(mut self, kinds: &[TokenKind], style: Style) -> Self {
        for &kind in kinds {
            self.set_style(kind, style);
        }
        self
    }

    pub fn set_style(&mut self, kind: TokenKind, style: Style) {
        self.styles.insert(kind, style);
    }

    /// Style for `kind`, falling back to the closest styled ancestor.
    pub fn style(&self, kind: TokenKind) -> Option<&Style> {
        kind.ancestry().find_map(|k| self.styles.get(&k))
    }

    /// Style declared for exactly `kind`, without fallback.
    pub fn own_style(&self, kind: TokenKind) -> Option<&Style> {
        self.styles.get(&kind)
    }

    /// ANSI sequence for `kind`; empty if the theme does not style it.
    pub fn ansi_style(&self, kind: TokenKind) -> String {
        self.style(kind).map(Style::to_ansi).unwrap_or_default()
    }

    /// ANSI sequence for the document foreground/background.
    pub fn ansi_base_style(&self) -> String {
        Style {
            fg: self.foreground,
            bg: self.background,
            modifiers: Modifiers::NONE,
        }
        .to_ansi()
    }

    /// Export as CSS rules. `scope` prefixes every selector (e.g. `.code`).
    pub fn to_css(&self, scope: &str) -> String {
        let mut css = String::new();
        let scope = if scope.is_empty() {
            String::new()
        } else {
            format!("{scope} ")
        };

        if self.foreground.is_some() || self.background.is_some() {
            let base = Style {
                fg: self.foreground,
                bg: self.background,
                modifiers: Modifiers::NONE,
            };
            let selector = if scope.is_empty() { "pre" } else { scope.trim_end() };
            let _ = writeln!(css, "{selector} {{ {} }}", base.to_css());
        }

        for &kind in TokenKind::ALL {
            let class = kind.css_class();
            if class.is_empty() {
                continue;
            }
            if let Some(style) = self.own_style(kind).filter(|s| !s.is_empty()) {
                let _ = writeln!(css, "{scope}.{class} {{ {} }}", style.to_css());
            }
        }
        css
    }

    /// Parse a theme from TOML.
    ///
    /// ```toml
    /// name = "mine"
    /// foreground = "#f8f8f2"
    /// background = "#272822"
    ///
    /// [styles]
    /// keyword = { fg = "#66d9ef", bold = true }
    /// "string.double" = { fg = "#e6db74" }
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ThemeError> {
        let table: toml::Table = text.parse()?;

        let name = table
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("custom");
        let mut theme = Theme::new(name);

        let color = |value: Option<&toml::Value>| -> Result<Option<Color>, ThemeError> {
            match value {
                None => Ok(None),
                Some(toml::Value::String(s)) => Color::from_hex(s)
                    .map(Some)
                    .ok_or_else(|| ThemeError::InvalidColor(s.clone())),
                Some(other) => Err(ThemeError::InvalidColor(other.to_string())),
            }
        };

        theme.foreground = color(table.get("foreground"))?;
        theme.background = color(table.get("background"))?;

        let Some(styles) = table.get("styles") else {
            return Ok(theme);
        };
        let styles = styles.as_table().ok_or_else(|| ThemeError::InvalidStyle {
            kind: "styles".into(),
            reason: "expected a table".into(),
        })?;

        for (key, value) in styles {
            let kind =
                TokenKind::from_name(key).ok_or_else(|| ThemeError::UnknownKind(key.clone()))?;
            let style = match value {
                toml::Value::String(s) => Style::new().fg(
                    Color::from_hex(s).ok_or_else(|| ThemeError::InvalidColor(s.clone()))?,
                ),
                toml::Value::Table(t) => {
                    let flag = |name: &str| t.get(name).and_then(|v| v.as_bool()).unwrap_or(false);
                    Style {
                        fg: color(t.get("fg"))?,
                        bg: color(t.get("bg"))?,
                        modifiers: Modifiers {
                            bold: flag("bold"),
                            italic: flag("italic"),
                            underline: flag("underline"),
                        },
                    }
                }
                other => {
                    return Err(ThemeError::InvalidStyle {
                        kind: key.clone(),
                        reason: format!("expected a color or a table, got {}", other.type_str()),
                    });
                }
            };
            theme.set_style(kind, style);
        }

        Ok(theme)
    }
}

/// Built-in themes.
pub mod builtin {
    use super::{Color, Style, Theme};
    use crate::tokens::TokenKind as K;

    /// Names of every built-in theme.
    pub const NAMES: &[&str] = &["monokai", "molokai"];

    /// Look a built-in theme up by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Theme> {
        match name.to_ascii_lowercase().as_str() {
            "monokai" => Some(monokai()),
            "molokai" => Some(molokai()),
            _ => None,
        }
    }

    /// Every built-in theme.
    pub fn all() -> Vec<Theme> {
        vec![monokai(), molokai()]
    }

    pub fn monokai() -> Theme {
        const GREY: Color = Color::new(0x99, 0x99, 0x99);
        const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
        const DIM_RED: Color = Color::new(0x49, 0x31, 0x31);
        const WHITISH: Color = Color::new(0xF8, 0xF8, 0xF2);
        const DIM_GREY: Color = Color::new(0x75, 0x71, 0x5E);
        const DIM_GREEN: Color = Color::new(0x32, 0x49, 0x32);
        const SOFT_CYAN: Color = Color::new(0x66, 0xD9, 0xEF);
        const LIGHT_GREY: Color = Color::new(0xAA, 0xAA, 0xAA);
        const SOFT_YELLOW: Color = Color::new(0xE6, 0xDB, 0x74);
        const BRIGHT_PINK: Color = Color::new(0xF9, 0x26, 0x72);
        const BRIGHT_GREEN: Color = Color::new(0xA6, 0xE2, 0x2E);
        const LIGHT_VIOLET: Color = Color::new(0xAE, 0x81, 0xFF);

        let mut theme = Theme::new("monokai")
            .with_styles(
                &[K::Comment, K::CommentSingle, K::CommentMultiline],
                Style::new().fg(DIM_GREY).italic(),
            )
            .with_style(
                K::CommentDocumentation,
                Style::new().fg(DIM_GREY).italic().bold(),
            )
            .with_style(K::GenericInserted, Style::new().fg(WHITE).bg(DIM_GREEN))
            .with_style(K::GenericDeleted, Style::new().fg(WHITE).bg(DIM_RED))
            .with_style(K::GenericHeading, Style::new().fg(GREY))
            .with_style(K::GenericStrong, Style::new().bold())
            .with_style(K::GenericSubheading, Style::new().fg(LIGHT_GREY))
            .with_style(K::Keyword, Style::new().fg(SOFT_CYAN).bold())
            .with_styles(
                &[K::KeywordNamespace, K::Operator, K::NameTag, K::TagPreproc],
                Style::new().fg(BRIGHT_PINK).bold(),
            )
            .with_styles(
                &[K::Number, K::StringSingle, K::StringEscape],
                Style::new().fg(LIGHT_VIOLET),
            )
            .with_style(K::String, Style::new().fg(SOFT_YELLOW))
            .with_styles(
                &[K::NameClass, K::NameFunction, K::NameAttribute],
                Style::new().fg(BRIGHT_GREEN).bold(),
            )
            .with_styles(
                &[
                    K::NameBuiltin,
                    K::NameEntity,
                    K::NameNamespace,
                    K::NameVariable,
                ],
                Style::new().fg(WHITISH),
            )
            .with_style(K::Error, Style::new().fg(WHITE).bg(BRIGHT_PINK));
        theme.foreground = Some(WHITISH);
        theme.background = Some(Color::new(0x27, 0x28, 0x22));
        theme
    }

    pub fn molokai() -> Theme {
        const RED: Color = Color::new(0xF9, 0x26, 0x72);
        const BLUE: Color = Color::new(0x66, 0xD9, 0xEF);
        const WHITE: Color = Color::new(0xF8, 0xF8, 0xF2);
        const BLACK: Color = Color::new(0x1B, 0x1D, 0x1E);
        const GREEN: Color = Color::new(0xA6, 0xE2, 0x2E);
        const GREY: Color = Color::new(0x40, 0x3D, 0x3D);
        const VIOLET: Color = Color::new(0xAF, 0x87, 0xFF);
        const YELLOW: Color = Color::new(0xD7, 0xD7, 0x87);
        const DARK_BLUE: Color = Color::new(0x5E, 0x5D, 0x83);
        const LIGHT_GREY: Color = Color::new(0x46, 0x54, 0x57);

        let mut theme = Theme::new("molokai")
            .with_style(K::Comment, Style::new().fg(DARK_BLUE).italic())
            .with_style(
                K::CommentDocumentation,
                Style::new().fg(LIGHT_GREY).italic(),
            )
            .with_style(K::GenericInserted, Style::new().fg(GREEN))
            .with_style(K::GenericDeleted, Style::new().fg(RED))
            .with_style(K::GenericHeading, Style::new().fg(GREY))
            .with_style(K::GenericStrong, Style::new().bold())
            .with_style(K::GenericSubheading, Style::new().fg(LIGHT_GREY))
            .with_style(K::Keyword, Style::new().fg(BLUE).bold())
            .with_styles(
                &[K::KeywordNamespace, K::Operator, K::TagPreproc],
                Style::new().fg(RED).bold(),
            )
            .with_styles(&[K::Number, K::StringEscape], Style::new().fg(VIOLET))
            .with_style(K::String, Style::new().fg(YELLOW))
            .with_styles(
                &[K::NameClass, K::NameFunction, K::NameAttribute],
                Style::new().fg(GREEN).bold(),
            )
            .with_styles(
                &[
                    K::NameBuiltin,
                    K::NameEntity,
                    K::NameNamespace,
                    K::NameVariable,
                ],
                Style::new().fg(WHITE),
            )
            .with_style(K::NameTag, Style::new().fg(RED))
            .with_style(K::Error, Style::new().fg(WHITE).bg(RED));
        theme.foreground = Some(WHITE);
        theme.background = Some(BLACK);
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#f92672"), Some(Color::new(0xf9, 0x26, 0x72)));
        assert_eq!(Color::from_hex("fff"), Some(Color::new(255, 255, 255)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::new(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn test_style_falls_back_to_parent() {
        let theme = builtin::monokai();
        let string = theme.style(TokenKind::String).copied();
        assert!(string.is_some());
        assert_eq!(theme.style(TokenKind::StringDouble).copied(), string);
        // own entry beats the parent
        assert_ne!(theme.style(TokenKind::StringSingle).copied(), string);
        assert_eq!(theme.style(TokenKind::Ignorable), None);
    }

    #[test]
    fn test_ansi_style() {
        let theme = Theme::new("t").with_style(
            TokenKind::Keyword,
            Style::new().fg(Color::new(1, 2, 3)).bold(),
        );
        assert_eq!(theme.ansi_style(TokenKind::KeywordType), "\x1b[1;38;2;1;2;3m");
        assert_eq!(theme.ansi_style(TokenKind::Text), "");
    }

    #[test]
    fn test_to_css() {
        let theme = Theme::new("t").with_style(
            TokenKind::Keyword,
            Style::new().fg(Color::new(0x66, 0xd9, 0xef)).bold(),
        );
        assert_eq!(
            theme.to_css(".code"),
            ".code .k { color: #66d9ef; font-weight: bold; }\n"
        );
    }

    #[test]
    fn test_builtin_by_name() {
        for name in builtin::NAMES {
            let theme = builtin::by_name(name).unwrap();
            assert_eq!(&theme.name, name);
        }
        assert!(builtin::by_name("MONOKAI").is_some());
        assert!(builtin::by_name("solarized").is_none());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml() {
        let theme = Theme::from_toml(
            r##"
            name = "mine"
            background = "#000"

            [styles]
            keyword = { fg = "#66d9ef", bold = true }
            "string.double" = "#e6db74"
            "##,
        )
        .unwrap();
        assert_eq!(theme.name, "mine");
        assert_eq!(theme.background, Some(Color::new(0, 0, 0)));
        let kw = theme.style(TokenKind::KeywordType).unwrap();
        assert!(kw.modifiers.bold);
        assert_eq!(
            theme.style(TokenKind::StringDouble).unwrap().fg,
            Color::from_hex("#e6db74")
        );

        assert!(matches!(
            Theme::from_toml("[styles]\nnot_a_kind = \"#fff\""),
            Err(ThemeError::UnknownKind(_))
        ));
        assert!(matches!(
            Theme::from_toml("[styles]\nkeyword = \"blue\""),
            Err(ThemeError::InvalidColor(_))
        ));
    }
}
