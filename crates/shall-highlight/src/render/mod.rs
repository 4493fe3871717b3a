//! Builtin formatters.
//!
//! | name       | output                                               |
//! |------------|------------------------------------------------------|
//! | `html`     | `<span>`s (or custom elements) inside a `<pre>`      |
//! | `terminal` | ANSI escape sequences, classic 16 colors or a theme  |
//! | `plain`    | one `TOKEN_NAME: "text"` line per token, for tests   |
//! | `xml`      | a `<token type="...">` element per token             |
//! | `bbcode`   | `[color]`, `[b]` and `[i]` tags from a theme         |
//! | `rtf`      | a Rich Text Format document colored from a theme     |

mod bbcode;
mod html;
mod plain;
mod rtf;
mod terminal;
mod xml;

pub use bbcode::BBCODE;
pub use html::HTML;
pub use plain::PLAIN;
pub use rtf::RTF;
pub use terminal::TERMINAL;
pub use xml::XML;

use crate::formatter::FormatterClass;

/// Every builtin formatter class.
pub const BUILTIN: &[&FormatterClass] = &[&HTML, &TERMINAL, &PLAIN, &XML, &BBCODE, &RTF];

/// Escape HTML special characters.
pub fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    push_html_escaped(&mut result, text);
    result
}

pub(crate) fn push_html_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_builtin_names_are_unique() {
        for (i, a) in BUILTIN.iter().enumerate() {
            for b in &BUILTIN[i + 1..] {
                assert!(!a.answers_to(b.name), "{} shadows {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_builtin_schemas_build() {
        for class in BUILTIN {
            class.schema().unwrap_or_else(|e| panic!("{}: {e}", class.name));
        }
    }
}
