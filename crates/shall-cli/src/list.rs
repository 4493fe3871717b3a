//! `--list`: what the registry and the themes have to offer.

use clap::ValueEnum;
use shall::Registry;
use shall::highlight::{OptionDecl, OptionDefault, OptionSchema};
use shall::theme::builtin;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Listing {
    Lexers,
    Formatters,
    Themes,
}

pub fn print(listing: Listing, registry: &Registry, out: &mut impl Write) -> io::Result<()> {
    match listing {
        Listing::Lexers => {
            for entry in registry.lexers() {
                let class = entry.class();
                item(out, class.name, class.aliases, class.description)?;
                if !class.filenames.is_empty() {
                    writeln!(out, "  files: {}", class.filenames.join(", "))?;
                }
                options(out, entry.schema())?;
            }
        }
        Listing::Formatters => {
            for entry in registry.formatters() {
                let class = entry.class();
                item(out, class.name, class.aliases, class.description)?;
                options(out, entry.schema())?;
            }
        }
        Listing::Themes => {
            for name in builtin::NAMES {
                writeln!(out, "- {name}")?;
            }
        }
    }
    Ok(())
}

fn item(out: &mut impl Write, name: &str, aliases: &[&str], description: &str) -> io::Result<()> {
    write!(out, "- {name}")?;
    if !aliases.is_empty() {
        write!(out, " ({})", aliases.join(", "))?;
    }
    writeln!(out, ": {description}")
}

fn options(out: &mut impl Write, schema: &OptionSchema) -> io::Result<()> {
    for decl in schema.iter() {
        writeln!(
            out,
            "  + {} ({}, default: {}): {}",
            decl.name,
            decl.ty,
            default_value(decl),
            decl.doc
        )?;
    }
    Ok(())
}

fn default_value(decl: &OptionDecl) -> String {
    match decl.default {
        OptionDefault::Bool(value) => value.to_string(),
        OptionDefault::Int(value) => value.to_string(),
        OptionDefault::Str(value) if value.is_empty() => "none".to_string(),
        OptionDefault::Str(value) => format!("{value:?}"),
        OptionDefault::Unset => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn listing(listing: Listing) -> String {
        let registry = Registry::builtin().unwrap();
        let mut out = Vec::new();
        print(listing, &registry, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_lexers() {
        let text = listing(Listing::Lexers);
        assert!(text.contains(indoc! {"
            - php (php3, php4, php5): PHP scripts and templates
              files: *.php, *.php[345], *.phtml
              + secondary (lexer, default: none): lexer for the text outside of code blocks
        "}));
        assert!(text.contains("  + start_inline (bool, default: false): "));
        assert!(text.contains("- text (txt, plain): no highlighting at all\n"));
    }

    #[test]
    fn test_formatters() {
        let text = listing(Listing::Formatters);
        assert!(text.contains("+ tag_style (one of class|custom, default: \"class\")"));
        assert!(text.contains("+ linestart (int, default: 1)"));
        assert!(text.contains("+ theme (theme, default: none)"));
    }

    #[test]
    fn test_themes() {
        assert_eq!(listing(Listing::Themes), "- monokai\n- molokai\n");
    }
}
