#![cfg(feature = "all-languages")]

use indoc::indoc;
use shall::highlight::{Diagnostic, OptionError, highlight};
use shall::{Error, Registry, TokenKind};
use shall_test_harness::assert_coverage;

fn spans(source: &str, query: &str) -> Vec<(TokenKind, usize, String)> {
    let lexer = Registry::builtin().unwrap().lexer_from_query(query).unwrap();
    lexer
        .tokenize(source)
        .map(|t| (t.kind, t.offset, t.text.to_string()))
        .collect()
}

fn span(kind: TokenKind, offset: usize, text: &str) -> (TokenKind, usize, String) {
    (kind, offset, text.to_string())
}

#[test]
fn test_secondary_tokens_have_absolute_offsets() {
    let source = r#"<p class="a"><?php echo 1; ?></p>"#;
    assert_eq!(
        spans(source, "php?secondary=html"),
        vec![
            span(TokenKind::NameTag, 0, "<p"),
            span(TokenKind::Text, 2, " "),
            span(TokenKind::NameAttribute, 3, "class"),
            span(TokenKind::Operator, 8, "="),
            span(TokenKind::StringDouble, 9, "\"a\""),
            span(TokenKind::NameTag, 12, ">"),
            span(TokenKind::TagPreproc, 13, "<?php"),
            span(TokenKind::Text, 18, " "),
            span(TokenKind::Keyword, 19, "echo"),
            span(TokenKind::Text, 23, " "),
            span(TokenKind::NumberDecimal, 24, "1"),
            span(TokenKind::Punctuation, 25, ";"),
            span(TokenKind::Text, 26, " "),
            span(TokenKind::TagPreproc, 27, "?>"),
            span(TokenKind::NameTag, 29, "</p"),
            span(TokenKind::NameTag, 32, ">"),
        ]
    );
}

#[test]
fn test_without_secondary_template_text_is_plain() {
    let source = r#"<p class="a"><?php echo 1; ?></p>"#;
    let toks = spans(source, "php");
    assert_eq!(toks[0], span(TokenKind::Text, 0, r#"<p class="a">"#));
    assert_eq!(toks.last(), Some(&span(TokenKind::Text, 29, "</p>")));
}

#[test]
fn test_secondary_keeps_its_state_across_code_blocks() {
    // the code block interrupts an attribute value
    let source = r#"<a href="<?= $u ?>">x</a>"#;
    assert_eq!(
        spans(source, "php?secondary=html"),
        vec![
            span(TokenKind::NameTag, 0, "<a"),
            span(TokenKind::Text, 2, " "),
            span(TokenKind::NameAttribute, 3, "href"),
            span(TokenKind::Operator, 7, "="),
            span(TokenKind::StringDouble, 8, "\""),
            span(TokenKind::TagPreproc, 9, "<?="),
            span(TokenKind::Text, 12, " "),
            span(TokenKind::NameVariable, 13, "$u"),
            span(TokenKind::Text, 15, " "),
            span(TokenKind::TagPreproc, 16, "?>"),
            span(TokenKind::StringDouble, 18, "\""),
            span(TokenKind::NameTag, 19, ">"),
            span(TokenKind::Text, 20, "x"),
            span(TokenKind::NameTag, 21, "</a"),
            span(TokenKind::NameTag, 24, ">"),
        ]
    );
}

#[test]
fn test_delegated_document_is_covered() {
    let source = indoc! {r#"
        <!DOCTYPE html>
        <ul>
        <?php foreach ($items as $item): ?>
          <li class="<?= $item->kind ?>"><?= htmlspecialchars($item->name) ?></li>
        <?php endforeach; ?>
        </ul>
    "#};
    let registry = Registry::builtin().unwrap();
    let lexer = registry.lexer_from_query("php?secondary=html").unwrap();
    let diagnostics = assert_coverage(lexer.as_ref(), source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_diagnostics_come_from_both_lexers() {
    let source = "<!-- open <?php echo 'x";
    let registry = Registry::builtin().unwrap();
    let lexer = registry.lexer_from_query("php?secondary=html").unwrap();
    let diagnostics = assert_coverage(lexer.as_ref(), source);
    let lexers: Vec<&str> = diagnostics
        .iter()
        .map(|d| match d {
            Diagnostic::MalformedInput { lexer, .. } | Diagnostic::Stalled { lexer, .. } => *lexer,
        })
        .collect();
    assert!(lexers.contains(&"php"), "{diagnostics:?}");
    assert!(lexers.contains(&"html"), "{diagnostics:?}");
}

#[test]
fn test_secondary_can_be_any_lexer() {
    let source = "int x;\n<?php $x ?>\nreturn x;";
    let registry = Registry::builtin().unwrap();
    let lexer = registry.lexer_from_query("php?secondary=c").unwrap();
    let mut formatter = registry.new_formatter("plain", []).unwrap();
    let plain = highlight(source, lexer.as_ref(), formatter.as_mut()).unwrap();
    assert!(plain.starts_with("KEYWORD_TYPE: \"int\"\n"), "{plain}");
    assert!(plain.contains("NAME_VARIABLE: \"$x\"\n"), "{plain}");
    assert!(plain.contains("KEYWORD: \"return\"\n"), "{plain}");
}

#[test]
fn test_query_parsing() {
    let registry = Registry::builtin().unwrap();
    let lexer = registry
        .lexer_from_query("php?start_inline=on&secondary=html;short_tags")
        .unwrap();
    assert_eq!(lexer.name(), "php");
    assert!(lexer.options().flag("start_inline"));
    assert!(lexer.options().flag("short_tags"));
    assert!(!lexer.options().flag("asp_tags"));
    assert_eq!(lexer.options().lexer("secondary").map(|l| l.name()), Some("html"));
}

#[test]
fn test_query_errors() {
    let registry = Registry::builtin().unwrap();
    assert!(matches!(
        registry.lexer_from_query("php?colour=red"),
        Err(Error::Option(OptionError::UnknownOption { owner: "php", .. }))
    ));
    assert!(matches!(
        registry.lexer_from_query("php?start_inline=maybe"),
        Err(Error::Option(OptionError::InvalidOptionValue { .. }))
    ));
    assert!(matches!(
        registry.lexer_from_query("php?secondary=cobol"),
        Err(Error::Option(OptionError::InvalidOptionValue { .. }))
    ));
    assert!(matches!(
        registry.lexer_from_query("cobol?x=1"),
        Err(Error::LexerNotFound { .. })
    ));
}

#[test]
fn test_rejected_value_keeps_the_previous_one() {
    let registry = Registry::builtin().unwrap();
    let mut lexer = registry.lexer_from_query("php?start_inline").unwrap();
    assert!(lexer.set_option_str("start_inline", "maybe", &registry).is_err());
    assert!(lexer.options().flag("start_inline"));
}
