//! XML and HTML.
//!
//! Both share one grammar; HTML matches declarations without regard to
//! case. Tags and attribute values keep their state between calls, so the
//! grammar works as the secondary lexer of a template language even when a
//! code block interrupts a tag.

use shall_highlight::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, OptionStore, StateStack, Step, TokenKind,
    no_options,
};

pub static XML: LexerClass = LexerClass {
    name: "xml",
    label: "XML",
    description: "generic XML documents",
    aliases: &[],
    filenames: &["*.xml", "*.xsl", "*.svg"],
    mimetypes: &["text/xml", "application/xml"],
    interpreters: &[],
    options: no_options,
    analyse: Some(analyse_xml),
    create: create_xml,
};

pub static HTML: LexerClass = LexerClass {
    name: "html",
    label: "HTML",
    description: "HTML documents",
    aliases: &["htm", "xhtml"],
    filenames: &["*.html", "*.htm", "*.xhtml"],
    mimetypes: &["text/html"],
    interpreters: &[],
    options: no_options,
    analyse: Some(analyse_html),
    create: create_html,
};

fn create_xml(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&XML, Markup { html: false }, options))
}

fn create_html(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&HTML, Markup { html: true }, options))
}

fn analyse_xml(text: &str) -> u32 {
    if text.trim_start().starts_with("<?xml") {
        450
    } else {
        0
    }
}

fn analyse_html(text: &str) -> u32 {
    let head = text.trim_start();
    let starts = |prefix: &str| {
        head.get(..prefix.len())
            .is_some_and(|h| h.eq_ignore_ascii_case(prefix))
    };
    if starts("<!doctype html") {
        500
    } else if starts("<html") {
        400
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupState {
    Content,
    /// Between a tag name and its closing `>`.
    Tag,
    /// After `=` inside a tag.
    Value,
    /// Inside a quoted attribute value.
    Quoted(char),
    /// Inside an unterminated comment, CDATA section or declaration.
    Open(&'static str),
}

pub struct Markup {
    html: bool,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

impl Markup {
    fn content(&self, input: &mut Input<'_>, states: &mut StateStack<MarkupState>) -> Step {
        let delimited: [(&str, &'static str, TokenKind); 3] = [
            ("<!--", "-->", TokenKind::CommentMultiline),
            ("<![CDATA[", "]]>", TokenKind::TagPreproc),
            ("<?", "?>", TokenKind::TagPreproc),
        ];
        for (open, close, kind) in delimited {
            if input.eat(open) {
                if !input.skip_past(close) {
                    states.push(MarkupState::Open(close));
                }
                return Step::Emit(kind);
            }
        }
        let doctype = if self.html {
            input.eat_ignore_case("<!doctype")
        } else {
            input.eat("<!DOCTYPE")
        };
        if doctype || input.eat("<!") {
            if !input.skip_past(">") {
                states.push(MarkupState::Open(">"));
            }
            return Step::Emit(TokenKind::TagPreproc);
        }

        if input.starts_with("</") || input.starts_with("<") {
            let mark = input.pos();
            input.eat("</");
            input.eat("<");
            if input.eat_if(is_name_start).is_some() {
                input.eat_while(is_name_char);
                states.push(MarkupState::Tag);
                return Step::Emit(TokenKind::NameTag);
            }
            input.rewind(mark);
            input.bump();
            return Step::Emit(TokenKind::Text);
        }

        if input.eat_char('&') {
            let entity = input.pos();
            input.eat_char('#');
            input.eat_while(|c| c.is_ascii_alphanumeric());
            if input.eat_char(';') {
                return Step::Emit(TokenKind::NameEntity);
            }
            input.rewind(entity);
            return Step::Emit(TokenKind::Text);
        }

        input.eat_while(|c| c != '<' && c != '&');
        Step::Emit(TokenKind::Text)
    }

    fn tag(&self, input: &mut Input<'_>, states: &mut StateStack<MarkupState>) -> Step {
        if input.eat_while(char::is_whitespace) > 0 {
            return Step::Emit(TokenKind::Text);
        }
        if input.eat("/>") || input.eat(">") || input.eat("?>") {
            states.pop();
            return Step::Emit(TokenKind::NameTag);
        }
        if input.eat_char('=') {
            states.set(MarkupState::Value);
            return Step::Emit(TokenKind::Operator);
        }
        if input.eat_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\''))
            > 0
        {
            return Step::Emit(TokenKind::NameAttribute);
        }
        input.bump();
        Step::Emit(TokenKind::Error)
    }

    fn value(&self, input: &mut Input<'_>, states: &mut StateStack<MarkupState>) -> Step {
        if input.eat_while(char::is_whitespace) > 0 {
            return Step::Emit(TokenKind::Text);
        }
        if let Some(quote) = input.eat_if(|c| c == '"' || c == '\'') {
            states.set(MarkupState::Quoted(quote));
            return self.quoted(input, states, quote);
        }
        states.set(MarkupState::Tag);
        if input.eat_while(|c| !c.is_whitespace() && c != '>') > 0 {
            Step::Emit(TokenKind::StringSingle)
        } else {
            Step::Emit(TokenKind::Text)
        }
    }

    fn quoted(
        &self,
        input: &mut Input<'_>,
        states: &mut StateStack<MarkupState>,
        quote: char,
    ) -> Step {
        let mut buf = [0; 4];
        if input.skip_past(quote.encode_utf8(&mut buf)) {
            states.set(MarkupState::Tag);
        }
        Step::Emit(if quote == '"' {
            TokenKind::StringDouble
        } else {
            TokenKind::StringSingle
        })
    }
}

impl Grammar for Markup {
    type State = MarkupState;

    fn initial_state(&self, _options: &OptionStore) -> MarkupState {
        MarkupState::Content
    }

    fn step(
        &self,
        input: &mut Input<'_>,
        states: &mut StateStack<MarkupState>,
        _options: &OptionStore,
    ) -> Step {
        match states.current() {
            MarkupState::Content => self.content(input, states),
            MarkupState::Tag => self.tag(input, states),
            MarkupState::Value => self.value(input, states),
            MarkupState::Quoted(quote) => self.quoted(input, states, quote),
            MarkupState::Open(close) => {
                if input.skip_past(close) {
                    states.pop();
                }
                Step::Emit(match close {
                    "-->" => TokenKind::CommentMultiline,
                    _ => TokenKind::TagPreproc,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn tokens(class: &'static LexerClass, source: &str) -> Vec<(TokenKind, String)> {
        let lexer = class.new_lexer().unwrap();
        lexer
            .tokenize(source)
            .map(|t| (t.kind, t.text.to_string()))
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_tag_with_attributes() {
        assert_eq!(
            tokens(&XML, r#"<a href="x" id='y' hidden>t</a>"#),
            vec![
                tok(TokenKind::NameTag, "<a"),
                tok(TokenKind::Text, " "),
                tok(TokenKind::NameAttribute, "href"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::StringDouble, "\"x\""),
                tok(TokenKind::Text, " "),
                tok(TokenKind::NameAttribute, "id"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::StringSingle, "'y'"),
                tok(TokenKind::Text, " "),
                tok(TokenKind::NameAttribute, "hidden"),
                tok(TokenKind::NameTag, ">"),
                tok(TokenKind::Text, "t"),
                tok(TokenKind::NameTag, "</a"),
                tok(TokenKind::NameTag, ">"),
            ]
        );
    }

    #[test]
    fn test_declarations_comments_and_entities() {
        let source = indoc! {r#"
            <?xml version="1.0"?>
            <!-- note -->
            <r><![CDATA[a < b]]>&amp; & x</r>
        "#};
        let toks = tokens(&XML, source);
        assert_eq!(toks[0], tok(TokenKind::TagPreproc, "<?xml version=\"1.0\"?>"));
        assert!(toks.contains(&tok(TokenKind::CommentMultiline, "<!-- note -->")));
        assert!(toks.contains(&tok(TokenKind::TagPreproc, "<![CDATA[a < b]]>")));
        assert!(toks.contains(&tok(TokenKind::NameEntity, "&amp;")));
        assert!(toks.contains(&tok(TokenKind::Text, "&")));
    }

    #[test]
    fn test_html_doctype_ignores_case() {
        let source = "<!doctype html><p>x</p>";
        assert_eq!(
            tokens(&HTML, source)[0],
            tok(TokenKind::TagPreproc, "<!doctype html>")
        );
        assert_eq!(analyse_html(source), 500);
        assert_eq!(analyse_html("<HTML><body>"), 400);
        assert_eq!(analyse_xml("<?xml version=\"1.0\"?>"), 450);
    }

    #[test]
    fn test_unquoted_value() {
        let toks = tokens(&HTML, "<td width=10>");
        assert_eq!(toks[4], tok(TokenKind::StringSingle, "10"));
        assert_eq!(toks[5], tok(TokenKind::NameTag, ">"));
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(
            tokens(&XML, "a < b"),
            vec![
                tok(TokenKind::Text, "a "),
                tok(TokenKind::Text, "<"),
                tok(TokenKind::Text, " b"),
            ]
        );
    }

    #[test]
    fn test_unclosed_tag_is_reported() {
        let lexer = XML.new_lexer().unwrap();
        let mut tokens = lexer.tokenize("<a href=\"x");
        tokens.by_ref().for_each(drop);
        assert_eq!(tokens.diagnostics().len(), 1);
    }
}
