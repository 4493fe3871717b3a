//! PHP, a template language.
//!
//! Only code between `<?php ... ?>` (and `<?= ... ?>`, plus `<? ... ?>` and
//! `<% ... %>` when enabled) is lexed here; the text around it goes to the
//! `secondary` lexer. With `start_inline`, the input starts in code.

use shall_highlight::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, OptionDecl, OptionStore, SchemaBuilder,
    StateStack, Step, TokenKind,
};

use super::template::template_options;
use super::{is_ident_char, is_ident_start};

pub static PHP: LexerClass = LexerClass {
    name: "php",
    label: "PHP",
    description: "PHP scripts and templates",
    aliases: &["php3", "php4", "php5"],
    filenames: &["*.php", "*.php[345]", "*.phtml"],
    mimetypes: &["text/x-php"],
    interpreters: &["php", "php-cli", "php-cgi"],
    options: php_options,
    analyse: Some(analyse),
    create: create_php,
};

fn php_options(builder: SchemaBuilder) -> SchemaBuilder {
    template_options(builder)
        .declare(OptionDecl::boolean(
            "start_inline",
            false,
            "the input starts as PHP code, without an opening tag",
        ))
        .declare(OptionDecl::boolean(
            "short_tags",
            false,
            "also recognize `<?` as an opening tag",
        ))
        .declare(OptionDecl::boolean(
            "asp_tags",
            false,
            "also recognize `<%` and `%>` as tags",
        ))
}

fn create_php(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&PHP, Php, options))
}

fn analyse(text: &str) -> u32 {
    if text.trim_start().starts_with("<?php") {
        999
    } else if text.contains("<?php") {
        500
    } else if text.contains("<?=") && text.contains("?>") {
        300
    } else {
        0
    }
}

/// Reserved words, compared without regard to case.
const KEYWORDS: &[&str] = &[
    "and", "as", "break", "case", "catch", "clone", "continue", "declare", "default", "do",
    "echo", "else", "elseif", "empty", "enddeclare", "endfor", "endforeach", "endif",
    "endswitch", "endwhile", "eval", "exit", "die", "finally", "for", "foreach", "global",
    "goto", "if", "include", "include_once", "instanceof", "insteadof", "isset", "list",
    "match", "new", "or", "print", "require", "require_once", "return", "switch", "throw",
    "try", "unset", "while", "xor", "yield",
];

const DECLARATIONS: &[&str] = &[
    "abstract", "const", "final", "private", "protected", "public", "readonly", "static", "var",
];

const TYPES: &[&str] = &[
    "array", "bool", "callable", "float", "int", "iterable", "mixed", "never", "object",
    "string", "void", "self", "parent",
];

const CONSTANTS: &[&str] = &[
    "true", "false", "null", "__class__", "__dir__", "__file__", "__function__", "__line__",
    "__method__", "__namespace__", "__trait__",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhpState {
    /// Template text outside of code blocks.
    Template,
    Code,
    /// Inside a double quoted string.
    Interpolated,
    /// Inside something that runs to the end of the input.
    Unterminated(TokenKind),
    /// After `class`, `new`, `extends`...: the next word names a class.
    ClassName,
    /// After `function` or `fn`.
    FunctionName,
}

pub struct Php;

impl Grammar for Php {
    type State = PhpState;

    fn initial_state(&self, options: &OptionStore) -> PhpState {
        if options.flag("start_inline") {
            PhpState::Code
        } else {
            PhpState::Template
        }
    }

    fn step(
        &self,
        input: &mut Input<'_>,
        states: &mut StateStack<PhpState>,
        options: &OptionStore,
    ) -> Step {
        match states.current() {
            PhpState::Template => template(input, states, options),
            PhpState::Code => code(input, states, options),
            PhpState::Interpolated => interpolated(input, states),
            PhpState::Unterminated(kind) => {
                input.eat_while(|_| true);
                Step::Emit(kind)
            }
            PhpState::ClassName | PhpState::FunctionName => name_after_keyword(input, states),
        }
    }
}

/// Length of the opening tag at the start of `rest`, if any.
fn opening_tag(rest: &str, options: &OptionStore) -> Option<usize> {
    let head = |prefix: &str| {
        rest.get(..prefix.len())
            .is_some_and(|h| h.eq_ignore_ascii_case(prefix))
    };
    if head("<?php") {
        Some(5)
    } else if rest.starts_with("<?=") {
        Some(3)
    } else if options.flag("short_tags") && rest.starts_with("<?") && !head("<?xml") {
        Some(2)
    } else if options.flag("asp_tags") && rest.starts_with("<%") {
        Some(2)
    } else {
        None
    }
}

fn template(
    input: &mut Input<'_>,
    states: &mut StateStack<PhpState>,
    options: &OptionStore,
) -> Step {
    if let Some(len) = opening_tag(input.rest(), options) {
        input.advance(len);
        states.push(PhpState::Code);
        return Step::Emit(TokenKind::TagPreproc);
    }
    // everything up to the next opening tag belongs to the secondary lexer
    let rest = input.rest();
    let end = rest
        .match_indices('<')
        .map(|(i, _)| i)
        .find(|&i| i > 0 && opening_tag(&rest[i..], options).is_some())
        .unwrap_or(rest.len());
    input.advance(end);
    Step::Delegate(TokenKind::Text)
}

fn closing_tag(input: &mut Input<'_>, options: &OptionStore) -> bool {
    input.eat("?>") || (options.flag("asp_tags") && input.eat("%>"))
}

fn at_closing_tag(input: &Input<'_>, options: &OptionStore) -> bool {
    input.starts_with("?>") || (options.flag("asp_tags") && input.starts_with("%>"))
}

fn code(
    input: &mut Input<'_>,
    states: &mut StateStack<PhpState>,
    options: &OptionStore,
) -> Step {
    if closing_tag(input, options) {
        // the newline right after a closing tag is part of it
        if !input.eat_char('\n') {
            input.eat("\r\n");
        }
        if !states.pop() {
            // started inline: the rest is template text
            states.set(PhpState::Template);
        }
        return Step::Emit(TokenKind::TagPreproc);
    }
    if input.eat_while(char::is_whitespace) > 0 {
        return Step::Emit(TokenKind::Text);
    }
    if input.eat("//") || (input.starts_with("#") && !input.starts_with("#[") && input.eat("#")) {
        while !input.is_eof() && input.peek() != Some('\n') && !at_closing_tag(input, options) {
            input.bump();
        }
        return Step::Emit(TokenKind::CommentSingle);
    }
    if input.starts_with("/**") && !input.starts_with("/**/") {
        input.eat("/**");
        return Step::Emit(block_comment(input, states, TokenKind::CommentDocumentation));
    }
    if input.eat("/*") {
        return Step::Emit(block_comment(input, states, TokenKind::CommentMultiline));
    }
    if input.starts_with("<<<") {
        return Step::Emit(heredoc(input, states));
    }

    let Some(c) = input.peek() else {
        return Step::Emit(TokenKind::Text);
    };
    match c {
        '$' if input.peek_nth(1).is_some_and(is_ident_start) => {
            input.bump();
            input.eat_while(is_ident_char);
            if input.consumed() == "$this" {
                Step::Emit(TokenKind::NameBuiltinPseudo)
            } else {
                Step::Emit(TokenKind::NameVariable)
            }
        }
        '\'' => {
            input.bump();
            if !single_quoted(input) {
                states.push(PhpState::Unterminated(TokenKind::StringSingle));
            }
            Step::Emit(TokenKind::StringSingle)
        }
        '"' => {
            input.bump();
            states.push(PhpState::Interpolated);
            Step::Emit(TokenKind::StringDouble)
        }
        '`' => {
            input.bump();
            if !input.skip_past("`") {
                states.push(PhpState::Unterminated(TokenKind::StringBacktick));
            }
            Step::Emit(TokenKind::StringBacktick)
        }
        c if c.is_ascii_digit() => Step::Emit(number(input)),
        '.' if input.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
            Step::Emit(number(input))
        }
        '\\' if input.peek_nth(1).is_some_and(is_ident_start) => {
            input.eat_while(|c| is_ident_char(c) || c == '\\');
            Step::Emit(TokenKind::NameNamespace)
        }
        c if is_ident_start(c) => {
            input.eat_while(is_ident_char);
            word(input, states)
        }
        '(' | ')' | '{' | '}' | '[' | ']' | ';' | ',' | '@' => {
            input.bump();
            Step::Emit(TokenKind::Punctuation)
        }
        c if is_operator(c) => {
            while input.peek().is_some_and(is_operator) && !at_closing_tag(input, options) {
                input.bump();
            }
            Step::Emit(TokenKind::Operator)
        }
        _ => {
            input.bump();
            Step::Emit(TokenKind::Error)
        }
    }
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '?' | ':'
            | '.' | '#'
    )
}

fn block_comment(
    input: &mut Input<'_>,
    states: &mut StateStack<PhpState>,
    kind: TokenKind,
) -> TokenKind {
    if !input.skip_past("*/") {
        states.push(PhpState::Unterminated(kind));
    }
    kind
}

/// Rest of a single quoted string; false if the input ends first.
fn single_quoted(input: &mut Input<'_>) -> bool {
    loop {
        match input.bump() {
            Some('\'') => return true,
            Some('\\') => {
                input.bump();
            }
            Some(_) => {}
            None => return false,
        }
    }
}

/// Heredoc (`<<<ID`, `<<<"ID"`) or nowdoc (`<<<'ID'`) up to its closing
/// identifier, which may be indented.
fn heredoc(input: &mut Input<'_>, states: &mut StateStack<PhpState>) -> TokenKind {
    input.eat("<<<");
    input.eat_while(|c| c == ' ' || c == '\t');
    let quote = input.eat_if(|c| c == '"' || c == '\'');
    let name_start = input.pos();
    input.eat_while(is_ident_char);
    let name = &input.source()[name_start..input.pos()];
    if let Some(q) = quote {
        input.eat_char(q);
    }
    let kind = if quote == Some('\'') {
        TokenKind::StringSingle
    } else {
        TokenKind::StringDouble
    };
    if name.is_empty() {
        return kind;
    }

    input.skip_line();
    loop {
        if !input.eat_char('\n') {
            states.push(PhpState::Unterminated(kind));
            return kind;
        }
        input.eat_while(|c| c == ' ' || c == '\t');
        let closes = input
            .rest()
            .strip_prefix(name)
            .is_some_and(|after| !after.starts_with(is_ident_char));
        if closes {
            input.advance(name.len());
            return kind;
        }
        input.skip_line();
    }
}

/// Body of a double quoted string: text, escapes and interpolations.
fn interpolated(input: &mut Input<'_>, states: &mut StateStack<PhpState>) -> Step {
    if input.eat_char('"') {
        states.pop();
        return Step::Emit(TokenKind::StringDouble);
    }
    if input.eat_char('\\') {
        input.bump();
        return Step::Emit(TokenKind::StringEscape);
    }
    if input.starts_with("{$") {
        input.skip_past("}");
        return Step::Emit(TokenKind::StringInterpolated);
    }
    if input.starts_with("$") && input.peek_nth(1).is_some_and(is_ident_start) {
        input.bump();
        input.eat_while(is_ident_char);
        if input.starts_with("->") && input.peek_nth(2).is_some_and(is_ident_start) {
            input.eat("->");
            input.eat_while(is_ident_char);
        }
        return Step::Emit(TokenKind::StringInterpolated);
    }
    input.bump();
    input.eat_while(|c| !matches!(c, '"' | '\\' | '$' | '{'));
    Step::Emit(TokenKind::StringDouble)
}

/// Rest of a number whose first digit (or dot) was not consumed yet.
fn number(input: &mut Input<'_>) -> TokenKind {
    if input.eat_ignore_case("0x") {
        input.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        return TokenKind::NumberHexadecimal;
    }
    if input.eat_ignore_case("0b") {
        input.eat_while(|c| matches!(c, '0' | '1' | '_'));
        return TokenKind::NumberBinary;
    }
    if input.eat_ignore_case("0o") {
        input.eat_while(|c| matches!(c, '0'..='7' | '_'));
        return TokenKind::NumberOctal;
    }

    let digits = |c: char| c.is_ascii_digit() || c == '_';
    input.eat_while(digits);
    let integral = input.consumed();
    let mut float = false;
    if input.peek() == Some('.') && input.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
        input.bump();
        input.eat_while(digits);
        float = true;
    }
    if matches!(input.peek(), Some('e' | 'E')) {
        let exponent = input.pos();
        input.bump();
        input.eat_if(|c| c == '+' || c == '-');
        if input.eat_while(|c| c.is_ascii_digit()) > 0 {
            float = true;
        } else {
            input.rewind(exponent);
        }
    }

    if float {
        TokenKind::NumberFloat
    } else if integral.len() > 1 && integral.starts_with('0') {
        TokenKind::NumberOctal
    } else {
        TokenKind::NumberDecimal
    }
}

fn word(input: &mut Input<'_>, states: &mut StateStack<PhpState>) -> Step {
    let word = input.consumed().to_ascii_lowercase();
    let word = word.as_str();
    let is = |list: &[&str]| list.contains(&word);

    if matches!(word, "function" | "fn") {
        states.push(PhpState::FunctionName);
        return Step::Emit(TokenKind::KeywordDeclaration);
    }
    if matches!(
        word,
        "class" | "interface" | "trait" | "enum" | "extends" | "implements"
    ) {
        states.push(PhpState::ClassName);
        return Step::Emit(TokenKind::KeywordDeclaration);
    }
    if word == "new" {
        states.push(PhpState::ClassName);
        return Step::Emit(TokenKind::Keyword);
    }
    if matches!(word, "namespace" | "use") {
        return Step::Emit(TokenKind::KeywordNamespace);
    }
    if is(KEYWORDS) {
        return Step::Emit(TokenKind::Keyword);
    }
    if is(DECLARATIONS) {
        return Step::Emit(TokenKind::KeywordDeclaration);
    }
    if is(CONSTANTS) {
        return Step::Emit(TokenKind::KeywordConstant);
    }
    if is(TYPES) {
        return Step::Emit(TokenKind::KeywordType);
    }
    if input.starts_with("\\") {
        input.eat_while(|c| is_ident_char(c) || c == '\\');
        return Step::Emit(TokenKind::NameNamespace);
    }
    if input.rest().trim_start_matches([' ', '\t']).starts_with('(') {
        Step::Emit(TokenKind::NameFunction)
    } else {
        Step::Emit(TokenKind::Name)
    }
}

/// The name after `class` or `function`, skipping whitespace; anything
/// else returns to code untouched.
fn name_after_keyword(input: &mut Input<'_>, states: &mut StateStack<PhpState>) -> Step {
    if input.eat_while(char::is_whitespace) > 0 {
        return Step::Emit(TokenKind::Text);
    }
    let kind = if states.current() == PhpState::ClassName {
        TokenKind::NameClass
    } else {
        TokenKind::NameFunction
    };
    states.pop();
    if input.eat_char('&') {
        // function &byReference()
        states.push(PhpState::FunctionName);
        return Step::Emit(TokenKind::Operator);
    }
    if input.peek().is_some_and(|c| is_ident_start(c) || c == '\\') {
        input.eat_while(|c| is_ident_char(c) || c == '\\');
        return Step::Emit(kind);
    }
    Step::Emit(TokenKind::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn tokens(lexer: &dyn Lexer, source: &str) -> Vec<(TokenKind, String)> {
        lexer
            .tokenize(source)
            .filter(|t| t.kind != TokenKind::Text)
            .map(|t| (t.kind, t.text.to_string()))
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_template_text_without_secondary() {
        let lexer = PHP.new_lexer().unwrap();
        let all: Vec<_> = lexer
            .tokenize("<p><?php echo $x; ?></p>")
            .map(|t| (t.kind, t.text.to_string()))
            .collect();
        assert_eq!(
            all,
            vec![
                tok(TokenKind::Text, "<p>"),
                tok(TokenKind::TagPreproc, "<?php"),
                tok(TokenKind::Text, " "),
                tok(TokenKind::Keyword, "echo"),
                tok(TokenKind::Text, " "),
                tok(TokenKind::NameVariable, "$x"),
                tok(TokenKind::Punctuation, ";"),
                tok(TokenKind::Text, " "),
                tok(TokenKind::TagPreproc, "?>"),
                tok(TokenKind::Text, "</p>"),
            ]
        );
    }

    #[test]
    fn test_start_inline() {
        let mut lexer = PHP.new_lexer().unwrap();
        lexer.set_option("start_inline", true.into()).unwrap();
        assert_eq!(
            tokens(lexer.as_ref(), "$a = 1; ?>x"),
            vec![
                tok(TokenKind::NameVariable, "$a"),
                tok(TokenKind::Operator, "="),
                tok(TokenKind::NumberDecimal, "1"),
                tok(TokenKind::Punctuation, ";"),
                tok(TokenKind::TagPreproc, "?>"),
            ]
        );
    }

    #[test]
    fn test_short_and_asp_tags() {
        let mut lexer = PHP.new_lexer().unwrap();
        assert!(tokens(lexer.as_ref(), "<? x ?>").is_empty());

        lexer.set_option("short_tags", true.into()).unwrap();
        assert_eq!(
            tokens(lexer.as_ref(), "<? x ?>")[0],
            tok(TokenKind::TagPreproc, "<?")
        );
        assert!(tokens(lexer.as_ref(), "<?xml version=\"1.0\"?>").is_empty());

        lexer.set_option("asp_tags", true.into()).unwrap();
        assert_eq!(
            tokens(lexer.as_ref(), "<% $y %>"),
            vec![
                tok(TokenKind::TagPreproc, "<%"),
                tok(TokenKind::NameVariable, "$y"),
                tok(TokenKind::TagPreproc, "%>"),
            ]
        );
    }

    #[test]
    fn test_declarations() {
        let lexer = PHP.new_lexer().unwrap();
        let source = indoc! {r#"
            <?php
            namespace App\Models;
            final class User extends \Base\Model {
                public function &name(): string { return $this->name; }
            }
        "#};
        let toks = tokens(lexer.as_ref(), source);
        assert!(toks.contains(&tok(TokenKind::KeywordNamespace, "namespace")));
        assert!(toks.contains(&tok(TokenKind::NameNamespace, "App\\Models")));
        assert!(toks.contains(&tok(TokenKind::NameClass, "User")));
        assert!(toks.contains(&tok(TokenKind::NameClass, "\\Base\\Model")));
        assert!(toks.contains(&tok(TokenKind::NameFunction, "name")));
        assert!(toks.contains(&tok(TokenKind::KeywordType, "string")));
        assert!(toks.contains(&tok(TokenKind::NameBuiltinPseudo, "$this")));
        assert!(toks.contains(&tok(TokenKind::KeywordDeclaration, "public")));
    }

    #[test]
    fn test_interpolation() {
        let mut lexer = PHP.new_lexer().unwrap();
        lexer.set_option("start_inline", true.into()).unwrap();
        assert_eq!(
            tokens(lexer.as_ref(), r#""Hi $user->name, {$x['y']}!\n""#),
            vec![
                tok(TokenKind::StringDouble, "\""),
                tok(TokenKind::StringDouble, "Hi "),
                tok(TokenKind::StringInterpolated, "$user->name"),
                tok(TokenKind::StringDouble, ", "),
                tok(TokenKind::StringInterpolated, "{$x['y']}"),
                tok(TokenKind::StringDouble, "!"),
                tok(TokenKind::StringEscape, "\\n"),
                tok(TokenKind::StringDouble, "\""),
            ]
        );
    }

    #[test]
    fn test_comments_stop_at_closing_tag() {
        let lexer = PHP.new_lexer().unwrap();
        let toks = tokens(lexer.as_ref(), "<?php // note ?>after");
        assert_eq!(toks[1], tok(TokenKind::CommentSingle, "// note "));
        assert_eq!(toks[2], tok(TokenKind::TagPreproc, "?>"));
    }

    #[test]
    fn test_heredoc() {
        let mut lexer = PHP.new_lexer().unwrap();
        lexer.set_option("start_inline", true.into()).unwrap();
        let source = "$s = <<<'EOT'\n  a $b\n  EOT;\n";
        let toks = tokens(lexer.as_ref(), source);
        assert_eq!(
            toks[2],
            tok(TokenKind::StringSingle, "<<<'EOT'\n  a $b\n  EOT")
        );
        assert_eq!(toks[3], tok(TokenKind::Punctuation, ";"));
    }

    #[test]
    fn test_numbers() {
        let mut lexer = PHP.new_lexer().unwrap();
        lexer.set_option("start_inline", true.into()).unwrap();
        let kinds: Vec<_> = tokens(lexer.as_ref(), "0x1F 0b11 0o17 017 1_000 1.5 2e3")
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::NumberHexadecimal,
                TokenKind::NumberBinary,
                TokenKind::NumberOctal,
                TokenKind::NumberOctal,
                TokenKind::NumberDecimal,
                TokenKind::NumberFloat,
                TokenKind::NumberFloat,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let lexer = PHP.new_lexer().unwrap();
        let mut tokens = lexer.tokenize("<?php echo 'oops");
        let last = tokens.by_ref().last().unwrap();
        assert_eq!(last.text, "'oops");
        // the code block and the string are both open
        assert_eq!(
            tokens.diagnostics(),
            vec![shall_highlight::Diagnostic::MalformedInput {
                lexer: "php",
                offset: 16,
                depth: 2,
            }]
        );
    }

    #[test]
    fn test_analyse() {
        assert_eq!(analyse("<?php\necho 1;"), 999);
        assert_eq!(analyse("<html><?php echo 1; ?>"), 500);
        assert_eq!(analyse("<p><?= $x ?></p>"), 300);
        assert_eq!(analyse("<p>x</p>"), 0);
    }
}
