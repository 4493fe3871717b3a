//! C source and headers.

use shall_highlight::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, OptionStore, StateStack, Step, TokenKind,
    no_options,
};

use super::{is_ident_char, is_ident_start};

pub static C: LexerClass = LexerClass {
    name: "c",
    label: "C",
    description: "C source files and headers",
    aliases: &["h"],
    filenames: &["*.c", "*.h"],
    mimetypes: &["text/x-csrc", "text/x-chdr"],
    interpreters: &["tcc"],
    options: no_options,
    analyse: Some(analyse),
    create: create_c,
};

fn create_c(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&C, CGrammar, options))
}

/// Headers included with `#include <...>` or `#include "..."`.
fn analyse(text: &str) -> u32 {
    let includes = text
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("#include <") || line.starts_with("#include \""))
        .count();
    match includes {
        0 => 0,
        1 => 200,
        _ => 300,
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "continue", "default", "do", "else", "for", "goto", "if", "return",
    "sizeof", "switch", "while", "_Alignof", "_Generic", "_Static_assert", "asm",
];

const DECLARATIONS: &[&str] = &[
    "auto", "const", "enum", "extern", "inline", "register", "restrict", "static", "struct",
    "typedef", "union", "volatile", "_Alignas", "_Atomic", "_Noreturn", "_Thread_local",
];

const TYPES: &[&str] = &[
    "bool", "char", "double", "float", "int", "long", "short", "signed", "unsigned", "void",
    "_Bool", "_Complex", "_Imaginary", "size_t", "ssize_t", "ptrdiff_t", "wchar_t", "FILE",
];

const CONSTANTS: &[&str] = &["NULL", "true", "false", "EOF", "stdin", "stdout", "stderr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CState {
    Code,
    /// Rest of a preprocessor line.
    Preproc,
    /// Inside an unterminated `/* */` comment.
    Comment,
    String,
    Char,
}

pub struct CGrammar;

impl Grammar for CGrammar {
    type State = CState;

    fn initial_state(&self, _options: &OptionStore) -> CState {
        CState::Code
    }

    fn step(
        &self,
        input: &mut Input<'_>,
        states: &mut StateStack<CState>,
        _options: &OptionStore,
    ) -> Step {
        match states.current() {
            CState::Code => code(input, states),
            CState::Preproc => preproc(input, states),
            CState::Comment => {
                if input.skip_past("*/") {
                    states.pop();
                }
                Step::Emit(TokenKind::CommentMultiline)
            }
            CState::String => quoted(input, states, '"', TokenKind::StringDouble),
            CState::Char => quoted(input, states, '\'', TokenKind::StringSingle),
        }
    }
}

fn code(input: &mut Input<'_>, states: &mut StateStack<CState>) -> Step {
    if input.at_line_start() && input.eat_char('#') {
        input.eat_while(|c| c == ' ' || c == '\t');
        input.eat_while(|c| c.is_ascii_alphabetic());
        states.push(CState::Preproc);
        return Step::Emit(TokenKind::TagPreproc);
    }
    if let Some(step) = comment(input, states) {
        return step;
    }
    if input.eat_while(char::is_whitespace) > 0 {
        return Step::Emit(TokenKind::Text);
    }

    // prefixed literals: L"..", u8"..", U'..'
    let mark = input.pos();
    for prefix in ["u8", "u", "U", "L"] {
        if input.eat(prefix) {
            break;
        }
    }
    if input.eat_char('"') {
        states.push(CState::String);
        return Step::Emit(TokenKind::StringDouble);
    }
    if input.eat_char('\'') {
        states.push(CState::Char);
        return Step::Emit(TokenKind::StringSingle);
    }
    input.rewind(mark);

    match input.peek() {
        Some(c) if c.is_ascii_digit() => Step::Emit(number(input)),
        Some('.') if input.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
            Step::Emit(number(input))
        }
        Some(c) if is_ident_start(c) => {
            input.eat_while(is_ident_char);
            Step::Emit(classify(input))
        }
        Some('(' | ')' | '{' | '}' | '[' | ']' | ';' | ',' | '.') => {
            input.bump();
            Step::Emit(TokenKind::Punctuation)
        }
        Some(c) if is_operator(c) => {
            input.eat_while(is_operator);
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
    )
}

/// `//` and `/* */` comments, shared by code and preprocessor lines.
fn comment(input: &mut Input<'_>, states: &mut StateStack<CState>) -> Option<Step> {
    if input.eat("//") {
        // a trailing backslash continues the comment on the next line
        loop {
            input.skip_line();
            if !input.consumed().ends_with('\\') || !input.eat_char('\n') {
                break;
            }
        }
        return Some(Step::Emit(TokenKind::CommentSingle));
    }
    if input.eat("/*") {
        if !input.skip_past("*/") {
            states.push(CState::Comment);
        }
        return Some(Step::Emit(TokenKind::CommentMultiline));
    }
    None
}

fn preproc(input: &mut Input<'_>, states: &mut StateStack<CState>) -> Step {
    if let Some(step) = comment(input, states) {
        return step;
    }
    while let Some(c) = input.peek() {
        if c == '\n' || input.starts_with("/*") || input.starts_with("//") {
            break;
        }
        if input.eat("\\\n") || input.eat("\\\r\n") {
            continue;
        }
        input.bump();
    }
    if input.peek().is_none_or(|c| c == '\n') {
        states.pop();
    }
    Step::Emit(TokenKind::TagPreproc)
}

/// Body of a string or character literal, escapes as separate tokens.
/// A raw newline ends the literal.
fn quoted(
    input: &mut Input<'_>,
    states: &mut StateStack<CState>,
    quote: char,
    kind: TokenKind,
) -> Step {
    if input.eat_char(quote) {
        states.pop();
        return Step::Emit(kind);
    }
    if input.eat_char('\\') {
        match input.bump() {
            Some('x') => {
                input.eat_while(|c| c.is_ascii_hexdigit());
            }
            Some('0'..='7') => {
                for _ in 0..2 {
                    input.eat_if(|c| matches!(c, '0'..='7'));
                }
            }
            Some('u') => {
                for _ in 0..4 {
                    input.eat_if(|c| c.is_ascii_hexdigit());
                }
            }
            Some('U') => {
                for _ in 0..8 {
                    input.eat_if(|c| c.is_ascii_hexdigit());
                }
            }
            _ => {}
        }
        return Step::Emit(TokenKind::StringEscape);
    }
    if input.peek() == Some('\n') {
        states.pop();
        return Step::Emit(kind);
    }
    input.eat_while(|c| c != quote && c != '\\' && c != '\n');
    Step::Emit(kind)
}

fn number(input: &mut Input<'_>) -> TokenKind {
    let suffix = |input: &mut Input<'_>| {
        input.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F'));
    };

    if input.eat_ignore_case("0x") {
        input.eat_while(|c| c.is_ascii_hexdigit() || c == '\'');
        suffix(input);
        return TokenKind::NumberHexadecimal;
    }
    if input.eat_ignore_case("0b") {
        input.eat_while(|c| matches!(c, '0' | '1' | '\''));
        suffix(input);
        return TokenKind::NumberBinary;
    }

    let digits = |c: char| c.is_ascii_digit() || c == '\'';
    input.eat_while(digits);
    let integral = input.consumed();
    let mut float = false;
    if input.peek() == Some('.') {
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
    suffix(input);

    if float {
        TokenKind::NumberFloat
    } else if integral.len() > 1 && integral.starts_with('0') {
        TokenKind::NumberOctal
    } else {
        TokenKind::NumberDecimal
    }
}

fn classify(input: &Input<'_>) -> TokenKind {
    let word = input.consumed();
    if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else if DECLARATIONS.contains(&word) {
        TokenKind::KeywordDeclaration
    } else if TYPES.contains(&word) || word.ends_with("_t") {
        TokenKind::KeywordType
    } else if CONSTANTS.contains(&word) {
        TokenKind::KeywordConstant
    } else if input.rest().trim_start_matches([' ', '\t']).starts_with('(') {
        TokenKind::NameFunction
    } else {
        TokenKind::Name
    }
}
