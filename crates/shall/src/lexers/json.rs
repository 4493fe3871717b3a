//! JSON documents.
//!
//! Object keys are told apart from string values by looking ahead for the
//! `:` that follows them. Open objects and arrays are kept on the state
//! stack, so a truncated document is reported as malformed.

use shall_highlight::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, OptionStore, StateStack, Step, TokenKind,
    no_options,
};

pub static JSON: LexerClass = LexerClass {
    name: "json",
    label: "JSON",
    description: "JavaScript Object Notation",
    aliases: &[],
    filenames: &["*.json"],
    mimetypes: &["application/json"],
    interpreters: &[],
    options: no_options,
    analyse: Some(analyse),
    create: create_json,
};

fn create_json(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&JSON, Json, options))
}

fn analyse(text: &str) -> u32 {
    let text = text.trim();
    let object = text.starts_with('{') && text.ends_with('}');
    let array = text.starts_with('[') && text.ends_with(']');
    if (object || array) && text.contains('"') {
        100
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonState {
    Value,
    Object,
    Array,
    /// Inside a string that runs to the end of the input.
    Unterminated,
}

pub struct Json;

impl Grammar for Json {
    type State = JsonState;

    fn initial_state(&self, _options: &OptionStore) -> JsonState {
        JsonState::Value
    }

    fn step(
        &self,
        input: &mut Input<'_>,
        states: &mut StateStack<JsonState>,
        _options: &OptionStore,
    ) -> Step {
        if states.current() == JsonState::Unterminated {
            input.eat_while(|_| true);
            return Step::Emit(TokenKind::StringDouble);
        }
        if input.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n')) > 0 {
            return Step::Emit(TokenKind::Text);
        }

        let Some(c) = input.bump() else {
            return Step::Emit(TokenKind::Text);
        };
        match c {
            '{' => {
                states.push(JsonState::Object);
                Step::Emit(TokenKind::Punctuation)
            }
            '[' => {
                states.push(JsonState::Array);
                Step::Emit(TokenKind::Punctuation)
            }
            '}' | ']' => {
                let expected = if c == '}' {
                    JsonState::Object
                } else {
                    JsonState::Array
                };
                if states.current() == expected {
                    states.pop();
                    Step::Emit(TokenKind::Punctuation)
                } else {
                    Step::Emit(TokenKind::Error)
                }
            }
            ',' | ':' => Step::Emit(TokenKind::Punctuation),
            '"' => {
                if !string_body(input) {
                    states.push(JsonState::Unterminated);
                    return Step::Emit(TokenKind::StringDouble);
                }
                if states.current() == JsonState::Object && followed_by_colon(input) {
                    Step::Emit(TokenKind::NameAttribute)
                } else {
                    Step::Emit(TokenKind::StringDouble)
                }
            }
            '-' | '0'..='9' => Step::Emit(number(input)),
            c if c.is_ascii_alphabetic() => {
                input.eat_while(|c| c.is_ascii_alphanumeric());
                match input.consumed() {
                    "true" | "false" | "null" => Step::Emit(TokenKind::KeywordConstant),
                    _ => Step::Emit(TokenKind::Error),
                }
            }
            _ => Step::Emit(TokenKind::Error),
        }
    }
}

/// Consume the rest of a string after its opening quote. False if the
/// input ends first.
fn string_body(input: &mut Input<'_>) -> bool {
    loop {
        match input.bump() {
            Some('"') => return true,
            Some('\\') => {
                input.bump();
            }
            Some(_) => {}
            None => return false,
        }
    }
}

fn followed_by_colon(input: &Input<'_>) -> bool {
    input
        .rest()
        .trim_start_matches([' ', '\t', '\r', '\n'])
        .starts_with(':')
}

/// Rest of a number whose first character was consumed.
fn number(input: &mut Input<'_>) -> TokenKind {
    input.eat_while(|c| c.is_ascii_digit());
    let mut float = false;
    if input.peek() == Some('.') && input.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
        input.bump();
        input.eat_while(|c| c.is_ascii_digit());
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
    if input.consumed() == "-" {
        TokenKind::Error
    } else if float {
        TokenKind::NumberFloat
    } else {
        TokenKind::NumberDecimal
    }
}
