//! Plain text: the whole input is one token.

use shall_highlight::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, OptionStore, StateStack, Step, TokenKind,
    no_options,
};

pub static TEXT: LexerClass = LexerClass {
    name: "text",
    label: "Text only",
    description: "no highlighting at all",
    aliases: &["txt", "plain"],
    filenames: &["*.txt"],
    mimetypes: &["text/plain"],
    interpreters: &[],
    options: no_options,
    analyse: None,
    create: create_text,
};

fn create_text(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&TEXT, Text, options))
}

pub struct Text;

impl Grammar for Text {
    type State = ();

    fn initial_state(&self, _options: &OptionStore) {}

    fn step(
        &self,
        input: &mut Input<'_>,
        _states: &mut StateStack<()>,
        _options: &OptionStore,
    ) -> Step {
        input.eat_while(|_| true);
        Step::Emit(TokenKind::Text)
    }
}
