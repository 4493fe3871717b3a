//! Unified and context diffs, one token per line.

use shall_highlight::{
    Grammar, GrammarLexer, Input, Lexer, LexerClass, OptionStore, StateStack, Step, TokenKind,
    no_options,
};

pub static DIFF: LexerClass = LexerClass {
    name: "diff",
    label: "Diff",
    description: "output of diff and patch files",
    aliases: &["udiff", "patch"],
    filenames: &["*.diff", "*.patch"],
    mimetypes: &["text/x-diff", "text/x-patch"],
    interpreters: &[],
    options: no_options,
    analyse: Some(analyse),
    create: create_diff,
};

fn create_diff(options: OptionStore) -> Box<dyn Lexer> {
    Box::new(GrammarLexer::new(&DIFF, Diff, options))
}

fn analyse(text: &str) -> u32 {
    if text.starts_with("Index: ") || text.starts_with("diff ") {
        999
    } else if text.starts_with("--- ") {
        600
    } else {
        0
    }
}

/// Kind of a whole diff line, from how it starts.
fn line_kind(line: &str) -> TokenKind {
    match line.as_bytes().first() {
        Some(b'+') => TokenKind::GenericInserted,
        Some(b'-') => TokenKind::GenericDeleted,
        Some(b'!') => TokenKind::GenericStrong,
        Some(b'@') => TokenKind::GenericSubheading,
        Some(b'=') => TokenKind::GenericHeading,
        _ if line.starts_with("Index") || line.starts_with("index") || line.starts_with("diff") => {
            TokenKind::GenericHeading
        }
        _ => TokenKind::Text,
    }
}

pub struct Diff;

impl Grammar for Diff {
    type State = ();

    fn initial_state(&self, _options: &OptionStore) {}

    fn step(
        &self,
        input: &mut Input<'_>,
        _states: &mut StateStack<()>,
        _options: &OptionStore,
    ) -> Step {
        input.skip_line();
        input.eat_char('\n');
        Step::Emit(line_kind(input.consumed()))
    }
}
