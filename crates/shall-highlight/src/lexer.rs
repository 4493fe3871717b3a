//! The lexer contract and the state machine that drives grammars.
//!
//! A [`Lexer`] is an object-safe handle: metadata, options and a way to
//! start a [`TokenCursor`] over some text. Concrete languages implement the
//! smaller [`Grammar`] trait instead and get a `Lexer` through
//! [`GrammarLexer`]; the shared [`Machine`] then takes care of everything
//! that is not language specific:
//!
//! - tokens are cut from what the grammar consumed, so they are contiguous
//!   and cover the input exactly;
//! - spans the grammar marks with [`Step::Delegate`] go to the lexer held
//!   in the `secondary` option, which only ever sees that slice, and its
//!   tokens are re-based to absolute offsets;
//! - end of input implicitly pops every open state and is reported as a
//!   [`Diagnostic::MalformedInput`];
//! - a grammar that stops consuming input has one character forced out as
//!   an `ERROR` token, so tokenization always terminates.

use crate::error::{Diagnostic, OptionError};
use crate::options::{OptionSchema, OptionStore, OptionValue, Resolver, SchemaBuilder};
use crate::token::Token;
use shall_theme::TokenKind;
use std::fmt;
use std::sync::Arc;

/// Name of the option holding the lexer that delegated spans go to.
pub const SECONDARY: &str = "secondary";

/// Consecutive zero-width steps tolerated before a character is forced out.
const MAX_STALLED_STEPS: u32 = 16;

/// Static description of a lexer kind, as listed in a registry.
#[derive(Debug)]
pub struct LexerClass {
    /// Canonical name (`php`).
    pub name: &'static str,
    /// Display name (`PHP`).
    pub label: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    /// Glob patterns matched against file names (`*.php[345]`).
    pub filenames: &'static [&'static str],
    pub mimetypes: &'static [&'static str],
    /// Glob patterns matched against shebang interpreters.
    pub interpreters: &'static [&'static str],
    /// Declares the options of this class.
    pub options: fn(SchemaBuilder) -> SchemaBuilder,
    /// Scores how likely the text is written in this language; 0 means no.
    pub analyse: Option<fn(&str) -> u32>,
    /// Builds an instance around an option store.
    pub create: fn(OptionStore) -> Box<dyn Lexer>,
}

impl LexerClass {
    pub fn schema(&self) -> Result<OptionSchema, OptionError> {
        (self.options)(OptionSchema::builder(self.name)).build()
    }

    /// Create an instance with default options from an already built schema.
    pub fn instantiate(&self, schema: Arc<OptionSchema>) -> Box<dyn Lexer> {
        (self.create)(OptionStore::new(schema))
    }

    /// Create an instance with default options, building the schema.
    pub fn new_lexer(&self) -> Result<Box<dyn Lexer>, OptionError> {
        Ok(self.instantiate(Arc::new(self.schema()?)))
    }

    /// True if `name` is the canonical name or one of the aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

/// Declaration function for classes without options.
pub fn no_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder
}

/// A configured lexer.
pub trait Lexer: Send {
    fn class(&self) -> &'static LexerClass;

    fn options(&self) -> &OptionStore;

    fn options_mut(&mut self) -> &mut OptionStore;

    /// Start tokenizing `source`. Token offsets are shifted by `base`.
    fn cursor<'a>(&'a self, source: &'a str, base: usize) -> Box<dyn TokenCursor<'a> + 'a>;

    fn name(&self) -> &'static str {
        self.class().name
    }

    /// Tokenize from the start. Repeated calls are independent.
    fn tokenize<'a>(&'a self, source: &'a str) -> Tokens<'a> {
        Tokens::new(self.cursor(source, 0))
    }

    fn get_option(&self, name: &str) -> Result<&OptionValue, OptionError> {
        self.options().get(name)
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        self.options_mut().set(name, value)
    }

    fn set_option_str(
        &mut self,
        name: &str,
        raw: &str,
        resolver: &dyn Resolver,
    ) -> Result<(), OptionError> {
        self.options_mut().set_from_str(name, raw, resolver)
    }
}

impl fmt::Debug for dyn Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("name", &self.name())
            .field("options", self.options())
            .finish()
    }
}

/// Pull-based token source.
pub trait TokenCursor<'a> {
    /// The next token, `None` once the input is exhausted.
    fn next_token(&mut self) -> Option<Token<'a>>;

    /// Continue on a new slice, keeping the lexical state reached so far.
    fn resume(&mut self, source: &'a str, base: usize);

    /// No more input will come: close open states and record what was left open.
    fn finish(&mut self);

    fn diagnostics(&self) -> Vec<Diagnostic>;
}

/// Iterator over the tokens of a whole text.
pub struct Tokens<'a> {
    cursor: Box<dyn TokenCursor<'a> + 'a>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(cursor: Box<dyn TokenCursor<'a> + 'a>) -> Self {
        Self {
            cursor,
            finished: false,
        }
    }

    /// What the lexers recovered from so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.cursor.diagnostics()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }
        let token = self.cursor.next_token();
        if token.is_none() {
            self.finished = true;
            self.cursor.finish();
        }
        token
    }
}

/// What a grammar did with the text it consumed during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Emit the consumed text as one token. Consuming nothing makes the step
    /// a pure state transition.
    Emit(TokenKind),
    /// The consumed text is outside this grammar: hand it to the secondary
    /// lexer, or emit it with the given kind when there is none.
    Delegate(TokenKind),
}

/// Language-specific part of a lexer.
pub trait Grammar: Send + Sync + 'static {
    type State: Copy + Eq + fmt::Debug + Send;

    /// State the machine starts in; options such as `start_inline` pick it.
    fn initial_state(&self, options: &OptionStore) -> Self::State;

    /// Consume some input from `input` and classify it.
    fn step(
        &self,
        input: &mut Input<'_>,
        states: &mut StateStack<Self::State>,
        options: &OptionStore,
    ) -> Step;
}

/// Read position over the text being tokenized.
///
/// Everything between [`Input::start`] and [`Input::pos`] is the text of the
/// token being built.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    src: &'a str,
    pos: usize,
    start: usize,
}

impl<'a> Input<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            start: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.src
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Text not consumed yet.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Text consumed by the current step.
    pub fn consumed(&self) -> &'a str {
        &self.src[self.start..self.pos]
    }

    /// True if nothing but spaces and tabs precede the position on its line.
    pub fn at_line_start(&self) -> bool {
        self.src[..self.pos]
            .chars()
            .rev()
            .take_while(|&c| c != '\n')
            .all(|c| c == ' ' || c == '\t')
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn starts_with_ignore_case(&self, prefix: &str) -> bool {
        self.rest()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `prefix` if the input starts with it.
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    pub fn eat_ignore_case(&mut self, prefix: &str) -> bool {
        if self.starts_with_ignore_case(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    pub fn eat_char(&mut self, c: char) -> bool {
        self.eat_if(|p| p == c).is_some()
    }

    pub fn eat_if(&mut self, pred: impl FnOnce(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(c) if pred(c) => {
                self.pos += c.len_utf8();
                Some(c)
            }
            _ => None,
        }
    }

    /// Consume characters while `pred` holds; returns the number of bytes consumed.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let begin = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - begin
    }

    /// Advance up to (not over) the next occurrence of `needle`. Without one,
    /// advance to the end and return `false`.
    pub fn skip_to(&mut self, needle: &str) -> bool {
        match self.rest().find(needle) {
            Some(i) => {
                self.pos += i;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    /// Advance past the next occurrence of `needle`. Without one, advance to
    /// the end and return `false`.
    pub fn skip_past(&mut self, needle: &str) -> bool {
        let found = self.skip_to(needle);
        if found {
            self.pos += needle.len();
        }
        found
    }

    /// Advance by `n` bytes, stopping at the end of the input. A position
    /// inside a char is moved to the next boundary.
    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.src.len());
        while !self.src.is_char_boundary(self.pos) {
            self.pos += 1;
        }
    }

    /// Advance to the end of the line, leaving the newline.
    pub fn skip_line(&mut self) {
        self.eat_while(|c| c != '\n');
    }

    /// Move back to an earlier position of the current step.
    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos.max(self.start);
    }

    /// Clamp the position after a step: never behind the token start, never
    /// past the end, always on a char boundary.
    fn settle(&mut self) {
        self.pos = self.pos.clamp(self.start, self.src.len());
        while !self.src.is_char_boundary(self.pos) {
            self.pos += 1;
        }
    }
}

/// Stack of lexical states.
#[derive(Debug, Clone)]
pub struct StateStack<S> {
    current: S,
    saved: Vec<S>,
}

impl<S: Copy> StateStack<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Switch state without remembering the previous one.
    pub fn set(&mut self, state: S) {
        self.current = state;
    }

    /// Enter `state`; [`StateStack::pop`] returns to the current one.
    pub fn push(&mut self, state: S) {
        self.saved.push(self.current);
        self.current = state;
    }

    /// Return to the state saved by the last push. False if nothing was saved.
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    /// Number of states pushed and not yet popped.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Pop everything.
    fn unwind(&mut self) {
        if let Some(&bottom) = self.saved.first() {
            self.current = bottom;
        }
        self.saved.clear();
    }
}

/// Drives a [`Grammar`] over one text (or a sequence of delegated slices).
pub struct Machine<'a, G: Grammar> {
    lexer: &'static str,
    grammar: &'a G,
    options: &'a OptionStore,
    input: Input<'a>,
    base: usize,
    states: StateStack<G::State>,
    secondary: Option<Box<dyn TokenCursor<'a> + 'a>>,
    delegating: bool,
    stalled: u32,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, G: Grammar> Machine<'a, G> {
    pub fn new(
        lexer: &'static str,
        grammar: &'a G,
        options: &'a OptionStore,
        source: &'a str,
        base: usize,
    ) -> Self {
        Self {
            lexer,
            grammar,
            options,
            input: Input::new(source),
            base,
            states: StateStack::new(grammar.initial_state(options)),
            secondary: None,
            delegating: false,
            stalled: 0,
            diagnostics: Vec::new(),
        }
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'a> {
        Token::new(kind, self.base + start, &self.input.src[start..end])
    }

    fn delegate(&mut self, lexer: &'a dyn Lexer, start: usize, end: usize) {
        let slice = &self.input.src[start..end];
        let base = self.base + start;
        tracing::trace!(
            lexer = self.lexer,
            secondary = lexer.name(),
            offset = base,
            len = slice.len(),
            "delegating span"
        );
        match self.secondary.as_mut() {
            Some(cursor) => cursor.resume(slice, base),
            None => self.secondary = Some(lexer.cursor(slice, base)),
        }
        self.delegating = true;
    }
}

impl<'a, G: Grammar> TokenCursor<'a> for Machine<'a, G> {
    fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            if self.delegating {
                if let Some(token) = self.secondary.as_mut().and_then(|c| c.next_token()) {
                    return Some(token);
                }
                self.delegating = false;
            }

            if self.input.is_eof() {
                return None;
            }

            self.input.start = self.input.pos;
            let step = self
                .grammar
                .step(&mut self.input, &mut self.states, self.options);
            self.input.settle();
            let (start, end) = (self.input.start, self.input.pos);

            if start == end {
                self.stalled += 1;
                if self.stalled < MAX_STALLED_STEPS {
                    continue;
                }
                self.stalled = 0;
                self.input.bump();
                let offset = self.base + start;
                tracing::warn!(
                    lexer = self.lexer,
                    offset,
                    state = ?self.states.current(),
                    "lexer stalled"
                );
                self.diagnostics.push(Diagnostic::Stalled {
                    lexer: self.lexer,
                    offset,
                });
                return Some(self.token(TokenKind::Error, start, self.input.pos));
            }
            self.stalled = 0;

            match step {
                Step::Emit(kind) => return Some(self.token(kind, start, end)),
                Step::Delegate(fallback) => {
                    let options: &'a OptionStore = self.options;
                    match options.lexer(SECONDARY) {
                        Some(lexer) => self.delegate(lexer, start, end),
                        None => return Some(self.token(fallback, start, end)),
                    }
                }
            }
        }
    }

    fn resume(&mut self, source: &'a str, base: usize) {
        self.input = Input::new(source);
        self.base = base;
        self.delegating = false;
    }

    fn finish(&mut self) {
        if let Some(secondary) = self.secondary.as_mut() {
            secondary.finish();
        }
        let depth = self.states.depth();
        if depth > 0 {
            let offset = self.base + self.input.src.len();
            tracing::debug!(lexer = self.lexer, offset, depth, "input ended inside an open state");
            self.diagnostics.push(Diagnostic::MalformedInput {
                lexer: self.lexer,
                offset,
                depth,
            });
            self.states.unwind();
        }
    }

    fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        if let Some(secondary) = &self.secondary {
            all.extend(secondary.diagnostics());
        }
        all
    }
}

/// A [`Lexer`] made of a [`Grammar`], its class and its options.
pub struct GrammarLexer<G: Grammar> {
    class: &'static LexerClass,
    grammar: G,
    options: OptionStore,
}

impl<G: Grammar> GrammarLexer<G> {
    pub fn new(class: &'static LexerClass, grammar: G, options: OptionStore) -> Self {
        Self {
            class,
            grammar,
            options,
        }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }
}

impl<G: Grammar> Lexer for GrammarLexer<G> {
    fn class(&self) -> &'static LexerClass {
        self.class
    }

    fn options(&self) -> &OptionStore {
        &self.options
    }

    fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    fn cursor<'a>(&'a self, source: &'a str, base: usize) -> Box<dyn TokenCursor<'a> + 'a> {
        Box::new(Machine::new(
            self.class.name,
            &self.grammar,
            &self.options,
            source,
            base,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionDecl;

    /// Words, spaces, strings, and `[...]` blocks whose content goes to the
    /// secondary lexer.
    struct Words;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum WordState {
        Top,
        Quoted,
        Block,
    }

    impl Grammar for Words {
        type State = WordState;

        fn initial_state(&self, options: &OptionStore) -> WordState {
            if options.flag("start_quoted") {
                WordState::Quoted
            } else {
                WordState::Top
            }
        }

        fn step(
            &self,
            input: &mut Input<'_>,
            states: &mut StateStack<WordState>,
            _options: &OptionStore,
        ) -> Step {
            match states.current() {
                WordState::Quoted => {
                    if input.eat("\"") {
                        states.pop();
                        return Step::Emit(TokenKind::StringDouble);
                    }
                    input.eat_while(|c| c != '"');
                    Step::Emit(TokenKind::StringDouble)
                }
                WordState::Block => {
                    if input.eat("]") {
                        states.pop();
                        return Step::Emit(TokenKind::Punctuation);
                    }
                    input.skip_to("]");
                    Step::Delegate(TokenKind::Text)
                }
                WordState::Top => {
                    if input.eat("\"") {
                        states.push(WordState::Quoted);
                        return Step::Emit(TokenKind::StringDouble);
                    }
                    if input.eat("[") {
                        states.push(WordState::Block);
                        return Step::Emit(TokenKind::Punctuation);
                    }
                    if input.eat_while(char::is_whitespace) > 0 {
                        return Step::Emit(TokenKind::Ignorable);
                    }
                    if input.eat_while(char::is_alphanumeric) > 0 {
                        return Step::Emit(TokenKind::Name);
                    }
                    input.bump();
                    Step::Emit(TokenKind::Punctuation)
                }
            }
        }
    }

    fn words_options(builder: SchemaBuilder) -> SchemaBuilder {
        builder
            .declare(OptionDecl::lexer(SECONDARY, "lexer for [...] blocks"))
            .declare(OptionDecl::boolean("start_quoted", false, "start inside a string"))
    }

    fn create_words(options: OptionStore) -> Box<dyn Lexer> {
        Box::new(GrammarLexer::new(&WORDS, Words, options))
    }

    static WORDS: LexerClass = LexerClass {
        name: "words",
        label: "Words",
        description: "test grammar",
        aliases: &["w"],
        filenames: &[],
        mimetypes: &[],
        interpreters: &[],
        options: words_options,
        analyse: None,
        create: create_words,
    };

    /// Never consumes anything.
    struct Stuck;

    impl Grammar for Stuck {
        type State = ();

        fn initial_state(&self, _options: &OptionStore) {}

        fn step(&self, _: &mut Input<'_>, _: &mut StateStack<()>, _: &OptionStore) -> Step {
            Step::Emit(TokenKind::Text)
        }
    }

    static STUCK: LexerClass = LexerClass {
        name: "stuck",
        label: "Stuck",
        description: "never makes progress",
        aliases: &[],
        filenames: &[],
        mimetypes: &[],
        interpreters: &[],
        options: no_options,
        analyse: None,
        create: create_stuck,
    };

    fn create_stuck(options: OptionStore) -> Box<dyn Lexer> {
        Box::new(GrammarLexer::new(&STUCK, Stuck, options))
    }

    /// Jumps far past the end, then looks at what it consumed.
    struct Overshoot;

    impl Grammar for Overshoot {
        type State = ();

        fn initial_state(&self, _options: &OptionStore) {}

        fn step(&self, input: &mut Input<'_>, _: &mut StateStack<()>, _: &OptionStore) -> Step {
            input.advance(usize::MAX);
            if input.rest().is_empty() && input.peek().is_none() && !input.consumed().is_empty() {
                Step::Emit(TokenKind::Comment)
            } else {
                Step::Emit(TokenKind::Error)
            }
        }
    }

    static OVERSHOOT: LexerClass = LexerClass {
        name: "overshoot",
        label: "Overshoot",
        description: "advances past the end",
        aliases: &[],
        filenames: &[],
        mimetypes: &[],
        interpreters: &[],
        options: no_options,
        analyse: None,
        create: create_overshoot,
    };

    fn create_overshoot(options: OptionStore) -> Box<dyn Lexer> {
        Box::new(GrammarLexer::new(&OVERSHOOT, Overshoot, options))
    }

    fn kinds(lexer: &dyn Lexer, source: &str) -> Vec<(TokenKind, usize, String)> {
        lexer
            .tokenize(source)
            .map(|t| (t.kind, t.offset, t.text.to_string()))
            .collect()
    }

    #[test]
    fn test_tokens_cover_input() {
        let lexer = WORDS.new_lexer().unwrap();
        let source = "hello, \"big\" world";
        let tokens: Vec<_> = lexer.tokenize(source).collect();
        let joined: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, source);
        let mut offset = 0;
        for token in &tokens {
            assert_eq!(token.offset, offset);
            assert!(!token.is_empty());
            offset = token.end();
        }
    }

    #[test]
    fn test_retokenize_is_independent() {
        let lexer = WORDS.new_lexer().unwrap();
        let first = kinds(lexer.as_ref(), "a \"b");
        let second = kinds(lexer.as_ref(), "a \"b");
        assert_eq!(first, second);
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let lexer = WORDS.new_lexer().unwrap();
        let mut tokens = lexer.tokenize("say \"hi");
        let collected: Vec<_> = tokens.by_ref().collect();
        assert_eq!(collected.last().unwrap().kind, TokenKind::StringDouble);
        assert_eq!(collected.last().unwrap().text, "hi");
        assert_eq!(
            tokens.diagnostics(),
            vec![Diagnostic::MalformedInput {
                lexer: "words",
                offset: 7,
                depth: 1
            }]
        );
    }

    #[test]
    fn test_initial_state_from_option() {
        let mut lexer = WORDS.new_lexer().unwrap();
        lexer.set_option("start_quoted", true.into()).unwrap();
        let tokens = kinds(lexer.as_ref(), "abc\" x");
        assert_eq!(tokens[0], (TokenKind::StringDouble, 0, "abc".into()));
    }

    #[test]
    fn test_delegate_without_secondary() {
        let lexer = WORDS.new_lexer().unwrap();
        let tokens = kinds(lexer.as_ref(), "a[b c]d");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Name, 0, "a".into()),
                (TokenKind::Punctuation, 1, "[".into()),
                (TokenKind::Text, 2, "b c".into()),
                (TokenKind::Punctuation, 5, "]".into()),
                (TokenKind::Name, 6, "d".into()),
            ]
        );
    }

    #[test]
    fn test_delegate_to_secondary() {
        let mut lexer = WORDS.new_lexer().unwrap();
        lexer
            .set_option(SECONDARY, WORDS.new_lexer().unwrap().into())
            .unwrap();
        let source = "a[b \"c]d\"";
        let tokens = kinds(lexer.as_ref(), source);
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Name, 0, "a".into()),
                (TokenKind::Punctuation, 1, "[".into()),
                (TokenKind::Name, 2, "b".into()),
                (TokenKind::Ignorable, 3, " ".into()),
                (TokenKind::StringDouble, 4, "\"".into()),
                (TokenKind::StringDouble, 5, "c".into()),
                (TokenKind::Punctuation, 6, "]".into()),
                (TokenKind::Name, 7, "d".into()),
                (TokenKind::StringDouble, 8, "\"".into()),
            ]
        );
    }

    #[test]
    fn test_secondary_state_survives_between_spans() {
        let mut lexer = WORDS.new_lexer().unwrap();
        lexer
            .set_option(SECONDARY, WORDS.new_lexer().unwrap().into())
            .unwrap();
        // the string opened in the first block is still open in the second
        let tokens = kinds(lexer.as_ref(), "[\"a]x[b c]");
        let inner: Vec<_> = tokens
            .iter()
            .filter(|(_, offset, _)| (6..9).contains(offset))
            .map(|(kind, _, _)| *kind)
            .collect();
        assert_eq!(inner, vec![TokenKind::StringDouble]);
    }

    #[test]
    fn test_replacing_secondary_returns_previous() {
        let mut lexer = WORDS.new_lexer().unwrap();
        lexer
            .set_option(SECONDARY, WORDS.new_lexer().unwrap().into())
            .unwrap();
        let previous = lexer
            .options_mut()
            .replace(SECONDARY, OptionValue::Lexer(None))
            .unwrap();
        assert_eq!(previous.as_lexer().map(|l| l.name()), Some("words"));
        assert!(lexer.options().lexer(SECONDARY).is_none());
    }

    #[test]
    fn test_stalled_grammar_terminates() {
        let lexer = STUCK.new_lexer().unwrap();
        let mut tokens = lexer.tokenize("ab");
        let collected: Vec<_> = tokens.by_ref().collect();
        assert_eq!(collected.len(), 2);
        assert!(collected.iter().all(|t| t.kind == TokenKind::Error));
        assert_eq!(tokens.diagnostics().len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let lexer = WORDS.new_lexer().unwrap();
        assert_eq!(lexer.tokenize("").count(), 0);
    }

    #[test]
    fn test_input_helpers() {
        let mut input = Input::new("  <?php echo");
        assert!(input.at_line_start());
        input.eat_while(|c| c == ' ');
        assert!(input.at_line_start());
        assert!(input.starts_with_ignore_case("<?PHP"));
        assert!(input.eat_ignore_case("<?PHP"));
        assert!(!input.at_line_start());
        assert!(!input.skip_past("?>"));
        assert!(input.is_eof());
    }

    #[test]
    fn test_advance_stops_at_end_and_char_boundary() {
        let mut input = Input::new("é!");
        input.advance(1);
        assert_eq!(input.pos(), 2);
        assert_eq!(input.consumed(), "é");
        input.advance(40);
        assert_eq!(input.pos(), 3);
        assert_eq!(input.rest(), "");
        assert!(input.is_eof());
    }

    #[test]
    fn test_overshooting_grammar_is_clamped() {
        let lexer = OVERSHOOT.new_lexer().unwrap();
        assert_eq!(
            kinds(lexer.as_ref(), "héllo"),
            vec![(TokenKind::Comment, 0, "héllo".to_string())]
        );
    }
}
