//! The formatter lifecycle.
//!
//! A document is rendered by calling, in order:
//!
//! ```text
//! start_document
//!     (start_token, write_token, end_token)*
//! end_document
//! ```
//!
//! Each hook appends its fragment to the buffer it is handed. Every hook has
//! a base implementation in [`base`]; formatters override the hooks they
//! care about, and an override that wants the base output as well calls the
//! base function explicitly.
//!
//! [`Session`] enforces the order for callers that drive a formatter by hand.

use crate::error::{FormatError, HighlightError, OptionError};
use crate::options::{OptionSchema, OptionStore, OptionValue, Resolver, SchemaBuilder};
use crate::token::Token;
use shall_theme::TokenKind;
use std::fmt;
use std::sync::Arc;

/// Static description of a formatter kind.
#[derive(Debug)]
pub struct FormatterClass {
    pub name: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    pub options: fn(SchemaBuilder) -> SchemaBuilder,
    pub create: fn(OptionStore) -> Box<dyn Formatter>,
}

impl FormatterClass {
    pub fn schema(&self) -> Result<OptionSchema, OptionError> {
        (self.options)(OptionSchema::builder(self.name)).build()
    }

    pub fn instantiate(&self, schema: Arc<OptionSchema>) -> Box<dyn Formatter> {
        (self.create)(OptionStore::new(schema))
    }

    pub fn new_formatter(&self) -> Result<Box<dyn Formatter>, OptionError> {
        Ok(self.instantiate(Arc::new(self.schema()?)))
    }

    /// Case-insensitive match on the name and aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Renders a token stream.
pub trait Formatter: Send {
    fn class(&self) -> &'static FormatterClass;

    fn options(&self) -> &OptionStore;

    fn options_mut(&mut self) -> &mut OptionStore;

    fn start_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        base::start_document(out)
    }

    fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        base::start_token(kind, out)
    }

    fn write_token(&mut self, token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        base::write_token(token, out)
    }

    fn end_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
        base::end_token(kind, out)
    }

    fn end_document(&mut self, out: &mut String) -> Result<(), FormatError> {
        base::end_document(out)
    }

    fn name(&self) -> &'static str {
        self.class().name
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

impl fmt::Debug for dyn Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("name", &self.name())
            .field("options", self.options())
            .finish()
    }
}

/// Base hook implementations: no markup, token text copied verbatim.
pub mod base {
    use super::*;

    pub fn start_document(_out: &mut String) -> Result<(), FormatError> {
        Ok(())
    }

    pub fn start_token(_kind: TokenKind, _out: &mut String) -> Result<(), FormatError> {
        Ok(())
    }

    pub fn write_token(token: &Token<'_>, out: &mut String) -> Result<(), FormatError> {
        out.push_str(token.text);
        Ok(())
    }

    pub fn end_token(_kind: TokenKind, _out: &mut String) -> Result<(), FormatError> {
        Ok(())
    }

    pub fn end_document(_out: &mut String) -> Result<(), FormatError> {
        Ok(())
    }
}

/// Where a [`Session`] is in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    DocumentOpen,
    TokenOpen(TokenKind),
    DocumentClosed,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::Idle => "no document is open",
            Phase::DocumentOpen => "the document is open",
            Phase::TokenOpen(_) => "a token is open",
            Phase::DocumentClosed => "the document is closed",
        }
    }
}

/// Drives a formatter through one document, rejecting out-of-order calls.
pub struct Session<'f> {
    formatter: &'f mut dyn Formatter,
    phase: Phase,
    out: String,
}

impl<'f> Session<'f> {
    pub fn new(formatter: &'f mut dyn Formatter) -> Self {
        Self {
            formatter,
            phase: Phase::Idle,
            out: String::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn violation(&self, hook: &'static str) -> HighlightError {
        HighlightError::Lifecycle {
            hook,
            state: self.phase.describe(),
        }
    }

    pub fn start_document(&mut self) -> Result<(), HighlightError> {
        if self.phase != Phase::Idle {
            return Err(self.violation("start_document"));
        }
        self.formatter.start_document(&mut self.out)?;
        self.phase = Phase::DocumentOpen;
        Ok(())
    }

    pub fn start_token(&mut self, kind: TokenKind) -> Result<(), HighlightError> {
        if self.phase != Phase::DocumentOpen {
            return Err(self.violation("start_token"));
        }
        self.formatter.start_token(kind, &mut self.out)?;
        self.phase = Phase::TokenOpen(kind);
        Ok(())
    }

    /// Write a token of the kind currently open. Several tokens of the same
    /// kind may be written between one `start_token` and `end_token`.
    pub fn write_token(&mut self, token: &Token<'_>) -> Result<(), HighlightError> {
        match self.phase {
            Phase::TokenOpen(kind) if kind == token.kind => {
                self.formatter.write_token(token, &mut self.out)?;
                Ok(())
            }
            _ => Err(self.violation("write_token")),
        }
    }

    pub fn end_token(&mut self) -> Result<(), HighlightError> {
        let Phase::TokenOpen(kind) = self.phase else {
            return Err(self.violation("end_token"));
        };
        self.formatter.end_token(kind, &mut self.out)?;
        self.phase = Phase::DocumentOpen;
        Ok(())
    }

    /// `start_token`, `write_token` and `end_token` for one token.
    pub fn token(&mut self, token: &Token<'_>) -> Result<(), HighlightError> {
        self.start_token(token.kind)?;
        self.write_token(token)?;
        self.end_token()
    }

    pub fn end_document(&mut self) -> Result<(), HighlightError> {
        if self.phase != Phase::DocumentOpen {
            return Err(self.violation("end_document"));
        }
        self.formatter.end_document(&mut self.out)?;
        self.phase = Phase::DocumentClosed;
        Ok(())
    }

    /// Output produced so far and not yet taken.
    pub fn pending(&self) -> &str {
        &self.out
    }

    /// Take the output produced so far, for streaming.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.out)
    }

    /// The rest of the output, once the document is closed.
    pub fn finish(self) -> Result<String, HighlightError> {
        if self.phase != Phase::DocumentClosed {
            return Err(self.violation("finish"));
        }
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::no_options;

    /// Records every hook call as a fragment.
    struct Recorder {
        options: OptionStore,
    }

    impl Formatter for Recorder {
        fn class(&self) -> &'static FormatterClass {
            &RECORDER
        }

        fn options(&self) -> &OptionStore {
            &self.options
        }

        fn options_mut(&mut self) -> &mut OptionStore {
            &mut self.options
        }

        fn start_document(&mut self, out: &mut String) -> Result<(), FormatError> {
            out.push_str("<doc>");
            Ok(())
        }

        fn start_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
            out.push_str(&format!("<{}>", kind.css_class()));
            Ok(())
        }

        fn end_token(&mut self, kind: TokenKind, out: &mut String) -> Result<(), FormatError> {
            out.push_str(&format!("</{}>", kind.css_class()));
            Ok(())
        }

        fn end_document(&mut self, out: &mut String) -> Result<(), FormatError> {
            out.push_str("</doc>");
            Ok(())
        }
    }

    fn create_recorder(options: OptionStore) -> Box<dyn Formatter> {
        Box::new(Recorder { options })
    }

    static RECORDER: FormatterClass = FormatterClass {
        name: "recorder",
        description: "records hook calls",
        aliases: &["rec"],
        options: no_options,
        create: create_recorder,
    };

    #[test]
    fn test_session_order() {
        let mut formatter = RECORDER.new_formatter().unwrap();
        let mut session = Session::new(formatter.as_mut());
        session.start_document().unwrap();
        session
            .token(&Token::new(TokenKind::Keyword, 0, "fn"))
            .unwrap();
        session.end_document().unwrap();
        assert_eq!(session.finish().unwrap(), "<doc><k>fn</k></doc>");
    }

    #[test]
    fn test_session_rejects_out_of_order_calls() {
        let mut formatter = RECORDER.new_formatter().unwrap();
        let mut session = Session::new(formatter.as_mut());
        assert!(matches!(
            session.start_token(TokenKind::Keyword),
            Err(HighlightError::Lifecycle {
                hook: "start_token",
                ..
            })
        ));
        session.start_document().unwrap();
        assert!(session.start_document().is_err());
        assert!(session.end_token().is_err());
        session.start_token(TokenKind::Keyword).unwrap();
        assert!(session
            .write_token(&Token::new(TokenKind::Name, 0, "x"))
            .is_err());
        assert!(session.end_document().is_err());
        session.end_token().unwrap();
        session.end_document().unwrap();
        assert!(session.start_document().is_err());
    }

    #[test]
    fn test_finish_requires_closed_document() {
        let mut formatter = RECORDER.new_formatter().unwrap();
        let mut session = Session::new(formatter.as_mut());
        session.start_document().unwrap();
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_take_output_streams_fragments() {
        let mut formatter = RECORDER.new_formatter().unwrap();
        let mut session = Session::new(formatter.as_mut());
        session.start_document().unwrap();
        assert_eq!(session.take_output(), "<doc>");
        session.start_token(TokenKind::Keyword).unwrap();
        session
            .write_token(&Token::new(TokenKind::Keyword, 0, "if"))
            .unwrap();
        session
            .write_token(&Token::new(TokenKind::Keyword, 2, "else"))
            .unwrap();
        session.end_token().unwrap();
        session.end_document().unwrap();
        assert_eq!(session.finish().unwrap(), "<k>ifelse</k></doc>");
    }

    #[test]
    fn test_base_write_token_copies_text() {
        let mut out = String::new();
        base::write_token(&Token::new(TokenKind::Text, 0, "a<b"), &mut out).unwrap();
        assert_eq!(out, "a<b");
    }

    #[test]
    fn test_answers_to_is_case_insensitive() {
        assert!(RECORDER.answers_to("Recorder"));
        assert!(RECORDER.answers_to("REC"));
        assert!(!RECORDER.answers_to("html"));
    }
}
