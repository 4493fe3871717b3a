//! Test harness for shall lexers.
//!
//! This crate checks the guarantees every lexer makes, whatever its
//! language: the tokens cover the input exactly, in order, without empty
//! tokens, and tokenizing always terminates.
//!
//! # Usage
//!
//! In a crate that defines lexers:
//!
//! ```ignore
//! #[test]
//! fn test_samples() {
//!     let lexer = C.new_lexer().unwrap();
//!     shall_test_harness::test_lexer_samples(lexer.as_ref(), env!("CARGO_MANIFEST_DIR"));
//! }
//! ```

pub use shall_highlight;

use std::fs;
use std::path::{Path, PathBuf};

use shall_highlight::{Diagnostic, Lexer, Token, TokenKind};

/// Tokenizes `source` and checks that the tokens cover it exactly.
///
/// Returns the diagnostics the lexer recovered from, for callers that want
/// to assert on them.
///
/// # Panics
///
/// Panics on an empty token, a gap or overlap between tokens, or if the
/// concatenated token text differs from `source`.
pub fn assert_coverage(lexer: &dyn Lexer, source: &str) -> Vec<Diagnostic> {
    let mut tokens = lexer.tokenize(source);
    let mut expected_offset = 0;
    let mut rebuilt = String::with_capacity(source.len());

    for token in tokens.by_ref() {
        check_token(lexer.name(), &token, expected_offset, source);
        expected_offset = token.end();
        rebuilt.push_str(token.text);
    }

    assert_eq!(
        expected_offset,
        source.len(),
        "{}: tokens stop at byte {} of {}",
        lexer.name(),
        expected_offset,
        source.len()
    );
    assert_eq!(rebuilt, source, "{}: tokens do not rebuild the input", lexer.name());

    tokens.diagnostics()
}

fn check_token(name: &str, token: &Token<'_>, expected_offset: usize, source: &str) {
    assert!(
        !token.is_empty(),
        "{name}: empty {:?} token at byte {}",
        token.kind,
        token.offset
    );
    assert_eq!(
        token.offset, expected_offset,
        "{name}: {:?} token {:?} starts at {} but the previous token ended at {}",
        token.kind, token.text, token.offset, expected_offset
    );
    assert_eq!(
        source.get(token.span()),
        Some(token.text),
        "{name}: {:?} token text does not match the input at {:?}",
        token.kind,
        token.span()
    );
}

/// Tests a lexer against every sample in the crate's `samples/` directory.
///
/// Samples are picked by extension: a file is used when the lexer class
/// lists a file name pattern ending with the same extension (`*.c` matches
/// `samples/hello.c`). Each sample must be fully covered and must produce at
/// least one token that is not plain text.
///
/// # Arguments
///
/// * `lexer` - A configured lexer
/// * `crate_dir` - Path to the crate directory (use `env!("CARGO_MANIFEST_DIR")`)
///
/// # Panics
///
/// Panics if a sample cannot be read, fails [`assert_coverage`], or is all text.
pub fn test_lexer_samples(lexer: &dyn Lexer, crate_dir: &str) {
    let samples = find_samples(lexer, &Path::new(crate_dir).join("samples"));

    for sample_path in &samples {
        let sample_code = fs::read_to_string(sample_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read sample file {} for {}: {}",
                sample_path.display(),
                lexer.name(),
                e
            );
        });

        assert_coverage(lexer, &sample_code);

        let highlighted = lexer
            .tokenize(&sample_code)
            .filter(|token| token.kind != TokenKind::Text)
            .count();
        if highlighted == 0 {
            panic!(
                "No highlights produced for {} by {}.\n\
                 Sample has {} bytes.",
                sample_path.display(),
                lexer.name(),
                sample_code.len()
            );
        }
    }
}

/// Sample files whose extension matches one of the lexer's file patterns.
fn find_samples(lexer: &dyn Lexer, dir: &Path) -> Vec<PathBuf> {
    let extensions: Vec<&str> = lexer
        .class()
        .filenames
        .iter()
        .filter_map(|pattern| pattern.strip_prefix("*."))
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .collect();

    let Ok(entries) = fs::read_dir(dir) else {
        return vec![];
    };
    let mut samples: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .collect();
    samples.sort();
    samples
}
