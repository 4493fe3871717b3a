//! The table of known lexers and formatters, and language guessing.
//!
//! A [`Registry`] is built once, from the builtin classes or from any set
//! of [`LexerClass`]es and [`FormatterClass`]es, and is immutable
//! afterwards. Option schemas and patterns are validated while building,
//! so every lookup afterwards is infallible except for "not found".
//!
//! ```rust,ignore
//! let registry = Registry::builtin()?;
//! let lexer = registry.lexer_guess("#!/usr/bin/env php\n<?php echo 1; ?>", None, [])?;
//! assert_eq!(lexer.name(), "php");
//! ```

use std::path::Path;
use std::sync::Arc;

use shall_highlight::{
    Formatter, FormatterClass, Lexer, LexerClass, OptionSchema, OptionValue, Resolver, render,
};

use crate::error::{Error, RegistryError};
use crate::glob::Glob;
use crate::lexers;

/// A registered lexer class with its built schema and compiled patterns.
#[derive(Debug)]
pub struct LexerEntry {
    class: &'static LexerClass,
    schema: Arc<OptionSchema>,
    filenames: Vec<Glob>,
    interpreters: Vec<Glob>,
}

impl LexerEntry {
    fn new(class: &'static LexerClass) -> Result<Self, RegistryError> {
        let compile = |patterns: &'static [&'static str]| {
            patterns
                .iter()
                .map(|&pattern| {
                    Glob::new(pattern).map_err(|source| RegistryError::Pattern {
                        owner: class.name,
                        pattern,
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            class,
            schema: Arc::new(class.schema()?),
            filenames: compile(class.filenames)?,
            interpreters: compile(class.interpreters)?,
        })
    }

    pub fn class(&self) -> &'static LexerClass {
        self.class
    }

    pub fn name(&self) -> &'static str {
        self.class.name
    }

    pub fn schema(&self) -> &Arc<OptionSchema> {
        &self.schema
    }

    /// A fresh instance with default options.
    pub fn new_lexer(&self) -> Box<dyn Lexer> {
        self.class.instantiate(self.schema.clone())
    }

    /// Specificity of the best file name pattern matching `basename`.
    fn filename_score(&self, basename: &str) -> Option<usize> {
        self.filenames
            .iter()
            .filter(|glob| glob.matches(basename))
            .map(Glob::specificity)
            .max()
    }

    fn runs_under(&self, interpreter: &str) -> bool {
        self.interpreters.iter().any(|glob| glob.matches(interpreter))
    }
}

/// A registered formatter class with its built schema.
#[derive(Debug)]
pub struct FormatterEntry {
    class: &'static FormatterClass,
    schema: Arc<OptionSchema>,
}

impl FormatterEntry {
    pub fn class(&self) -> &'static FormatterClass {
        self.class
    }

    pub fn name(&self) -> &'static str {
        self.class.name
    }

    pub fn schema(&self) -> &Arc<OptionSchema> {
        &self.schema
    }

    pub fn new_formatter(&self) -> Box<dyn Formatter> {
        self.class.instantiate(self.schema.clone())
    }
}

/// Collects classes for a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    lexers: Vec<&'static LexerClass>,
    formatters: Vec<&'static FormatterClass>,
}

impl RegistryBuilder {
    pub fn lexer(mut self, class: &'static LexerClass) -> Self {
        self.lexers.push(class);
        self
    }

    pub fn lexers(mut self, classes: impl IntoIterator<Item = &'static LexerClass>) -> Self {
        self.lexers.extend(classes);
        self
    }

    pub fn formatter(mut self, class: &'static FormatterClass) -> Self {
        self.formatters.push(class);
        self
    }

    pub fn formatters(
        mut self,
        classes: impl IntoIterator<Item = &'static FormatterClass>,
    ) -> Self {
        self.formatters.extend(classes);
        self
    }

    /// Build schemas, compile patterns and check that names are unique.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut names: Vec<(&'static str, &'static str)> = Vec::new();
        for class in &self.lexers {
            for name in std::iter::once(class.name).chain(class.aliases.iter().copied()) {
                claim(&mut names, name, class.name, |a, b| a == b)?;
            }
        }
        let lexers = self
            .lexers
            .into_iter()
            .map(LexerEntry::new)
            .collect::<Result<Vec<_>, _>>()?;

        names.clear();
        for class in &self.formatters {
            for name in std::iter::once(class.name).chain(class.aliases.iter().copied()) {
                claim(&mut names, name, class.name, str::eq_ignore_ascii_case)?;
            }
        }
        let formatters = self
            .formatters
            .into_iter()
            .map(|class| -> Result<FormatterEntry, RegistryError> {
                Ok(FormatterEntry {
                    class,
                    schema: Arc::new(class.schema()?),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            lexers = lexers.len(),
            formatters = formatters.len(),
            "registry built"
        );
        Ok(Registry { lexers, formatters })
    }
}

fn claim(
    names: &mut Vec<(&'static str, &'static str)>,
    name: &'static str,
    owner: &'static str,
    same: fn(&str, &str) -> bool,
) -> Result<(), RegistryError> {
    if let Some(&(_, first)) = names.iter().find(|(taken, _)| same(taken, name)) {
        return Err(RegistryError::Duplicate {
            name,
            first,
            second: owner,
        });
    }
    names.push((name, owner));
    Ok(())
}

/// Immutable table of lexers and formatters.
///
/// Share it between threads behind an `Arc`; every lookup takes `&self`.
#[derive(Debug)]
pub struct Registry {
    lexers: Vec<LexerEntry>,
    formatters: Vec<FormatterEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every builtin lexer and formatter.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::builder()
            .lexers(lexers::builtin())
            .formatters(render::BUILTIN.iter().copied())
            .build()
    }

    /// Lexers in registration order.
    pub fn lexers(&self) -> impl Iterator<Item = &LexerEntry> {
        self.lexers.iter()
    }

    /// Formatters in registration order.
    pub fn formatters(&self) -> impl Iterator<Item = &FormatterEntry> {
        self.formatters.iter()
    }

    /// The lexer whose canonical name or alias is exactly `name`.
    pub fn by_name(&self, name: &str) -> Option<&LexerEntry> {
        self.lexers.iter().find(|entry| entry.class.answers_to(name))
    }

    pub fn for_mimetype(&self, mimetype: &str) -> Option<&LexerEntry> {
        self.lexers
            .iter()
            .find(|entry| entry.class.mimetypes.contains(&mimetype))
    }

    /// The lexer whose file name pattern matches the basename of `path` most
    /// specifically.
    pub fn for_filename(&self, path: &str) -> Result<&LexerEntry, Error> {
        let basename = basename(path);
        let scored: Vec<(usize, &LexerEntry)> = self
            .lexers
            .iter()
            .filter_map(|entry| entry.filename_score(basename).map(|score| (score, entry)))
            .collect();
        let Some(best) = scored.iter().map(|&(score, _)| score).max() else {
            return Err(Error::not_found(format!("file name `{basename}`")));
        };
        let mut winners = scored.iter().filter(|&&(score, _)| score == best);
        match (winners.next(), winners.next()) {
            (Some(&(_, entry)), None) => Ok(entry),
            _ => Err(Error::AmbiguousLexer {
                filename: basename.to_string(),
                candidates: scored
                    .iter()
                    .filter(|&&(score, _)| score == best)
                    .map(|(_, entry)| entry.name())
                    .collect(),
            }),
        }
    }

    /// The first lexer registered for the shebang interpreter `name`,
    /// retried without a version suffix (`php54`, `python3.11`).
    pub fn for_interpreter(&self, name: &str) -> Option<&LexerEntry> {
        let find = |name: &str| self.lexers.iter().find(|entry| entry.runs_under(name));
        find(name).or_else(|| {
            let bare = name.trim_end_matches(|c: char| {
                c.is_ascii_digit() || matches!(c, '.' | '-' | '_')
            });
            (!bare.is_empty() && bare != name)
                .then(|| find(bare))
                .flatten()
        })
    }

    /// Guess the language of `content`, optionally knowing its file name.
    ///
    /// In order: the shebang interpreter, the file name, then the scores of
    /// the lexers' content analysers. A tie for the best score is no answer.
    pub fn guess(&self, content: &str, filename: Option<&str>) -> Result<&LexerEntry, Error> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let (shebang, body) = split_shebang(content);

        if let Some(line) = shebang {
            for interpreter in interpreters(line) {
                if let Some(entry) = self.for_interpreter(interpreter) {
                    tracing::debug!(interpreter, lexer = entry.name(), "guessed from shebang");
                    return Ok(entry);
                }
            }
        }

        if let Some(filename) = filename {
            match self.for_filename(filename) {
                Ok(entry) => {
                    tracing::debug!(filename, lexer = entry.name(), "guessed from file name");
                    return Ok(entry);
                }
                Err(err) => tracing::debug!(filename, %err, "file name gave no answer"),
            }
        }

        let mut best: Option<(u32, &LexerEntry)> = None;
        let mut tied = false;
        for entry in &self.lexers {
            let Some(analyse) = entry.class.analyse else {
                continue;
            };
            let score = analyse(body);
            tracing::trace!(lexer = entry.name(), score, "analysed");
            if score == 0 {
                continue;
            }
            match best {
                Some((top, _)) if score < top => {}
                Some((top, _)) if score == top => tied = true,
                _ => {
                    best = Some((score, entry));
                    tied = false;
                }
            }
        }

        match best {
            Some((score, entry)) if !tied => {
                tracing::debug!(lexer = entry.name(), score, "guessed from content");
                Ok(entry)
            }
            Some((score, _)) => {
                tracing::debug!(score, "several lexers share the best score");
                Err(Error::not_found("content (several lexers tie)"))
            }
            None => Err(Error::not_found("content")),
        }
    }

    pub fn formatter_by_name(&self, name: &str) -> Option<&FormatterEntry> {
        self.formatters
            .iter()
            .find(|entry| entry.class.answers_to(name))
    }

    /// Create a lexer by name and apply `options` to it.
    pub fn lexer_by_name<'o>(
        &self,
        name: &str,
        options: impl IntoIterator<Item = (&'o str, OptionValue)>,
    ) -> Result<Box<dyn Lexer>, Error> {
        let entry = self
            .by_name(name)
            .ok_or_else(|| Error::not_found(format!("name `{name}`")))?;
        configure(entry.new_lexer(), options)
    }

    pub fn lexer_for_filename<'o>(
        &self,
        path: &str,
        options: impl IntoIterator<Item = (&'o str, OptionValue)>,
    ) -> Result<Box<dyn Lexer>, Error> {
        configure(self.for_filename(path)?.new_lexer(), options)
    }

    pub fn lexer_for_mimetype<'o>(
        &self,
        mimetype: &str,
        options: impl IntoIterator<Item = (&'o str, OptionValue)>,
    ) -> Result<Box<dyn Lexer>, Error> {
        let entry = self
            .for_mimetype(mimetype)
            .ok_or_else(|| Error::not_found(format!("MIME type `{mimetype}`")))?;
        configure(entry.new_lexer(), options)
    }

    pub fn lexer_guess<'o>(
        &self,
        content: &str,
        filename: Option<&str>,
        options: impl IntoIterator<Item = (&'o str, OptionValue)>,
    ) -> Result<Box<dyn Lexer>, Error> {
        configure(self.guess(content, filename)?.new_lexer(), options)
    }

    /// Create a lexer from `name?option=value;option&...`.
    ///
    /// Options are separated by `;` or `&` and parsed from text, so lexer
    /// options may name other lexers: `php?secondary=html`. A bare option
    /// name stands for the empty string, which is `true` for booleans.
    pub fn lexer_from_query(&self, query: &str) -> Result<Box<dyn Lexer>, Error> {
        let (name, options) = split_query(query);
        let mut lexer = self.lexer_by_name(name, [])?;
        for (option, raw) in options {
            lexer.set_option_str(option, raw, self)?;
        }
        Ok(lexer)
    }

    pub fn new_formatter<'o>(
        &self,
        name: &str,
        options: impl IntoIterator<Item = (&'o str, OptionValue)>,
    ) -> Result<Box<dyn Formatter>, Error> {
        let entry = self
            .formatter_by_name(name)
            .ok_or_else(|| Error::FormatterNotFound {
                name: name.to_string(),
            })?;
        let mut formatter = entry.new_formatter();
        for (option, value) in options {
            formatter.set_option(option, value)?;
        }
        Ok(formatter)
    }
}

impl Resolver for Registry {
    fn lexer(&self, name: &str) -> Option<Box<dyn Lexer>> {
        self.by_name(name).map(LexerEntry::new_lexer)
    }

    fn formatter(&self, name: &str) -> Option<Box<dyn Formatter>> {
        self.formatter_by_name(name).map(FormatterEntry::new_formatter)
    }
}

fn configure<'o>(
    mut lexer: Box<dyn Lexer>,
    options: impl IntoIterator<Item = (&'o str, OptionValue)>,
) -> Result<Box<dyn Lexer>, Error> {
    for (name, value) in options {
        lexer.set_option(name, value)?;
    }
    Ok(lexer)
}

/// Split a lexer query (`php?start_inline&secondary=html`) into the lexer
/// name and its raw options.
pub fn split_query(query: &str) -> (&str, impl Iterator<Item = (&str, &str)>) {
    let (name, options) = query.split_once('?').unwrap_or((query, ""));
    (name, parse_options(options))
}

/// `name=value` pairs of a query string; a bare name gets an empty value.
fn parse_options(options: &str) -> impl Iterator<Item = (&str, &str)> {
    options
        .split([';', '&'])
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
}

fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// The `#!` line (without `#!` and newline) and the text after it.
fn split_shebang(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("#!") else {
        return (None, content);
    };
    match rest.split_once('\n') {
        Some((line, body)) => (Some(line.trim_end_matches('\r')), body),
        None => (Some(rest), ""),
    }
}

/// Interpreter names to try for a shebang line, as basenames.
///
/// `/usr/bin/env` is looked through: its arguments that are not flags are
/// tried in turn, which covers `env -S php -n`.
fn interpreters(line: &str) -> Vec<&str> {
    let mut words = line.split_whitespace();
    let Some(program) = words.next() else {
        return Vec::new();
    };
    let program = basename(program);
    if program == "env" {
        words
            .filter(|word| !word.starts_with('-'))
            .map(basename)
            .collect()
    } else {
        vec![program]
    }
}
