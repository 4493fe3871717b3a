//! Shell-style patterns for file names and interpreters.
//!
//! Supports `*`, `?` and bracket classes (`[345]`, `[a-z]`, `[!x]`).
//! Patterns always match the whole name.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct Glob {
    pattern: &'static str,
    regex: Regex,
    specificity: usize,
}

impl Glob {
    pub fn new(pattern: &'static str) -> Result<Self, regex::Error> {
        let (source, specificity) = translate(pattern);
        Ok(Self {
            pattern,
            regex: Regex::new(&source)?,
            specificity,
        })
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Number of literal characters; `*.php` is more specific than `*.p*`.
    pub fn specificity(&self) -> usize {
        self.specificity
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Anchored regex source for `pattern`, and its count of literal characters.
fn translate(pattern: &str) -> (String, usize) {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut literals = 0;
    out.push('^');

    let mut chars = pattern.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&pattern[i..]) {
                Some(len) => {
                    let body = &pattern[i + 1..i + len - 1];
                    out.push('[');
                    let body = match body.strip_prefix('!') {
                        Some(negated) => {
                            out.push('^');
                            negated
                        }
                        None => body,
                    };
                    for b in body.chars() {
                        if matches!(b, '\\' | '[' | ']' | '^' | '&' | '~') {
                            out.push('\\');
                        }
                        out.push(b);
                    }
                    out.push(']');
                    while chars.peek().is_some_and(|&(j, _)| j < i + len) {
                        chars.next();
                    }
                }
                None => {
                    out.push_str(r"\[");
                    literals += 1;
                }
            },
            c => {
                let mut buf = [0; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                literals += 1;
            }
        }
    }

    out.push('$');
    (out, literals)
}

/// Byte length of the bracket class at the start of `s`, brackets included.
fn class_end(s: &str) -> Option<usize> {
    let body = s.strip_prefix('[')?;
    let skip = usize::from(body.starts_with('!'));
    // a `]` right after the opening bracket is part of the class
    let first = body[skip..].chars().next()?;
    let search_from = skip + first.len_utf8();
    body[search_from..]
        .find(']')
        .map(|end| 1 + search_from + end + 1)
}
