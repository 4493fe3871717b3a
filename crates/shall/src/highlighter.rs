//! High-level syntax highlighting API with a shared registry.
//!
//! - [`Highlighter`]: any registered formatter, HTML by default
//! - [`AnsiHighlighter`]: terminal output colored from a [`Theme`]
//!
//! # Thread Safety
//!
//! The registry is built once and shared via `Arc<Registry>`. Lexers and
//! formatters are created per call, so highlighters hold no mutable state
//! and [`Highlighter::fork`] is only a cheap clone for another thread.
//!
//! ```rust,ignore
//! let hl = Highlighter::new()?;
//! let handles: Vec<_> = sources
//!     .into_iter()
//!     .map(|code| {
//!         let hl = hl.fork();
//!         std::thread::spawn(move || hl.highlight("c", &code))
//!     })
//!     .collect();
//! ```

use std::io::Write;
use std::sync::Arc;

use shall_highlight::{
    Formatter, HighlightConfig, Lexer, Theme, highlight_to_writer, highlight_with_config,
};

use crate::error::Error;
use crate::registry::Registry;

/// Configuration of a [`Highlighter`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the formatter to render with.
    pub formatter: String,
    pub highlight: HighlightConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formatter: "html".to_string(),
            highlight: HighlightConfig::default(),
        }
    }
}

/// Highlights source code with a lexer found by name or by guessing.
///
/// Languages are given as lexer queries, so options can ride along:
/// `"php?start_inline"`, `"php?secondary=html"`.
#[derive(Debug, Clone)]
pub struct Highlighter {
    registry: Arc<Registry>,
    config: Config,
}

impl Highlighter {
    /// A highlighter over the builtin registry, rendering HTML.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Result<Self, Error> {
        Ok(Self::with_registry_and_config(
            Arc::new(Registry::builtin()?),
            config,
        ))
    }

    /// Create a new highlighter over a shared registry.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self::with_registry_and_config(registry, Config::default())
    }

    pub fn with_registry_and_config(registry: Arc<Registry>, config: Config) -> Self {
        Self { registry, config }
    }

    /// A new highlighter sharing this one's registry and configuration.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Highlight `source` written in `language` (a lexer query).
    pub fn highlight(&self, language: &str, source: &str) -> Result<String, Error> {
        let lexer = self.registry.lexer_from_query(language)?;
        self.render(lexer.as_ref(), source)
    }

    /// Highlight `source`, guessing its language from its content and
    /// optionally its file name.
    pub fn highlight_guessed(
        &self,
        source: &str,
        filename: Option<&str>,
    ) -> Result<String, Error> {
        let lexer = self.registry.lexer_guess(source, filename, [])?;
        self.render(lexer.as_ref(), source)
    }

    /// Highlight source code and write the output directly to a writer.
    pub fn highlight_to_writer<W: Write>(
        &self,
        writer: &mut W,
        language: &str,
        source: &str,
    ) -> Result<(), Error> {
        let lexer = self.registry.lexer_from_query(language)?;
        let mut formatter = self.formatter()?;
        let diagnostics = highlight_to_writer(
            writer,
            source,
            lexer.as_ref(),
            formatter.as_mut(),
            &self.config.highlight,
        )?;
        for diagnostic in diagnostics {
            tracing::debug!(%diagnostic, "recovered while highlighting");
        }
        Ok(())
    }

    fn formatter(&self) -> Result<Box<dyn Formatter>, Error> {
        self.registry.new_formatter(&self.config.formatter, [])
    }

    fn render(&self, lexer: &dyn Lexer, source: &str) -> Result<String, Error> {
        let mut formatter = self.formatter()?;
        self.render_with(lexer, formatter.as_mut(), source)
    }

    fn render_with(
        &self,
        lexer: &dyn Lexer,
        formatter: &mut dyn Formatter,
        source: &str,
    ) -> Result<String, Error> {
        let highlighted = highlight_with_config(source, lexer, formatter, &self.config.highlight)?;
        for diagnostic in &highlighted.diagnostics {
            tracing::debug!(%diagnostic, "recovered while highlighting");
        }
        Ok(highlighted.output)
    }
}

/// Syntax highlighter for ANSI terminal output.
///
/// It owns a [`Theme`] which determines the colors used for each kind of
/// token. Lines are wrapped at [`AnsiHighlighter::width`] columns when it is
/// positive, or at the terminal width when it is `-1`.
#[derive(Debug, Clone)]
pub struct AnsiHighlighter {
    inner: Highlighter,
    theme: Theme,
    width: i64,
}

impl AnsiHighlighter {
    /// Create a new ANSI highlighter with the given theme.
    pub fn new(theme: Theme) -> Result<Self, Error> {
        Ok(Self::with_registry(Arc::new(Registry::builtin()?), theme))
    }

    pub fn with_registry(registry: Arc<Registry>, theme: Theme) -> Self {
        let config = Config {
            formatter: "terminal".to_string(),
            ..Config::default()
        };
        Self {
            inner: Highlighter::with_registry_and_config(registry, config),
            theme,
            width: 0,
        }
    }

    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.inner.registry()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    /// Wrap width: 0 never wraps, -1 uses the terminal width.
    pub fn set_width(&mut self, width: i64) {
        self.width = width;
    }

    /// Highlight source code and return an ANSI-colored string.
    pub fn highlight(&self, language: &str, source: &str) -> Result<String, Error> {
        let lexer = self.inner.registry.lexer_from_query(language)?;
        let mut formatter = self.inner.registry.new_formatter(
            &self.inner.config.formatter,
            [
                ("theme", self.theme.clone().into()),
                ("width", self.width.into()),
            ],
        )?;
        self.inner.render_with(lexer.as_ref(), formatter.as_mut(), source)
    }
}
