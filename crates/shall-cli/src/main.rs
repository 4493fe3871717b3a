use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use shall::highlight::{SECONDARY, highlight_to_writer};
use shall::theme::builtin;
use shall::{Formatter, HighlightConfig, Lexer, LexerEntry, Registry, Theme, split_query};
use std::collections::HashMap;
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod list;

/// Shall syntax highlighter - source code to terminal colors, HTML and more
#[derive(Debug, Parser)]
#[command(name = "shall", version)]
struct Args {
    /// Lexer to use, with options: `php?start_inline&secondary=html`
    ///
    /// May be given several times. Without --chain, each file uses the one
    /// matching its name, or the first one.
    #[arg(short = 'l', long = "lexer", value_name = "QUERY")]
    lexers: Vec<String>,

    /// Make each --lexer the secondary lexer of the one before it
    #[arg(short, long)]
    chain: bool,

    /// Output format
    #[arg(short, long, default_value = "terminal")]
    formatter: String,

    /// Option for every lexer in use
    #[arg(short = 'o', long = "lexer-option", value_name = "NAME=VALUE")]
    lexer_options: Vec<String>,

    /// Option for the formatter
    #[arg(short = 'O', long = "formatter-option", value_name = "NAME=VALUE")]
    formatter_options: Vec<String>,

    /// Builtin theme for formatters that take one
    #[arg(short, long, conflicts_with = "theme_file")]
    theme: Option<String>,

    /// Theme loaded from a TOML file
    #[arg(long, value_name = "PATH")]
    theme_file: Option<PathBuf>,

    /// List the available lexers, formatters or themes, then exit
    #[arg(short = 'L', long, value_enum)]
    list: Option<list::Listing>,

    /// Print the theme as CSS, scoped under SCOPE if given, then exit
    #[arg(long, value_name = "SCOPE", num_args = 0..=1, default_missing_value = "")]
    css: Option<String>,

    /// Render runs of tokens of the same kind as one
    #[arg(long)]
    coalesce: bool,

    /// Print file names and log what the highlighter decides
    #[arg(short, long)]
    verbose: bool,

    /// Files to highlight; none or `-` reads standard input
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:#}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Report a problem that does not stop the run.
fn warn(message: impl std::fmt::Display) {
    if io::stderr().is_terminal() {
        eprintln!("{}: {message}", "warning".yellow().bold());
    } else {
        eprintln!("warning: {message}");
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let registry = Registry::builtin().context("building the lexer registry")?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(listing) = args.list {
        list::print(listing, &registry, &mut out)?;
        out.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let theme = load_theme(args.theme.as_deref(), args.theme_file.as_deref())?;
    if let Some(scope) = &args.css {
        let theme = theme.unwrap_or_else(builtin::monokai);
        out.write_all(theme.to_css(scope).as_bytes())?;
        out.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut formatter = build_formatter(&registry, &args.formatter, &args.formatter_options)?;
    if let Some(theme) = theme {
        apply_theme(formatter.as_mut(), theme);
    }

    let lexer_options: Vec<(String, String)> = args
        .lexer_options
        .iter()
        .map(String::as_str)
        .map(split_assignment)
        .collect();
    let mut lexers = Lexers::new(&registry, &lexer_options);
    for query in &args.lexers {
        lexers.add_explicit(query);
    }
    if args.chain {
        lexers.chain();
    }

    let config = HighlightConfig {
        coalesce_runs: args.coalesce,
    };
    let files = if args.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.files
    };

    let mut failed = false;
    for path in &files {
        let name = path.display().to_string();
        let bytes = match read_input(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("unable to read '{name}', skip: {e}");
                failed = true;
                continue;
            }
        };
        if bytes.contains(&0) {
            eprintln!("{name}: binary file found, skip");
            continue;
        }
        let source = match String::from_utf8(bytes) {
            Ok(source) => source,
            Err(e) => {
                warn(format_args!("{name} is not valid UTF-8, invalid bytes replaced"));
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let filename = (path != Path::new("-")).then_some(name.as_str());
        let lexer = lexers.for_file(filename, &source)?;
        tracing::debug!(file = %name, lexer = lexer.name(), "highlighting");
        if args.verbose {
            writeln!(out, "{name}:")?;
        }
        let diagnostics =
            highlight_to_writer(&mut out, &source, lexer, formatter.as_mut(), &config)
                .with_context(|| format!("highlighting {name}"))?;
        for diagnostic in diagnostics {
            tracing::info!(file = %name, %diagnostic, "recovered");
        }
    }
    out.flush()?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    } else {
        std::fs::read(path)
    }
}

fn load_theme(name: Option<&str>, file: Option<&Path>) -> Result<Option<Theme>> {
    if let Some(name) = name {
        return match builtin::by_name(name) {
            Some(theme) => Ok(Some(theme)),
            None => bail!(
                "unknown theme `{name}` (available: {})",
                builtin::NAMES.join(", ")
            ),
        };
    }
    let Some(path) = file else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading theme {}", path.display()))?;
    let theme =
        Theme::from_toml(&text).with_context(|| format!("parsing theme {}", path.display()))?;
    Ok(Some(theme))
}

fn build_formatter(
    registry: &Registry,
    name: &str,
    options: &[String],
) -> Result<Box<dyn Formatter>> {
    let Some(entry) = registry.formatter_by_name(name) else {
        bail!("unknown formatter `{name}`");
    };
    let mut formatter = entry.new_formatter();
    for option in options {
        let (option, value) = split_assignment(option);
        if let Err(e) = formatter.set_option_str(&option, &value, registry) {
            warn(format_args!("option `{option}` rejected by {name} formatter: {e}"));
        }
    }
    Ok(formatter)
}

/// Give `theme` to the formatter; formatters without a theme option only
/// get a warning.
fn apply_theme(formatter: &mut dyn Formatter, theme: Theme) -> bool {
    match formatter.set_option("theme", theme.into()) {
        Ok(()) => true,
        Err(e) => {
            warn(format_args!("theme ignored: {e}"));
            false
        }
    }
}

/// `name=value`; a bare `name` gets an empty value.
fn split_assignment(option: &str) -> (String, String) {
    let (name, value) = option.split_once('=').unwrap_or((option, ""));
    (name.trim().to_string(), value.to_string())
}

/// The lexers of a run: those asked for with `--lexer`, then those found
/// for each file, created once per language.
struct Lexers<'r> {
    registry: &'r Registry,
    options: &'r [(String, String)],
    explicit: Vec<Box<dyn Lexer>>,
    detected: HashMap<&'static str, Box<dyn Lexer>>,
}

impl<'r> Lexers<'r> {
    fn new(registry: &'r Registry, options: &'r [(String, String)]) -> Self {
        Self {
            registry,
            options,
            explicit: Vec::new(),
            detected: HashMap::new(),
        }
    }

    /// Create a lexer from a query; unknown lexers are skipped.
    fn add_explicit(&mut self, query: &str) {
        let (name, query_options) = split_query(query);
        let Some(entry) = self.registry.by_name(name) else {
            warn(format_args!("skip unknown lexer `{name}`"));
            return;
        };
        let mut lexer = self.create(entry);
        for (option, value) in query_options {
            if let Err(e) = lexer.set_option_str(option, value, self.registry) {
                warn(format_args!("option `{option}` rejected by {name} lexer: {e}"));
            }
        }
        self.explicit.push(lexer);
    }

    /// Fold the explicit lexers into one: each becomes the secondary lexer
    /// of the one before it.
    fn chain(&mut self) {
        let Some(mut inner) = self.explicit.pop() else {
            return;
        };
        while let Some(mut outer) = self.explicit.pop() {
            let inner_name = inner.name();
            if let Err(e) = outer.set_option(SECONDARY, inner.into()) {
                warn(format_args!(
                    "{} cannot delegate to {inner_name}: {e}",
                    outer.name()
                ));
            }
            inner = outer;
        }
        self.explicit.push(inner);
    }

    fn create(&self, entry: &LexerEntry) -> Box<dyn Lexer> {
        let mut lexer = entry.new_lexer();
        for (option, value) in self.options {
            if let Err(e) = lexer.set_option_str(option, value, self.registry) {
                warn(format_args!(
                    "option `{option}` rejected by {} lexer: {e}",
                    entry.name()
                ));
            }
        }
        lexer
    }

    /// The lexer for one file: an explicit one (the one for its file name if
    /// several), else by file name, else guessed from content, else text.
    fn for_file(&mut self, filename: Option<&str>, source: &str) -> Result<&dyn Lexer> {
        let registry = self.registry;
        let by_filename = filename.and_then(|filename| match registry.for_filename(filename) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(filename, %e, "no lexer from the file name");
                None
            }
        });

        if !self.explicit.is_empty() {
            let index = by_filename
                .and_then(|entry| self.explicit.iter().position(|l| l.name() == entry.name()))
                .unwrap_or(0);
            return Ok(self.explicit[index].as_ref());
        }

        let entry = match by_filename {
            Some(entry) => entry,
            None => match registry.guess(source, None) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(%e, "falling back to text");
                    registry
                        .by_name("text")
                        .context("the text lexer is not registered")?
                }
            },
        };
        if !self.detected.contains_key(entry.name()) {
            let lexer = self.create(entry);
            self.detected.insert(entry.name(), lexer);
        }
        self.detected
            .get(entry.name())
            .map(|lexer| lexer.as_ref())
            .context("lexer cache lost an entry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_assignment() {
        assert_eq!(
            split_assignment("linenos=on"),
            ("linenos".to_string(), "on".to_string())
        );
        assert_eq!(
            split_assignment("start_inline"),
            ("start_inline".to_string(), String::new())
        );
        assert_eq!(split_assignment("a=b=c").1, "b=c");
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from([
            "shall", "-l", "php", "-c", "-l", "html", "-O", "linenos", "-f", "html", "a.php",
        ]);
        assert_eq!(args.lexers, vec!["php", "html"]);
        assert!(args.chain);
        assert_eq!(args.formatter, "html");
        assert_eq!(args.files, vec![PathBuf::from("a.php")]);

        let args = Args::parse_from(["shall", "--css"]);
        assert_eq!(args.css.as_deref(), Some(""));
        let args = Args::parse_from(["shall", "--css", ".code"]);
        assert_eq!(args.css.as_deref(), Some(".code"));
    }

    #[test]
    fn test_chain_sets_secondary() {
        let registry = Registry::builtin().unwrap();
        let mut lexers = Lexers::new(&registry, &[]);
        lexers.add_explicit("php");
        lexers.add_explicit("html");
        lexers.chain();

        let lexer = lexers.for_file(Some("page.php"), "").unwrap();
        assert_eq!(lexer.name(), "php");
        assert_eq!(
            lexer.options().lexer(SECONDARY).map(|l| l.name()),
            Some("html")
        );
    }

    #[test]
    fn test_explicit_lexer_matching_the_file_name() {
        let registry = Registry::builtin().unwrap();
        let mut lexers = Lexers::new(&registry, &[]);
        lexers.add_explicit("c");
        lexers.add_explicit("json?");
        lexers.add_explicit("cobol");

        assert_eq!(lexers.for_file(Some("a.json"), "").unwrap().name(), "json");
        assert_eq!(lexers.for_file(Some("a.txt"), "").unwrap().name(), "c");
        assert_eq!(lexers.for_file(None, "").unwrap().name(), "c");
    }

    #[test]
    fn test_detected_lexers() {
        let registry = Registry::builtin().unwrap();
        let options = vec![("start_inline".to_string(), "on".to_string())];
        let mut lexers = Lexers::new(&registry, &options);

        let php = lexers.for_file(None, "#!/usr/bin/php\necho 1;").unwrap();
        assert_eq!(php.name(), "php");
        assert!(php.options().flag("start_inline"));

        assert_eq!(lexers.for_file(Some("x.h"), "").unwrap().name(), "c");
        assert_eq!(lexers.for_file(None, "plain words").unwrap().name(), "text");
        assert_eq!(lexers.detected.len(), 3);
    }

    #[test]
    fn test_apply_theme() {
        let registry = Registry::builtin().unwrap();
        let mut rtf = registry.new_formatter("rtf", []).unwrap();
        assert!(apply_theme(rtf.as_mut(), builtin::molokai()));
        assert_eq!(
            rtf.get_option("theme").unwrap().as_theme().map(|t| t.name.as_str()),
            Some("molokai")
        );

        let mut plain = registry.new_formatter("plain", []).unwrap();
        assert!(!apply_theme(plain.as_mut(), builtin::molokai()));
    }

    #[test]
    fn test_load_theme() {
        assert_eq!(load_theme(Some("Molokai"), None).unwrap().unwrap().name, "molokai");
        assert!(load_theme(Some("solarized"), None).is_err());
        assert!(load_theme(None, None).unwrap().is_none());
    }
}
