//! Options shared by template languages.
//!
//! A template lexer handles its code blocks itself and delegates the text
//! around them to the lexer held in its `secondary` option, or emits that
//! text as plain `TEXT` when none is set.

use shall_highlight::{OptionDecl, SECONDARY, SchemaBuilder};

/// Declares the options every template lexer has. Template lexers call it
/// first from their own declaration function.
pub fn template_options(builder: SchemaBuilder) -> SchemaBuilder {
    builder.declare(OptionDecl::lexer(
        SECONDARY,
        "lexer for the text outside of code blocks",
    ))
}
