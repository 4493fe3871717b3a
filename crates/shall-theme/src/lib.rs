//! Theme support for shall syntax highlighting.
//!
//! This crate provides:
//! - Token kind definitions (the canonical, versioned list of token categories)
//! - Colors, styles and themes keyed by token kind
//! - CSS and ANSI output generation
//! - Built-in themes (monokai, molokai)
//! - Theme parsing from TOML files (behind the `toml` feature)

pub mod theme;
pub mod tokens;

pub use theme::{Color, Modifiers, Style, Theme, ThemeError, builtin};
pub use tokens::{TAXONOMY_VERSION, TokenKind, is_a};
