//! Token kind definitions - single source of truth.
//!
//! Every lexer classifies its input with the kinds defined here, and every
//! formatter and theme keys its output on them.
//!
//! # Numbering
//!
//! Each kind has a stable `u16` id. The high byte names the root category
//! (`STRING`, `NUMBER`, ...) and the low byte the refinement, so the root of
//! any kind is `id & 0xFF00` and "is this some kind of STRING" is a single
//! comparison. A handful of third-level kinds (`NAME_VARIABLE_CLASS` under
//! `NAME_VARIABLE`) record their parent explicitly; [`TokenKind::is_a`]
//! follows that chain.
//!
//! Ids are never reused or renumbered. New kinds take unused values and bump
//! [`TAXONOMY_VERSION`].

use std::fmt;

/// Version of the kind table.
pub const TAXONOMY_VERSION: u32 = 1;

const ROOT_MASK: u16 = 0xFF00;

macro_rules! token_kinds {
    ($(
        $(#[$meta:meta])*
        $variant:ident = $id:literal, parent: $parent:expr, $name:literal, $class:literal, $doc:literal;
    )*) => {
        /// A token category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum TokenKind {
            $( $(#[$meta])* $variant = $id, )*
        }

        impl TokenKind {
            /// Every kind, in id order.
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant),*];

            /// Look a kind up by its numeric id.
            pub const fn from_id(id: u16) -> Option<TokenKind> {
                match id {
                    $( $id => Some(TokenKind::$variant), )*
                    _ => None,
                }
            }

            /// Upper snake case name (e.g. `STRING_DOUBLE`).
            pub const fn name(self) -> &'static str {
                match self {
                    $( TokenKind::$variant => $name, )*
                }
            }

            /// Short CSS class (e.g. `sd`). Empty for kinds rendered without markup.
            pub const fn css_class(self) -> &'static str {
                match self {
                    $( TokenKind::$variant => $class, )*
                }
            }

            /// Human readable description.
            pub const fn description(self) -> &'static str {
                match self {
                    $( TokenKind::$variant => $doc, )*
                }
            }

            /// The kind this one refines, `None` for root categories.
            pub const fn parent(self) -> Option<TokenKind> {
                match self {
                    $( TokenKind::$variant => $parent, )*
                }
            }
        }
    };
}

token_kinds! {
    Text = 0x0000, parent: None, "TEXT", "", "regular text";
    Ignorable = 0x0001, parent: Some(TokenKind::Text), "IGNORABLE", "", "whitespace and other text without meaning";

    Error = 0x0100, parent: None, "ERROR", "err", "input the lexer could not classify";

    Tag = 0x0200, parent: None, "TAG", "t", "markup or template delimiter";
    TagPreproc = 0x0201, parent: Some(TokenKind::Tag), "TAG_PREPROC", "tp", "preprocessor directive or embedded code delimiter";

    Name = 0x0300, parent: None, "NAME", "n", "identifier";
    NameBuiltin = 0x0301, parent: Some(TokenKind::Name), "NAME_BUILTIN", "nb", "builtin name";
    NameBuiltinPseudo = 0x0302, parent: Some(TokenKind::NameBuiltin), "NAME_BUILTIN_PSEUDO", "bp", "builtin pseudo name (self, this)";
    NameTag = 0x0303, parent: Some(TokenKind::Name), "NAME_TAG", "nt", "markup tag name";
    NameEntity = 0x0304, parent: Some(TokenKind::Name), "NAME_ENTITY", "ne", "markup entity";
    NameAttribute = 0x0305, parent: Some(TokenKind::Name), "NAME_ATTRIBUTE", "na", "attribute or key name";
    NameFunction = 0x0306, parent: Some(TokenKind::Name), "NAME_FUNCTION", "nf", "function name";
    NameClass = 0x0307, parent: Some(TokenKind::Name), "NAME_CLASS", "nc", "class name";
    NameNamespace = 0x0308, parent: Some(TokenKind::Name), "NAME_NAMESPACE", "nn", "namespace name";
    NameVariable = 0x0310, parent: Some(TokenKind::Name), "NAME_VARIABLE", "v", "variable";
    NameVariableClass = 0x0311, parent: Some(TokenKind::NameVariable), "NAME_VARIABLE_CLASS", "vc", "class variable";
    NameVariableInstance = 0x0312, parent: Some(TokenKind::NameVariable), "NAME_VARIABLE_INSTANCE", "vi", "instance variable";
    NameVariableGlobal = 0x0313, parent: Some(TokenKind::NameVariable), "NAME_VARIABLE_GLOBAL", "vg", "global variable";

    Punctuation = 0x0400, parent: None, "PUNCTUATION", "p", "punctuation";

    Keyword = 0x0500, parent: None, "KEYWORD", "k", "keyword";
    KeywordBuiltin = 0x0501, parent: Some(TokenKind::Keyword), "KEYWORD_BUILTIN", "kb", "builtin keyword";
    KeywordConstant = 0x0502, parent: Some(TokenKind::Keyword), "KEYWORD_CONSTANT", "kc", "constant keyword (true, null)";
    KeywordDeclaration = 0x0503, parent: Some(TokenKind::Keyword), "KEYWORD_DECLARATION", "kd", "declaration keyword";
    KeywordNamespace = 0x0504, parent: Some(TokenKind::Keyword), "KEYWORD_NAMESPACE", "kn", "namespace keyword (import, use)";
    KeywordPseudo = 0x0505, parent: Some(TokenKind::Keyword), "KEYWORD_PSEUDO", "kp", "pseudo keyword";
    KeywordReserved = 0x0506, parent: Some(TokenKind::Keyword), "KEYWORD_RESERVED", "kr", "reserved word";
    KeywordType = 0x0507, parent: Some(TokenKind::Keyword), "KEYWORD_TYPE", "kt", "builtin type";

    Operator = 0x0600, parent: None, "OPERATOR", "o", "operator";

    Number = 0x0700, parent: None, "NUMBER", "m", "number";
    NumberFloat = 0x0701, parent: Some(TokenKind::Number), "NUMBER_FLOAT", "mf", "floating point number";
    NumberDecimal = 0x0702, parent: Some(TokenKind::Number), "NUMBER_DECIMAL", "md", "decimal integer";
    NumberBinary = 0x0703, parent: Some(TokenKind::Number), "NUMBER_BINARY", "mb", "binary integer";
    NumberOctal = 0x0704, parent: Some(TokenKind::Number), "NUMBER_OCTAL", "mo", "octal integer";
    NumberHexadecimal = 0x0705, parent: Some(TokenKind::Number), "NUMBER_HEXADECIMAL", "mh", "hexadecimal integer";

    Comment = 0x0800, parent: None, "COMMENT", "c", "comment";
    CommentSingle = 0x0801, parent: Some(TokenKind::Comment), "COMMENT_SINGLE", "cs", "comment running to the end of the line";
    CommentMultiline = 0x0802, parent: Some(TokenKind::Comment), "COMMENT_MULTILINE", "cm", "delimited comment";
    CommentDocumentation = 0x0803, parent: Some(TokenKind::Comment), "COMMENT_DOCUMENTATION", "cd", "documentation comment";

    String = 0x0900, parent: None, "STRING", "s", "string literal";
    StringSingle = 0x0901, parent: Some(TokenKind::String), "STRING_SINGLE", "ss", "single quoted string";
    StringDouble = 0x0902, parent: Some(TokenKind::String), "STRING_DOUBLE", "sd", "double quoted string";
    StringBacktick = 0x0903, parent: Some(TokenKind::String), "STRING_BACKTICK", "sb", "backtick string";
    StringRegex = 0x0904, parent: Some(TokenKind::String), "STRING_REGEX", "sr", "regular expression literal";
    StringInterned = 0x0905, parent: Some(TokenKind::String), "STRING_INTERNED", "si", "interned string (symbol)";
    StringEscape = 0x0906, parent: Some(TokenKind::String), "STRING_ESCAPE", "es", "escape sequence";
    StringInterpolated = 0x0907, parent: Some(TokenKind::String), "STRING_INTERPOLATED", "is", "interpolated expression";

    Literal = 0x0A00, parent: None, "LITERAL", "l", "other literal";
    LiteralSize = 0x0A01, parent: Some(TokenKind::Literal), "LITERAL_SIZE", "ls", "size literal (10MB)";
    LiteralDuration = 0x0A02, parent: Some(TokenKind::Literal), "LITERAL_DURATION", "ld", "duration literal (5s)";

    Generic = 0x0B00, parent: None, "GENERIC", "g", "generic markup";
    GenericStrong = 0x0B01, parent: Some(TokenKind::Generic), "GENERIC_STRONG", "gb", "strong emphasis";
    GenericHeading = 0x0B02, parent: Some(TokenKind::Generic), "GENERIC_HEADING", "gh", "heading";
    GenericSubheading = 0x0B03, parent: Some(TokenKind::Generic), "GENERIC_SUBHEADING", "gs", "subheading";
    GenericDeleted = 0x0B04, parent: Some(TokenKind::Generic), "GENERIC_DELETED", "gd", "deleted line";
    GenericInserted = 0x0B05, parent: Some(TokenKind::Generic), "GENERIC_INSERTED", "gi", "inserted line";
}

impl TokenKind {
    /// Numeric id, stable across releases.
    #[inline]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// The root category of this kind (itself for roots).
    pub fn root(self) -> TokenKind {
        // Every root id is present in the table, so the lookup cannot miss.
        TokenKind::from_id(self.id() & ROOT_MASK).unwrap_or(self)
    }

    /// True for root categories.
    pub const fn is_root(self) -> bool {
        self.id() & !ROOT_MASK == 0
    }

    /// True if `self` is `ancestor` or one of its refinements.
    pub fn is_a(self, ancestor: TokenKind) -> bool {
        if ancestor.is_root() {
            return self.root() == ancestor;
        }
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Iterate from `self` up to its root, `self` first.
    pub fn ancestry(self) -> impl Iterator<Item = TokenKind> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    /// Lowercase dotted name (e.g. `string.double`), as used in theme files.
    pub fn dotted_name(self) -> String {
        self.name().to_ascii_lowercase().replace('_', ".")
    }

    /// Look a kind up by name. Case-insensitive, `_` and `.` are interchangeable.
    pub fn from_name(name: &str) -> Option<TokenKind> {
        let wanted = name.trim().replace('.', "_");
        TokenKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Free function form of [`TokenKind::is_a`].
#[inline]
pub fn is_a(kind: TokenKind, ancestor: TokenKind) -> bool {
    kind.is_a(ancestor)
}
