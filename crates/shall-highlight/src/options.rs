//! Typed, named options for lexers and formatters.
//!
//! A class (lexer or formatter kind) declares its options once, through a
//! [`SchemaBuilder`]. A class extending another calls the parent's
//! declaration function first, then adds or re-declares its own; re-declaring
//! an inherited option may change its default, validator and doc, never its
//! type.
//!
//! Each instance owns an [`OptionStore`] initialized from the declared
//! defaults. Every write goes through [`OptionStore::replace`], which checks
//! the value against the declaration and leaves the previous value in place
//! on failure.

use crate::error::OptionError;
use crate::formatter::Formatter;
use crate::lexer::Lexer;
use shall_theme::{Theme, builtin};
use std::fmt;
use std::mem;
use std::sync::Arc;

/// The declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    Int,
    Str,
    /// A string restricted to the listed values.
    Choice(&'static [&'static str]),
    Theme,
    /// A lexer instance, owned by the option.
    Lexer,
    /// A formatter instance, owned by the option.
    Formatter,
}

impl OptionType {
    fn same_kind(self, other: OptionType) -> bool {
        mem::discriminant(&self) == mem::discriminant(&other)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Str => f.write_str("string"),
            Self::Choice(values) => write!(f, "one of {}", values.join("|")),
            Self::Theme => f.write_str("theme"),
            Self::Lexer => f.write_str("lexer"),
            Self::Formatter => f.write_str("formatter"),
        }
    }
}

/// The current value of an option.
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    /// Used by both `Str` and `Choice` options.
    Str(String),
    Theme(Option<Theme>),
    Lexer(Option<Box<dyn Lexer>>),
    Formatter(Option<Box<dyn Formatter>>),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "string",
            Self::Theme(_) => "theme",
            Self::Lexer(_) => "lexer",
            Self::Formatter(_) => "formatter",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_theme(&self) -> Option<&Theme> {
        match self {
            Self::Theme(theme) => theme.as_ref(),
            _ => None,
        }
    }

    pub fn as_lexer(&self) -> Option<&dyn Lexer> {
        match self {
            Self::Lexer(Some(lexer)) => Some(lexer.as_ref()),
            _ => None,
        }
    }

    pub fn as_formatter(&self) -> Option<&dyn Formatter> {
        match self {
            Self::Formatter(Some(formatter)) => Some(formatter.as_ref()),
            _ => None,
        }
    }

    /// True for instance and theme options holding nothing.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Theme(None) | Self::Lexer(None) | Self::Formatter(None))
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Theme(theme) => write!(f, "Theme({:?})", theme.as_ref().map(|t| &t.name)),
            Self::Lexer(lexer) => write!(f, "Lexer({:?})", lexer.as_ref().map(|l| l.name())),
            Self::Formatter(formatter) => {
                write!(f, "Formatter({:?})", formatter.as_ref().map(|l| l.name()))
            }
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Theme(Some(theme)) => f.write_str(&theme.name),
            Self::Lexer(Some(lexer)) => f.write_str(lexer.name()),
            Self::Formatter(Some(formatter)) => f.write_str(formatter.name()),
            Self::Theme(None) | Self::Lexer(None) | Self::Formatter(None) => f.write_str("-"),
        }
    }
}

/// Instances compare by class name; there is no deeper notion of lexer equality.
impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Theme(a), Self::Theme(b)) => a == b,
            (Self::Lexer(a), Self::Lexer(b)) => {
                a.as_ref().map(|l| l.name()) == b.as_ref().map(|l| l.name())
            }
            (Self::Formatter(a), Self::Formatter(b)) => {
                a.as_ref().map(|l| l.name()) == b.as_ref().map(|l| l.name())
            }
            _ => false,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Theme> for OptionValue {
    fn from(value: Theme) -> Self {
        Self::Theme(Some(value))
    }
}

impl From<Box<dyn Lexer>> for OptionValue {
    fn from(value: Box<dyn Lexer>) -> Self {
        Self::Lexer(Some(value))
    }
}

impl From<Box<dyn Formatter>> for OptionValue {
    fn from(value: Box<dyn Formatter>) -> Self {
        Self::Formatter(Some(value))
    }
}

/// Declared default of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDefault {
    Bool(bool),
    Int(i64),
    Str(&'static str),
    /// No value: empty string, no theme, no instance.
    Unset,
}

/// Extra check run after the type check. Returns the reason on failure.
pub type Validator = fn(&OptionValue) -> Result<(), String>;

/// One declared option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDecl {
    pub name: &'static str,
    pub ty: OptionType,
    pub default: OptionDefault,
    pub validator: Option<Validator>,
    pub doc: &'static str,
}

impl OptionDecl {
    pub const fn new(
        name: &'static str,
        ty: OptionType,
        default: OptionDefault,
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            default,
            validator: None,
            doc,
        }
    }

    pub const fn boolean(name: &'static str, default: bool, doc: &'static str) -> Self {
        Self::new(name, OptionType::Bool, OptionDefault::Bool(default), doc)
    }

    pub const fn integer(name: &'static str, default: i64, doc: &'static str) -> Self {
        Self::new(name, OptionType::Int, OptionDefault::Int(default), doc)
    }

    pub const fn string(name: &'static str, default: &'static str, doc: &'static str) -> Self {
        Self::new(name, OptionType::Str, OptionDefault::Str(default), doc)
    }

    pub const fn choice(
        name: &'static str,
        values: &'static [&'static str],
        default: &'static str,
        doc: &'static str,
    ) -> Self {
        Self::new(
            name,
            OptionType::Choice(values),
            OptionDefault::Str(default),
            doc,
        )
    }

    /// A theme option; `default` names a builtin theme.
    pub const fn theme(
        name: &'static str,
        default: Option<&'static str>,
        doc: &'static str,
    ) -> Self {
        let default = match default {
            Some(theme) => OptionDefault::Str(theme),
            None => OptionDefault::Unset,
        };
        Self::new(name, OptionType::Theme, default, doc)
    }

    pub const fn lexer(name: &'static str, doc: &'static str) -> Self {
        Self::new(name, OptionType::Lexer, OptionDefault::Unset, doc)
    }

    pub const fn formatter(name: &'static str, doc: &'static str) -> Self {
        Self::new(name, OptionType::Formatter, OptionDefault::Unset, doc)
    }

    pub const fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// The value a fresh store starts with.
    pub fn default_value(&self) -> OptionValue {
        match (self.ty, self.default) {
            (OptionType::Bool, OptionDefault::Bool(b)) => OptionValue::Bool(b),
            (OptionType::Bool, OptionDefault::Int(n)) => OptionValue::Bool(n != 0),
            (OptionType::Bool, _) => OptionValue::Bool(false),
            (OptionType::Int, OptionDefault::Int(n)) => OptionValue::Int(n),
            (OptionType::Int, OptionDefault::Bool(b)) => OptionValue::Int(b.into()),
            (OptionType::Int, _) => OptionValue::Int(0),
            (OptionType::Str | OptionType::Choice(_), OptionDefault::Str(s)) => {
                OptionValue::Str(s.to_owned())
            }
            (OptionType::Str | OptionType::Choice(_), _) => OptionValue::Str(String::new()),
            (OptionType::Theme, OptionDefault::Str(name)) => {
                OptionValue::Theme(builtin::by_name(name))
            }
            (OptionType::Theme, _) => OptionValue::Theme(None),
            (OptionType::Lexer, _) => OptionValue::Lexer(None),
            (OptionType::Formatter, _) => OptionValue::Formatter(None),
        }
    }

    /// Convert `value` to this option's type where a lossless conversion exists.
    fn coerce(&self, value: OptionValue) -> OptionValue {
        match (self.ty, value) {
            (OptionType::Bool, OptionValue::Int(n)) => OptionValue::Bool(n != 0),
            (OptionType::Int, OptionValue::Bool(b)) => OptionValue::Int(b.into()),
            (OptionType::Theme, OptionValue::Str(name)) => match builtin::by_name(&name) {
                Some(theme) => OptionValue::Theme(Some(theme)),
                None => OptionValue::Str(name),
            },
            (_, value) => value,
        }
    }

    /// Check `value` against the declared type, choices and validator.
    pub fn check(&self, owner: &'static str, value: &OptionValue) -> Result<(), OptionError> {
        let invalid = |reason: String| OptionError::InvalidOptionValue {
            owner,
            name: self.name.to_owned(),
            reason,
        };

        let type_ok = matches!(
            (self.ty, value),
            (OptionType::Bool, OptionValue::Bool(_))
                | (OptionType::Int, OptionValue::Int(_))
                | (OptionType::Str | OptionType::Choice(_), OptionValue::Str(_))
                | (OptionType::Theme, OptionValue::Theme(_))
                | (OptionType::Lexer, OptionValue::Lexer(_))
                | (OptionType::Formatter, OptionValue::Formatter(_))
        );
        if !type_ok {
            return Err(invalid(format!(
                "expected {}, got {}",
                self.ty,
                value.type_name()
            )));
        }

        if let (OptionType::Choice(values), OptionValue::Str(s)) = (self.ty, value) {
            if !values.contains(&s.as_str()) {
                return Err(invalid(format!(
                    "`{s}` is not one of {}",
                    values.join(", ")
                )));
            }
        }

        if let Some(validator) = self.validator {
            validator(value).map_err(invalid)?;
        }
        Ok(())
    }
}

/// The full set of options declared by a class.
#[derive(Debug, Clone)]
pub struct OptionSchema {
    owner: &'static str,
    decls: Vec<OptionDecl>,
}

impl OptionSchema {
    pub fn builder(owner: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            owner,
            decls: Vec::new(),
            error: None,
        }
    }

    /// A schema declaring nothing.
    pub fn empty(owner: &'static str) -> Self {
        Self {
            owner,
            decls: Vec::new(),
        }
    }

    /// Name of the lexer or formatter class owning these options.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.iter().find(|d| d.name == name)
    }

    fn position(&self, name: &str) -> Result<usize, OptionError> {
        self.decls
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| OptionError::UnknownOption {
                owner: self.owner,
                name: name.to_owned(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Collects declarations; the first conflict is reported by [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct SchemaBuilder {
    owner: &'static str,
    decls: Vec<OptionDecl>,
    error: Option<OptionError>,
}

impl SchemaBuilder {
    pub fn declare(mut self, decl: OptionDecl) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.decls.iter_mut().find(|d| d.name == decl.name) {
            Some(existing) if !existing.ty.same_kind(decl.ty) => {
                self.error = Some(OptionError::ConflictingDeclaration {
                    owner: self.owner,
                    name: decl.name,
                    previous: existing.ty,
                    new: decl.ty,
                });
            }
            Some(existing) => *existing = decl,
            None => self.decls.push(decl),
        }
        self
    }

    pub fn build(self) -> Result<OptionSchema, OptionError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        for decl in &self.decls {
            decl.check(self.owner, &decl.default_value())?;
        }
        Ok(OptionSchema {
            owner: self.owner,
            decls: self.decls,
        })
    }
}

/// Turns names into lexer and formatter instances for textual option values.
pub trait Resolver {
    fn lexer(&self, name: &str) -> Option<Box<dyn Lexer>>;

    fn formatter(&self, _name: &str) -> Option<Box<dyn Formatter>> {
        None
    }
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn lexer(&self, _name: &str) -> Option<Box<dyn Lexer>> {
        None
    }
}

/// Per-instance option values.
pub struct OptionStore {
    schema: Arc<OptionSchema>,
    values: Vec<OptionValue>,
}

impl OptionStore {
    /// A store holding every declared default.
    pub fn new(schema: Arc<OptionSchema>) -> Self {
        let values = schema.decls.iter().map(OptionDecl::default_value).collect();
        Self { schema, values }
    }

    /// A store with some options overridden. Unknown names are an error.
    pub fn with_values<I, K>(schema: Arc<OptionSchema>, values: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        let mut store = Self::new(schema);
        for (name, value) in values {
            store.set(name.as_ref(), value)?;
        }
        Ok(store)
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    pub fn owner(&self) -> &'static str {
        self.schema.owner
    }

    pub fn get(&self, name: &str) -> Result<&OptionValue, OptionError> {
        let index = self.schema.position(name)?;
        Ok(&self.values[index])
    }

    /// Set an option, dropping the previous value.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        self.replace(name, value).map(drop)
    }

    /// Set an option and hand back the previous value.
    pub fn replace(&mut self, name: &str, value: OptionValue) -> Result<OptionValue, OptionError> {
        let index = self.schema.position(name)?;
        let decl = &self.schema.decls[index];
        let value = decl.coerce(value);
        decl.check(self.schema.owner, &value)?;
        tracing::trace!(owner = self.schema.owner, option = name, value = %value, "option set");
        Ok(mem::replace(&mut self.values[index], value))
    }

    /// Restore the declared default, returning the previous value.
    pub fn reset(&mut self, name: &str) -> Result<OptionValue, OptionError> {
        let index = self.schema.position(name)?;
        let default = self.schema.decls[index].default_value();
        Ok(mem::replace(&mut self.values[index], default))
    }

    /// Set an option from its textual form.
    ///
    /// Booleans accept an empty string, `on`/`true`/`yes`, `off`/`false`/`no`
    /// or an integer. Lexer and formatter options look the name up through
    /// `resolver`; an empty string clears them.
    pub fn set_from_str(
        &mut self,
        name: &str,
        raw: &str,
        resolver: &dyn Resolver,
    ) -> Result<(), OptionError> {
        let decl = self
            .schema
            .get(name)
            .ok_or_else(|| OptionError::UnknownOption {
                owner: self.schema.owner,
                name: name.to_owned(),
            })?;
        let value = parse_value(decl, raw, resolver).map_err(|reason| {
            OptionError::InvalidOptionValue {
                owner: self.schema.owner,
                name: name.to_owned(),
                reason,
            }
        })?;
        self.set(name, value)
    }

    /// Boolean value of a declared option, `false` otherwise.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).ok().and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).ok().and_then(OptionValue::as_int)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).ok().and_then(OptionValue::as_str)
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.get(name).ok().and_then(OptionValue::as_theme)
    }

    pub fn lexer(&self, name: &str) -> Option<&dyn Lexer> {
        self.get(name).ok().and_then(OptionValue::as_lexer)
    }

    /// Mutable access to a lexer held by an option, to configure it in place.
    pub fn lexer_mut(&mut self, name: &str) -> Option<&mut (dyn Lexer + 'static)> {
        let index = self.schema.position(name).ok()?;
        match &mut self.values[index] {
            OptionValue::Lexer(Some(lexer)) => Some(lexer.as_mut()),
            _ => None,
        }
    }

    pub fn formatter(&self, name: &str) -> Option<&dyn Formatter> {
        self.get(name).ok().and_then(OptionValue::as_formatter)
    }

    /// Declarations paired with current values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&OptionDecl, &OptionValue)> {
        self.schema.decls.iter().zip(self.values.iter())
    }
}

impl fmt::Debug for OptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(decl, value)| (decl.name, value)))
            .finish()
    }
}

fn parse_value(
    decl: &OptionDecl,
    raw: &str,
    resolver: &dyn Resolver,
) -> Result<OptionValue, String> {
    match decl.ty {
        OptionType::Bool => parse_bool(raw).map(OptionValue::Bool),
        OptionType::Int => raw
            .trim()
            .parse::<i64>()
            .map(OptionValue::Int)
            .map_err(|e| format!("`{raw}` is not an integer: {e}")),
        OptionType::Str | OptionType::Choice(_) => Ok(OptionValue::Str(raw.to_owned())),
        OptionType::Theme if raw.is_empty() => Ok(OptionValue::Theme(None)),
        OptionType::Theme => builtin::by_name(raw)
            .map(|theme| OptionValue::Theme(Some(theme)))
            .ok_or_else(|| format!("unknown theme `{raw}`")),
        OptionType::Lexer if raw.is_empty() => Ok(OptionValue::Lexer(None)),
        OptionType::Lexer => resolver
            .lexer(raw)
            .map(|lexer| OptionValue::Lexer(Some(lexer)))
            .ok_or_else(|| format!("unknown lexer `{raw}`")),
        OptionType::Formatter if raw.is_empty() => Ok(OptionValue::Formatter(None)),
        OptionType::Formatter => resolver
            .formatter(raw)
            .map(|formatter| OptionValue::Formatter(Some(formatter)))
            .ok_or_else(|| format!("unknown formatter `{raw}`")),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(true);
    }
    for yes in ["on", "true", "yes"] {
        if text.eq_ignore_ascii_case(yes) {
            return Ok(true);
        }
    }
    for no in ["off", "false", "no"] {
        if text.eq_ignore_ascii_case(no) {
            return Ok(false);
        }
    }
    text.parse::<i64>()
        .map(|n| n != 0)
        .map_err(|_| format!("`{raw}` is not a boolean"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_negative(value: &OptionValue) -> Result<(), String> {
        match value.as_int() {
            Some(n) if n < 0 => Err(format!("{n} is negative")),
            _ => Ok(()),
        }
    }

    fn base(builder: SchemaBuilder) -> SchemaBuilder {
        builder
            .declare(OptionDecl::boolean("verbose", false, "talk a lot"))
            .declare(OptionDecl::integer("indent", 4, "indent width").with_validator(non_negative))
    }

    fn derived(builder: SchemaBuilder) -> SchemaBuilder {
        base(builder)
            .declare(
                OptionDecl::integer("indent", 2, "narrower indent").with_validator(non_negative),
            )
            .declare(OptionDecl::choice("mode", &["fast", "slow"], "fast", "mode"))
            .declare(OptionDecl::theme("theme", Some("monokai"), "colors"))
    }

    fn store() -> OptionStore {
        let schema = derived(OptionSchema::builder("test")).build().unwrap();
        OptionStore::new(Arc::new(schema))
    }

    #[test]
    fn test_defaults_and_inheritance() {
        let store = store();
        assert_eq!(store.get("verbose").unwrap(), &OptionValue::Bool(false));
        // overridden default
        assert_eq!(store.get("indent").unwrap(), &OptionValue::Int(2));
        assert_eq!(store.str("mode"), Some("fast"));
        assert_eq!(store.theme("theme").map(|t| t.name.as_str()), Some("monokai"));
        assert_eq!(store.schema().len(), 4);
    }

    #[test]
    fn test_conflicting_declaration() {
        let err = base(OptionSchema::builder("test"))
            .declare(OptionDecl::string("verbose", "", "now a string"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            OptionError::ConflictingDeclaration {
                name: "verbose",
                previous: OptionType::Bool,
                new: OptionType::Str,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_default_rejected_at_build() {
        let err = OptionSchema::builder("test")
            .declare(OptionDecl::integer("n", -1, "").with_validator(non_negative))
            .build()
            .unwrap_err();
        assert!(matches!(err, OptionError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_set_roundtrip() {
        let mut store = store();
        store.set("verbose", true.into()).unwrap();
        assert_eq!(store.get("verbose").unwrap(), &OptionValue::Bool(true));
        store.set("mode", "slow".into()).unwrap();
        assert_eq!(store.get("mode").unwrap(), &OptionValue::from("slow"));
    }

    #[test]
    fn test_unknown_option() {
        let mut store = store();
        assert!(matches!(
            store.get("nope"),
            Err(OptionError::UnknownOption { owner: "test", .. })
        ));
        assert!(matches!(
            store.set("nope", true.into()),
            Err(OptionError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_invalid_value_keeps_previous() {
        let mut store = store();
        store.set("indent", 8.into()).unwrap();
        let err = store.set("indent", (-3).into()).unwrap_err();
        assert!(matches!(err, OptionError::InvalidOptionValue { .. }));
        assert_eq!(store.int("indent"), Some(8));

        assert!(store.set("indent", "wide".into()).is_err());
        assert!(store.set("mode", "medium".into()).is_err());
        assert_eq!(store.str("mode"), Some("fast"));
    }

    #[test]
    fn test_coercion() {
        let mut store = store();
        store.set("verbose", 1.into()).unwrap();
        assert_eq!(store.get("verbose").unwrap(), &OptionValue::Bool(true));
        store.set("indent", true.into()).unwrap();
        assert_eq!(store.int("indent"), Some(1));
        store.set("theme", "molokai".into()).unwrap();
        assert_eq!(store.theme("theme").map(|t| t.name.as_str()), Some("molokai"));
        assert!(store.set("theme", "nope".into()).is_err());
    }

    #[test]
    fn test_set_from_str() {
        let mut store = store();
        for (raw, expected) in [
            ("", true),
            ("on", true),
            ("TRUE", true),
            ("off", false),
            ("no", false),
            ("1", true),
            ("0", false),
        ] {
            store.set_from_str("verbose", raw, &NoResolver).unwrap();
            assert_eq!(store.flag("verbose"), expected, "raw = {raw:?}");
        }
        assert!(store.set_from_str("verbose", "maybe", &NoResolver).is_err());

        store.set_from_str("indent", " 12 ", &NoResolver).unwrap();
        assert_eq!(store.int("indent"), Some(12));
        assert!(store.set_from_str("indent", "12px", &NoResolver).is_err());
        assert_eq!(store.int("indent"), Some(12));

        store.set_from_str("theme", "", &NoResolver).unwrap();
        assert!(store.theme("theme").is_none());
    }

    #[test]
    fn test_with_values_and_reset() {
        let schema = Arc::new(derived(OptionSchema::builder("test")).build().unwrap());
        let mut store =
            OptionStore::with_values(schema.clone(), [("indent", OptionValue::Int(6))]).unwrap();
        assert_eq!(store.int("indent"), Some(6));
        assert_eq!(store.reset("indent").unwrap(), OptionValue::Int(6));
        assert_eq!(store.int("indent"), Some(2));

        assert!(matches!(
            OptionStore::with_values(schema, [("bogus", OptionValue::Int(6))]),
            Err(OptionError::UnknownOption { .. })
        ));
    }
}
