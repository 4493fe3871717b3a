use shall::highlight::{OptionError, OptionType, OptionValue};
use shall::{Error, Registry};

#[test]
fn test_unknown_options_are_rejected_everywhere() {
    let registry = Registry::builtin().unwrap();
    for entry in registry.lexers() {
        let mut lexer = entry.new_lexer();
        let err = lexer.set_option("no_such_option", true.into()).unwrap_err();
        assert!(
            matches!(
                &err,
                OptionError::UnknownOption { owner, name }
                    if *owner == entry.name() && name == "no_such_option"
            ),
            "{err}"
        );
    }
    for entry in registry.formatters() {
        let mut formatter = entry.new_formatter();
        let err = formatter.set_option("no_such_option", 1.into()).unwrap_err();
        assert_eq!(err.owner(), entry.name());
    }
}

#[test]
fn test_declared_options_read_back_what_was_set() {
    let registry = Registry::builtin().unwrap();
    for entry in registry.lexers() {
        let mut lexer = entry.new_lexer();
        let bools: Vec<&'static str> = entry
            .schema()
            .iter()
            .filter(|decl| decl.ty == OptionType::Bool)
            .map(|decl| decl.name)
            .collect();
        for name in bools {
            lexer.set_option(name, true.into()).unwrap();
            assert_eq!(lexer.get_option(name).unwrap().as_bool(), Some(true));
            lexer.set_option(name, OptionValue::Int(0)).unwrap();
            assert_eq!(lexer.get_option(name).unwrap().as_bool(), Some(false));
        }
    }
}

#[test]
fn test_new_formatter_applies_options() {
    let registry = Registry::builtin().unwrap();
    let formatter = registry
        .new_formatter("HTML", [("linenos", true.into()), ("cssclass", "code".into())])
        .unwrap();
    assert_eq!(formatter.name(), "html");
    assert_eq!(formatter.get_option("linenos").unwrap().as_bool(), Some(true));
    assert_eq!(formatter.get_option("cssclass").unwrap().as_str(), Some("code"));

    assert!(matches!(
        registry.new_formatter("html", [("linestart", OptionValue::Int(-1))]),
        Err(Error::Option(OptionError::InvalidOptionValue { .. }))
    ));
}

#[cfg(feature = "all-languages")]
#[test]
fn test_lexer_option_takes_another_lexer() {
    let registry = Registry::builtin().unwrap();
    let secondary = registry.lexer_by_name("xml", []).unwrap();
    let lexer = registry
        .lexer_by_name("php", [("secondary", secondary.into())])
        .unwrap();
    assert_eq!(lexer.options().lexer("secondary").map(|l| l.name()), Some("xml"));
}

#[test]
fn test_wrong_type_is_rejected() {
    let registry = Registry::builtin().unwrap();
    let mut formatter = registry.new_formatter("terminal", []).unwrap();
    assert!(formatter.set_option("width", "wide".into()).is_err());
    assert_eq!(formatter.get_option("width").unwrap().as_int(), Some(0));
}
