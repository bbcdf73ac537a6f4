use super::*;
use pretty_assertions::assert_eq;

// === Coercion ===

#[test]
fn str_strips_one_pair_of_quotes() {
    assert_eq!(ArgValue::coerce("\"a.png\"", ValueKind::Str), ArgValue::Str("a.png".into()));
    assert_eq!(ArgValue::coerce(" 'x' ", ValueKind::Str), ArgValue::Str("x".into()));
    assert_eq!(ArgValue::coerce("plain", ValueKind::Str), ArgValue::Str("plain".into()));
    assert_eq!(ArgValue::coerce("\"mixed'", ValueKind::Str), ArgValue::Str("\"mixed'".into()));
}

#[test]
fn num_falls_back_to_str() {
    assert_eq!(ArgValue::coerce("2.5", ValueKind::Num), ArgValue::Num(2.5));
    assert_eq!(ArgValue::coerce("'wide'", ValueKind::Num), ArgValue::Str("wide".into()));
    assert_eq!(ArgValue::coerce("NaN", ValueKind::Num), ArgValue::Str("NaN".into()));
}

#[test]
fn bool_falls_back_to_str() {
    assert_eq!(ArgValue::coerce("true", ValueKind::Bool), ArgValue::Bool(true));
    assert_eq!(ArgValue::coerce("yes", ValueKind::Bool), ArgValue::Str("yes".into()));
}

#[test]
fn accessors_only_answer_for_their_kind() {
    let flag = ArgValue::coerce("false", ValueKind::Bool);
    assert_eq!(flag.as_bool(), Some(false));
    assert_eq!(flag.as_num(), None);
    assert_eq!(ArgValue::coerce("yes", ValueKind::Bool).as_bool(), None);
    assert_eq!(ArgValue::coerce("7", ValueKind::Num).as_bool(), None);
}

#[test]
fn raw_keeps_text_untouched() {
    assert_eq!(ArgValue::coerce(" \"a\" ", ValueKind::Raw), ArgValue::Raw(" \"a\" ".into()));
}

#[test]
fn auto_follows_type_hint() {
    assert_eq!(ArgValue::coerce("'s'", ValueKind::Auto), ArgValue::Str("s".into()));
    assert_eq!(ArgValue::coerce("3", ValueKind::Auto), ArgValue::Num(3.0));
    assert_eq!(ArgValue::coerce("false", ValueKind::Auto), ArgValue::Bool(false));
    assert_eq!(ArgValue::coerce("{ a: 1 }", ValueKind::Auto), ArgValue::Raw("{ a: 1 }".into()));
}

#[test]
fn display_renders_integral_numbers_without_fraction() {
    assert_eq!(ArgValue::Num(42.0).to_string(), "42");
    assert_eq!(ArgValue::Num(0.5).to_string(), "0.5");
    assert_eq!(ArgValue::Bool(true).to_string(), "true");
}

// === Type Hints ===

#[test]
fn type_hints() {
    let cases = [
        ("", TypeHint::Empty),
        ("  ", TypeHint::Empty),
        ("\"a\"", TypeHint::String),
        ("-1.5", TypeHint::Number),
        ("true", TypeHint::Boolean),
        ("{ a: 1 }", TypeHint::Object),
        ("[1, 2]", TypeHint::Array),
        ("() => 1", TypeHint::Function),
        ("function () {}", TypeHint::Function),
        ("box", TypeHint::Identifier),
        ("a + b", TypeHint::Expression),
    ];
    for (text, hint) in cases {
        assert_eq!(TypeHint::infer(text), hint, "text: {text:?}");
    }
}

// === Heuristics ===

#[test]
fn object_requires_single_group() {
    assert!(is_object("{ a: { b: 1 } }"));
    assert!(!is_object("{ a } { b }"));
    assert!(!is_object("[1]"));
    assert!(!is_object("{ a"));
}

#[test]
fn arrow_inside_object_is_not_a_function() {
    assert!(!is_function("{ f: () => 1 }"));
    assert!(is_function("x => x * 2"));
    assert!(!is_function("\"function\""));
}
