use super::*;
use crate::{syntax_analys, DEFAULT_IGNORE};
use pretty_assertions::assert_eq;

fn args(pattern: &str) -> Args {
    syntax_analys(pattern, DEFAULT_IGNORE).args().clone()
}

fn tag(label: &'static str) -> Transform {
    Transform::new(ValueKind::Raw, move |v| format!("{label}:{v}"))
}

fn bound_labels(args: &Args) -> Vec<Option<String>> {
    args.placeholders()
        .map(|arg| arg.transform().map(|t| t.apply("x").unwrap()))
        .collect()
}

// === Anonymous Binding ===

#[test]
fn anonymous_binds_fill_slots_in_order() {
    let mut args = args("f({ a: $, b: $ })");
    assert_eq!(args.bind("$", tag("first")), BindOutcome::Bound);
    assert_eq!(args.bind("$", tag("second")), BindOutcome::Bound);
    assert_eq!(
        bound_labels(&args),
        [Some("first:x".to_owned()), Some("second:x".to_owned())]
    );
}

#[test]
fn exhausted_anonymous_bind_is_a_noop() {
    let mut args = args("f($)");
    assert_eq!(args.bind("$", tag("one")), BindOutcome::Bound);
    assert_eq!(args.bind("$", tag("two")), BindOutcome::NoOp);
    assert_eq!(bound_labels(&args), [Some("one:x".to_owned())]);
}

#[test]
fn anonymous_bind_skips_named_slots() {
    let mut args = args("f({ a: $, b: $ })");
    args.bind("a", tag("named"));
    args.bind("$", tag("anon"));
    assert_eq!(
        bound_labels(&args),
        [Some("named:x".to_owned()), Some("anon:x".to_owned())]
    );
}

// === Named Binding ===

#[test]
fn named_bind_overwrites() {
    let mut args = args("f({ a: $ })");
    assert_eq!(args.bind("a", tag("old")), BindOutcome::Bound);
    assert_eq!(args.bind("a", tag("new")), BindOutcome::Rebound);
    assert_eq!(bound_labels(&args), [Some("new:x".to_owned())]);
}

#[test]
fn positional_marker_binds_slot() {
    let mut args = args("f($, $)");
    assert_eq!(args.bind("$1", tag("second")), BindOutcome::Bound);
    assert_eq!(bound_labels(&args), [None, Some("second:x".to_owned())]);
}

#[test]
fn unknown_name_is_a_noop() {
    let mut args = args("f($)");
    assert_eq!(args.bind("missing", tag("x")), BindOutcome::NoOp);
    assert_eq!(args.bind("$7", tag("x")), BindOutcome::NoOp);
}

#[test]
fn strict_bind_rejects_rebind_and_unknown() {
    let mut args = args("f({ a: $ })");
    args.bind_strict("a", tag("one")).unwrap();
    assert_eq!(
        args.bind_strict("a", tag("two")),
        Err(CjmodError::DuplicateBind { name: "a".into() })
    );
    assert_eq!(
        args.bind_strict("$", tag("two")),
        Err(CjmodError::DuplicateBind { name: "$".into() })
    );
    assert_eq!(
        args.bind_strict("b", tag("two")),
        Err(CjmodError::UnknownArg { name: "b".into() })
    );
    assert_eq!(bound_labels(&args), [Some("one:x".to_owned())]);
}

// === Values ===

#[test]
fn match_value_runs_transform_eagerly() {
    let mut args = args("f({ n: $ })");
    args.bind(
        "n",
        Transform::fallible(ValueKind::Num, |v| {
            v.as_num()
                .map(|n| (n * 2.0).to_string())
                .ok_or_else(|| format!("not a number: {v}"))
        }),
    );
    args.match_value("n", "21").unwrap();
    assert_eq!(args.placeholder(0).unwrap().value(), "42");

    let err = args.match_value("n", "'wide'").unwrap_err();
    assert_eq!(
        err,
        CjmodError::Transform {
            arg: "n".into(),
            message: "not a number: wide".into(),
        }
    );
    assert_eq!(args.placeholder(0).unwrap().value(), "");
}

#[test]
fn unmatched_placeholder_is_empty() {
    let mut args = args("f($)");
    args.bind("$", Transform::new(ValueKind::Str, |v| format!("\"{v}\"")));
    assert_eq!(args.placeholder(0).unwrap().value(), "");
}

#[test]
fn literal_value_is_its_text() {
    let args = args("show($)");
    assert_eq!(args.get(0).unwrap().value(), "show");
}

#[test]
fn match_value_unknown_target() {
    let mut args = args("f($)");
    assert_eq!(
        args.match_value(3_usize, "x"),
        Err(CjmodError::UnknownArg { name: "$3".into() })
    );
}

#[test]
fn clear_matches_keeps_bindings() {
    let mut args = args("f($)");
    args.bind("$", tag("t"));
    args.match_value(0_usize, "v").unwrap();
    args.clear_matches();
    assert_eq!(args.placeholder(0).unwrap().raw(), None);
    assert!(args.placeholder(0).unwrap().is_bound());
}

#[test]
fn type_hint_follows_matched_text() {
    let mut args = args("f($)");
    args.match_value(0_usize, "{ a: 1 }").unwrap();
    assert_eq!(args.placeholder(0).unwrap().type_hint(), TypeHint::Object);
}

// === Substitution ===

#[test]
fn transform_substitutes_labels_slots_and_literals() {
    let mut args = args("draw({ x: $, y: $ })");
    args.match_value("x", "1").unwrap();
    args.match_value("y", "2").unwrap();
    assert_eq!(
        args.transform("{draw}: {x},{$1} {unknown} { x }"),
        "draw: 1,2 {unknown} { x }"
    );
}

#[test]
fn transform_does_not_rescan_substitutions() {
    let mut args = args("f({ a: $, b: $ })");
    args.match_value("a", "{b}").unwrap();
    args.match_value("b", "B").unwrap();
    assert_eq!(args.transform("[{a}][{b}]"), "[{b}][B]");
}

#[test]
fn transform_handles_nested_braces_in_template() {
    let mut args = args("f({ a: $ })");
    args.match_value("a", "1").unwrap();
    assert_eq!(args.transform("{{a}}"), "{1}");
    assert_eq!(args.transform("{ a: {a} }"), "{ a: 1 }");
}

#[test]
fn result_joins_placeholders() {
    let mut args = args("f($, $, $)");
    args.match_value(0_usize, "1").unwrap();
    args.match_value(2_usize, "3").unwrap();
    assert_eq!(args.result(), "1, , 3");
}
