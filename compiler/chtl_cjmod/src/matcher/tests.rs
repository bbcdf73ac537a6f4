use super::*;
use crate::{syntax_analys, Policy, Transform, ValueKind, DEFAULT_IGNORE};
use pretty_assertions::assert_eq;

fn quote() -> Transform {
    Transform::new(ValueKind::Str, |v| format!("\"{v}\""))
}

fn text(source: &str, range: &Range<u32>) -> String {
    source[range.start as usize..range.end as usize].to_owned()
}

// === Forward Matching ===

#[test]
fn matches_object_argument_call() {
    let source = r#"{ const x = printMylove({ url: "a.png", mode: "ASCII" }); }"#;
    let mut syntax = syntax_analys("printMylove({ url: $, mode: $ })", DEFAULT_IGNORE);
    syntax.bind("url", quote());
    syntax.bind("mode", quote());

    let mut scanner = CjmodScanner::new(source);
    let matched = syntax.match_call(&mut scanner).unwrap();

    assert_eq!(text(source, &matched.keyword), "printMylove");
    assert_eq!(
        text(source, &matched.call),
        r#"printMylove({ url: "a.png", mode: "ASCII" })"#
    );
    assert_eq!(syntax.args().placeholder(0).unwrap().raw(), Some("\"a.png\""));
    assert_eq!(
        syntax.render(),
        r#"printMylove({ url: "a.png", mode: "ASCII" })"#
    );
}

#[test]
fn argument_values_keep_nested_structure() {
    let source = "f({ a: g(1, { b: 2 }), c: [1, 2] })";
    let mut syntax = syntax_analys("f({ a: $, c: $ })", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new(source);
    syntax.match_call(&mut scanner).unwrap();
    assert_eq!(syntax.args().placeholder(0).unwrap().raw(), Some("g(1, { b: 2 })"));
    assert_eq!(syntax.args().placeholder(1).unwrap().raw(), Some("[1, 2]"));
}

#[test]
fn key_placeholder_stops_at_colon() {
    let source = "set(width: 10)";
    let mut syntax = syntax_analys("set($: $)", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new(source);
    syntax.match_call(&mut scanner).unwrap();
    assert_eq!(syntax.args().result(), "width, 10");
}

#[test]
fn trailing_comma_is_tolerated() {
    let source = "f({ a: 1, })";
    let mut syntax = syntax_analys("f({ a: $ })", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new(source);
    let matched = syntax.match_call(&mut scanner).unwrap();
    assert_eq!(matched.call, 0..12);
    assert_eq!(syntax.render(), "f({ a: 1 })");
}

#[test]
fn trailing_keyed_arguments_may_be_omitted() {
    let source = r#"printMylove({ url: "a.png" });"#;
    let mut syntax = syntax_analys(
        "printMylove({ url: $, mode: $, width: $ });",
        DEFAULT_IGNORE,
    );
    let mut scanner = CjmodScanner::new(source);
    let matched = syntax.match_call(&mut scanner).unwrap();
    assert_eq!(matched.call, 0..source.len() as u32);
    assert_eq!(syntax.args().result(), "\"a.png\", , ");
    assert_eq!(syntax.args().placeholder(1).unwrap().raw(), None);
}

#[test]
fn omitted_key_must_be_trailing() {
    let mut syntax = syntax_analys("f({ a: $, b: $ })", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("f({ b: 1 })");
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::TriggerNotFound {
            trigger: "a".into(),
            from: 4,
        })
    );
}

#[test]
fn missing_argument_is_empty() {
    let mut syntax = syntax_analys("f($)", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("f()");
    syntax.match_call(&mut scanner).unwrap();
    assert_eq!(syntax.args().placeholder(0).unwrap().raw(), Some(""));
    assert_eq!(syntax.render(), "f()");
}

#[test]
fn rematching_replaces_values() {
    let source = "f(1); f(2)";
    let mut syntax = syntax_analys("f($)", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new(source);
    syntax.match_call(&mut scanner).unwrap();
    assert_eq!(syntax.render(), "f(1)");
    let second = syntax.match_call(&mut scanner).unwrap();
    assert_eq!(second.call, 6..10);
    assert_eq!(syntax.render(), "f(2)");
}

// === Backward Matching ===

#[test]
fn elements_before_keyword_match_backwards() {
    let source = "let y = load(file);";
    let mut syntax = syntax_analys("$ = load($)", DEFAULT_IGNORE);
    syntax.bind("$0", Transform::new(ValueKind::Raw, |v| v.to_string().to_uppercase()));
    let mut scanner = CjmodScanner::new(source);
    let matched = syntax.match_call(&mut scanner).unwrap();
    assert_eq!(text(source, &matched.call), "y = load(file)");
    assert_eq!(syntax.render(), "Y = load(file)");
}

#[test]
fn backward_literal_mismatch() {
    let mut syntax = syntax_analys("$ = load($)", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("y - load(file)");
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::TriggerNotFound {
            trigger: "=".into(),
            from: 2,
        })
    );
}

// === Errors ===

#[test]
fn out_of_order_literal_fails() {
    let mut syntax = syntax_analys("f({ a: $ })", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("f({ b: 1 })");
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::TriggerNotFound {
            trigger: "a".into(),
            from: 4,
        })
    );
}

#[test]
fn pattern_without_keyword() {
    let mut syntax = syntax_analys("$ + $", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("1 + 2");
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::KeywordNotFound {
            keyword: "$ + $".into()
        })
    );
}

#[test]
fn keyword_absent_from_fragment() {
    let mut syntax = syntax_analys("f($)", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("g(1)");
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::KeywordNotFound { keyword: "f".into() })
    );
}

#[test]
fn open_policy_frames_fail_the_match() {
    let mut syntax = syntax_analys("g($)", DEFAULT_IGNORE);
    let mut scanner = CjmodScanner::new("f(1); g(2)");
    scanner.policy_change_begin("(", Policy::Collect).unwrap();
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::UnbalancedPolicyStack { depth: 1 })
    );
}

#[test]
fn failing_transform_aborts_match() {
    let mut syntax = syntax_analys("f($)", DEFAULT_IGNORE);
    syntax.bind(
        "$",
        Transform::fallible(ValueKind::Num, |v| {
            v.as_num().map(|n| n.to_string()).ok_or_else(|| "expected a number".to_owned())
        }),
    );
    let mut scanner = CjmodScanner::new("f(x)");
    assert_eq!(
        syntax.match_call(&mut scanner),
        Err(CjmodError::Transform {
            arg: "$0".into(),
            message: "expected a number".into(),
        })
    );
}
