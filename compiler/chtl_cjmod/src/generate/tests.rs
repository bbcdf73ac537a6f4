use super::*;
use crate::{syntax_analys, CjmodScanner, Transform, ValueKind, DEFAULT_IGNORE};
use pretty_assertions::assert_eq;

#[test]
fn default_output_keeps_scaffolding() {
    let mut syntax = syntax_analys("fade(  $ ,{ ms: $ } )", DEFAULT_IGNORE);
    syntax.args_mut().match_value(0_usize, "box").unwrap();
    syntax.args_mut().match_value("ms", "300").unwrap();
    assert_eq!(generate_code(&syntax), "fade(  box ,{ ms: 300 } )");
}

#[test]
fn registered_template_wins() {
    let mut syntax = syntax_analys("fade($, { ms: $ })", DEFAULT_IGNORE);
    syntax.set_template("animate({$0}, {ms})");
    let mut scanner = CjmodScanner::new("fade(el, { ms: 250 })");
    syntax.match_call(&mut scanner).unwrap();
    assert_eq!(generate_code(&syntax), "animate(el, 250)");
}

#[test]
fn unmatched_values_render_empty() {
    let mut syntax = syntax_analys("f($)", DEFAULT_IGNORE);
    syntax.bind("$", Transform::new(ValueKind::Str, |v| format!("'{v}'")));
    assert_eq!(generate_code(&syntax), "f()");
}

#[test]
fn generation_is_pure() {
    let mut syntax = syntax_analys("f($)", DEFAULT_IGNORE);
    syntax.args_mut().match_value(0_usize, "1").unwrap();
    assert_eq!(generate_code(&syntax), generate_code(&syntax));
}
