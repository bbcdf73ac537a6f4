use super::*;
use crate::ValueKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn quote() -> Transform {
    Transform::new(ValueKind::Str, |v| format!("\"{v}\""))
}

fn manual(fragment: &str, pattern: &str, transforms: &[(&str, Transform)]) -> Result<String, CjmodError> {
    let mut syntax = syntax_analys(pattern, DEFAULT_IGNORE);
    for (name, transform) in transforms {
        syntax.bind(name, transform.clone());
    }
    let mut scanner = CjmodScanner::new(fragment);
    syntax.match_call(&mut scanner)?;
    Ok(generate_code(&syntax))
}

#[test]
fn one_call_print_mylove() {
    let code = generate(
        r#"printMylove({ url: "a.png", mode: "ASCII" });"#,
        "printMylove({ url: $, mode: $ })",
        &[("url", quote()), ("mode", quote())],
    )
    .unwrap();
    assert_eq!(code, r#"printMylove({ url: "a.png", mode: "ASCII" })"#);
}

#[test]
fn anonymous_transforms_bind_in_order() {
    let code = generate(
        "pair(1, 2)",
        "pair($, $)",
        &[
            ("$", Transform::new(ValueKind::Num, |v| format!("L{v}"))),
            ("$", Transform::new(ValueKind::Num, |v| format!("R{v}"))),
        ],
    )
    .unwrap();
    assert_eq!(code, "pair(L1, R2)");
}

#[test]
fn custom_ignore_chars() {
    let code = generate_with("swap a with b", "swap $ with $", "", &[]).unwrap();
    assert_eq!(code, "swap a with b");
}

#[test]
fn errors_propagate() {
    assert_eq!(
        generate("g(1)", "f($)", &[]),
        Err(CjmodError::KeywordNotFound { keyword: "f".into() })
    );
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn matches_manual_sequence(a in "[a-z0-9]{1,6}", b in "[a-z0-9]{1,6}") {
            let fragment = format!("draw({{ x: {a}, y: '{b}' }});");
            let pattern = "draw({ x: $, y: $ })";
            let transforms = [("x", quote()), ("$", quote())];
            prop_assert_eq!(
                generate(&fragment, pattern, &transforms),
                manual(&fragment, pattern, &transforms)
            );
        }
    }
}
