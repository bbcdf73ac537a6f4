#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Whole-pipeline tests: CHTL source in, fragments and spliced code out.

use chtl_cjmod::{ChtljsFunction, Transform, ValueKind};
use chtl_dispatch::{CompilationContext, DispatchConfig, Dispatcher, Extension, FragmentOutcome};
use chtl_scanner::{validate_coverage, FragmentKind};
use pretty_assertions::assert_eq;

const PRINT_MYLOVE: &str =
    r#"<script>{ const x = printMylove({ url: "a.png", mode: "ASCII" }); }</script>"#;

fn print_mylove() -> ChtljsFunction {
    ChtljsFunction::new("printMylove", &["url", "mode"])
}

fn dispatcher(function: ChtljsFunction) -> Dispatcher {
    chtl_dispatch::init_tracing();
    Dispatcher::new(CompilationContext::new().with_extension(Extension::from_function(function)))
}

#[test]
fn print_mylove_in_script_tag() {
    let output = dispatcher(print_mylove())
        .dispatch(PRINT_MYLOVE, "index.chtl")
        .unwrap();

    let chtljs: Vec<_> = output
        .fragments
        .iter()
        .filter(|f| f.kind() == FragmentKind::ChtlJs)
        .collect();
    assert_eq!(chtljs.len(), 1);
    assert_eq!(
        chtljs[0].content(),
        r#"{ const x = printMylove({ url: "a.png", mode: "ASCII" }); }"#
    );
    validate_coverage(&output.fragments, u32::try_from(PRINT_MYLOVE.len()).unwrap()).unwrap();

    let codes: Vec<_> = output.generated().map(|(_, code)| code).collect();
    assert_eq!(codes.len(), 1);
    assert!(codes[0].contains(r#"url: "a.png""#));
    assert!(codes[0].contains(r#"mode: "ASCII""#));
}

#[test]
fn templated_extension_rewrites_the_page() {
    let function = print_mylove()
        .with_bind(
            "mode",
            Transform::new(ValueKind::Str, |mode| format!("'{}'", mode.to_string().to_lowercase())),
        )
        .with_template("renderImage({url}, {mode})");
    let source = concat!(
        "html {\n",
        "  body {\n",
        "    div { script { printMylove({ url: 'a.png', mode: ASCII }); } }\n",
        "    div { script { printMylove({ url: 'b.png', mode: Pixel }); } }\n",
        "  }\n",
        "}\n",
    );
    let output = dispatcher(function).dispatch(source, "page.chtl").unwrap();

    assert_eq!(output.failures().count(), 0);
    assert_eq!(
        output.splice(source),
        concat!(
            "html {\n",
            "  body {\n",
            "    div { script { renderImage('a.png', 'ascii'); } }\n",
            "    div { script { renderImage('b.png', 'pixel'); } }\n",
            "  }\n",
            "}\n",
        )
    );
}

#[test]
fn plain_scripts_pass_through() {
    let source = "script { console.log(1); } style { a { b: c; } }";
    let output = dispatcher(print_mylove()).dispatch(source, "plain.chtl").unwrap();
    let kinds: Vec<_> = output.fragments.iter().map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        [FragmentKind::Chtl, FragmentKind::Js, FragmentKind::Chtl, FragmentKind::Css]
    );
    assert!(output.outcomes.is_empty());
    assert_eq!(output.splice(source), source);
}

#[test]
fn one_dispatcher_serves_many_files() {
    let dispatcher = dispatcher(print_mylove().with_template("show({url})"));
    let sources: Vec<String> = (0..6)
        .map(|i| format!("script {{ printMylove({{ url: {i}, mode: m }}); }}"))
        .collect();

    let spliced: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let dispatcher = &dispatcher;
                scope.spawn(move || {
                    dispatcher
                        .dispatch(source, "many.chtl")
                        .unwrap()
                        .splice(source)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, out) in spliced.iter().enumerate() {
        assert_eq!(out, &format!("script {{ show({i}); }}"));
    }
}

#[test]
fn failures_leave_calls_untouched() {
    let dispatcher = Dispatcher::with_config(
        CompilationContext::new()
            .with_extension(Extension::from_function(print_mylove().with_template("x"))),
        DispatchConfig::default().with_parallel(false),
    );
    let source = "script { printMylove({ mode: 1, url: 2 }); }";
    let output = dispatcher.dispatch(source, "order.chtl").unwrap();
    assert!(matches!(
        output.outcomes.as_slice(),
        [FragmentOutcome::Failed { .. }]
    ));
    assert_eq!(output.splice(source), source);
}
