//! Dispatcher for CHTL compilation.
//!
//! Ties the scanner and the CJMOD engine together: a source is split into
//! fragments, every CHTL-JS fragment is offered to the extensions whose
//! trigger keyword it mentions, and the generated JavaScript comes back
//! keyed by absolute byte range so the caller can [`splice`] it into the
//! final output.
//!
//! Fragment-level work is independent and runs on a scoped rayon pool
//! when [`DispatchConfig::parallel`] is set; results keep source order.
//!
//! ```
//! use chtl_cjmod::{ChtljsFunction, Transform, ValueKind};
//! use chtl_dispatch::{CompilationContext, Dispatcher, Extension};
//!
//! let function = ChtljsFunction::new("printMylove", &["url"])
//!     .with_bind("url", Transform::new(ValueKind::Str, |v| format!("'{v}'")))
//!     .with_template("renderImage({url})");
//! let context = CompilationContext::new().with_extension(Extension::from_function(function));
//! let source = r#"div { script { printMylove({ url: "a.png" }); } }"#;
//!
//! let output = Dispatcher::new(context).dispatch(source, "index.chtl").unwrap();
//! assert_eq!(
//!     output.splice(source),
//!     "div { script { renderImage('a.png'); } }"
//! );
//! ```

mod context;
mod dispatcher;
mod error;
mod output;

use std::sync::Once;

pub use context::{CompilationContext, Extension};
pub use dispatcher::{DispatchConfig, Dispatcher};
pub use error::DispatchError;
pub use output::{splice, DispatchOutput, FragmentOutcome};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times. Does nothing
/// unless `CHTL_LOG` (or, failing that, `RUST_LOG`) holds a filter such
/// as `chtl_scanner=trace`. Set `CHTL_LOG_TREE` for indented span trees.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(directives) = std::env::var("CHTL_LOG").or_else(|_| std::env::var("RUST_LOG"))
        else {
            return;
        };
        let filter = EnvFilter::new(directives);
        if std::env::var_os("CHTL_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
