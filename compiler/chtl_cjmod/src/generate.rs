//! Code generation.

use crate::Syntax;

/// Render the final JavaScript for a matched `syntax`.
///
/// Uses the registered template, or the pattern itself with placeholder
/// values substituted. Never fails: an argument with no value renders as
/// an empty string.
pub fn generate_code(syntax: &Syntax) -> String {
    let code = syntax.render();
    tracing::trace!(
        pattern = syntax.pattern(),
        templated = syntax.template().is_some(),
        len = code.len(),
        "generated code"
    );
    code
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests;
