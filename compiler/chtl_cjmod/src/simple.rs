//! One-call wrapper over the full extension lifecycle.

use crate::{generate_code, syntax_analys, CjmodError, CjmodScanner, Transform, DEFAULT_IGNORE};

/// Analyse `pattern`, bind `transforms`, match the first call in
/// `fragment` and return the generated code.
///
/// Transforms are bound in slice order, so repeated `"$"` entries fill
/// placeholders left to right. The output is identical to running
/// [`syntax_analys`], `bind`, `match_call` and [`generate_code`] by hand.
pub fn generate(
    fragment: &str,
    pattern: &str,
    transforms: &[(&str, Transform)],
) -> Result<String, CjmodError> {
    generate_with(fragment, pattern, DEFAULT_IGNORE, transforms)
}

/// [`generate`] with explicit scaffolding characters.
pub fn generate_with(
    fragment: &str,
    pattern: &str,
    ignore_chars: &str,
    transforms: &[(&str, Transform)],
) -> Result<String, CjmodError> {
    let mut syntax = syntax_analys(pattern, ignore_chars);
    for (name, transform) in transforms {
        syntax.bind(name, transform.clone());
    }
    let mut scanner = CjmodScanner::new(fragment);
    syntax.match_call(&mut scanner)?;
    Ok(generate_code(&syntax))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests;
