//! Dispatch results and splicing generated code back into the source.

use std::ops::Range;

use chtl_cjmod::CjmodError;
use chtl_scanner::Fragment;

/// What one extension produced for one call site in a fragment.
///
/// Ranges are absolute byte offsets into the dispatched source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentOutcome {
    Generated {
        /// The fragment the call was found in.
        range: Range<u32>,
        /// The call expression `code` replaces.
        call: Range<u32>,
        extension: String,
        code: String,
    },
    Failed {
        range: Range<u32>,
        extension: String,
        error: CjmodError,
    },
}

impl FragmentOutcome {
    /// Range of the fragment this outcome belongs to.
    pub fn range(&self) -> Range<u32> {
        match self {
            FragmentOutcome::Generated { range, .. } | FragmentOutcome::Failed { range, .. } => {
                range.clone()
            }
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            FragmentOutcome::Generated { extension, .. }
            | FragmentOutcome::Failed { extension, .. } => extension,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, FragmentOutcome::Generated { .. })
    }
}

/// The fragments of one source plus the per-call extension outcomes, in
/// fragment order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutput {
    pub fragments: Vec<Fragment>,
    pub outcomes: Vec<FragmentOutcome>,
}

impl DispatchOutput {
    /// `(call, code)` for every successful outcome.
    pub fn generated(&self) -> impl Iterator<Item = (Range<u32>, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FragmentOutcome::Generated { call, code, .. } => Some((call.clone(), code.as_str())),
            FragmentOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FragmentOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_generated())
    }

    /// [`splice`] these outcomes into `source`.
    pub fn splice(&self, source: &str) -> String {
        splice(source, &self.outcomes)
    }
}

/// Rebuild `source` with each generated call range replaced by its code.
///
/// Ranges are applied in offset order. A range overlapping an earlier
/// one, or not on character boundaries, is skipped with a warning.
pub fn splice(source: &str, outcomes: &[FragmentOutcome]) -> String {
    let mut edits: Vec<(Range<usize>, &str, &str)> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            FragmentOutcome::Generated {
                call,
                code,
                extension,
                ..
            } => Some((
                call.start as usize..call.end as usize,
                code.as_str(),
                extension.as_str(),
            )),
            FragmentOutcome::Failed { .. } => None,
        })
        .collect();
    edits.sort_by_key(|(call, _, _)| call.start);

    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    for (call, code, extension) in edits {
        let (Some(before), Some(_)) = (source.get(copied..call.start), source.get(call.clone()))
        else {
            tracing::warn!(
                extension,
                start = call.start,
                end = call.end,
                "skipping generated code with an overlapping or invalid range"
            );
            continue;
        };
        out.push_str(before);
        out.push_str(code);
        copied = call.end;
    }
    out.push_str(source.get(copied..).unwrap_or_default());
    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
