//! Scan a source, route CHTL-JS fragments to extensions, collect the code.

use rayon::prelude::*;

use chtl_cjmod::CjmodScanner;
use chtl_scanner::{Fragment, FragmentKind};

use crate::{CompilationContext, DispatchError, DispatchOutput, Extension, FragmentOutcome};

/// Options for [`Dispatcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Run fragment-level work on a scoped thread pool.
    pub parallel: bool,
    /// Stack size for pool worker threads, in bytes.
    pub stack_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            parallel: true,
            stack_size: 8 * 1024 * 1024,
        }
    }
}

impl DispatchConfig {
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }
}

/// One extension applied to one fragment.
struct Job<'a> {
    fragment: &'a Fragment,
    extension: &'a Extension,
}

/// Runs the scanner and every applicable extension over a source.
///
/// A dispatcher holds no per-file state, so one instance can serve any
/// number of files, including from several threads.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    context: CompilationContext,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(context: CompilationContext) -> Self {
        Self::with_config(context, DispatchConfig::default())
    }

    pub fn with_config(context: CompilationContext, config: DispatchConfig) -> Self {
        Dispatcher { context, config }
    }

    pub fn context(&self) -> &CompilationContext {
        &self.context
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Scan `source` and run the extensions over its CHTL-JS fragments.
    ///
    /// A scan failure aborts the file. Extension failures are recorded per
    /// call in [`DispatchOutput::outcomes`] and never stop other work.
    #[tracing::instrument(level = "debug", skip_all, fields(filename = filename, len = source.len()))]
    pub fn dispatch(&self, source: &str, filename: &str) -> Result<DispatchOutput, DispatchError> {
        let fragments = self.context.scanner().scan(source, filename)?;
        let jobs = self.jobs(&fragments);
        tracing::debug!(
            fragments = fragments.len(),
            jobs = jobs.len(),
            "routing fragments"
        );

        let outcomes = if self.config.parallel && jobs.len() > 1 {
            self.run_parallel(&jobs)
        } else {
            jobs.iter().map(run_job).collect()
        };
        let outcomes: Vec<FragmentOutcome> = outcomes.into_iter().flatten().collect();

        tracing::debug!(
            outcomes = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.is_generated()).count(),
            "dispatch finished"
        );
        Ok(DispatchOutput {
            fragments,
            outcomes,
        })
    }

    /// Every `(fragment, extension)` pair whose trigger appears in a
    /// CHTL-JS fragment, in fragment then registration order.
    fn jobs<'a>(&'a self, fragments: &'a [Fragment]) -> Vec<Job<'a>> {
        let extensions = self.context.extensions();
        fragments
            .iter()
            .filter(|fragment| fragment.kind() == FragmentKind::ChtlJs)
            .flat_map(move |fragment| {
                extensions
                    .iter()
                    .filter(move |extension| {
                        CjmodScanner::new(fragment.content())
                            .scan_keyword(extension.trigger())
                            .is_ok()
                    })
                    .map(move |extension| Job {
                        fragment,
                        extension,
                    })
            })
            .collect()
    }

    /// Run jobs on a scoped rayon pool; results keep job order.
    ///
    /// The pool is torn down before returning. If it cannot be built the
    /// jobs run sequentially.
    fn run_parallel(&self, jobs: &[Job<'_>]) -> Vec<Vec<FragmentOutcome>> {
        rayon::ThreadPoolBuilder::new()
            .stack_size(self.config.stack_size)
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| jobs.par_iter().map(run_job).collect::<Vec<_>>())
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                jobs.iter().map(run_job).collect()
            })
    }
}

/// Process every call of one extension in one fragment.
fn run_job(job: &Job<'_>) -> Vec<FragmentOutcome> {
    let Job {
        fragment,
        extension,
    } = *job;
    let base = fragment.start();
    let range = base..fragment.end();
    let mut function = extension.instantiate();
    function
        .process_all(fragment.content())
        .into_iter()
        .map(|result| match result {
            Ok(generated) => {
                tracing::trace!(
                    extension = extension.name(),
                    start = base + generated.call.start,
                    "generated code"
                );
                FragmentOutcome::Generated {
                    range: range.clone(),
                    call: base + generated.call.start..base + generated.call.end,
                    extension: extension.name().to_owned(),
                    code: generated.code,
                }
            }
            Err(error) => {
                tracing::warn!(
                    extension = extension.name(),
                    fragment_start = base,
                    %error,
                    "extension failed on fragment"
                );
                FragmentOutcome::Failed {
                    range: range.clone(),
                    extension: extension.name().to_owned(),
                    error,
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
