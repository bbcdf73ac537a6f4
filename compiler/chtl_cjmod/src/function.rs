//! The extension façade: one CHTL-JS function from pattern to code.
//!
//! A [`ChtljsFunction`] runs the whole lifecycle for one fragment:
//! analyse the pattern, bind transforms, optionally register a template,
//! find and match the call, and generate the replacement code.

use std::ops::Range;

use crate::{
    generate_code, syntax_analys, BindOutcome, CjmodError, CjmodScanner, Syntax, Transform,
    DEFAULT_IGNORE,
};

/// Code generated for one matched call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    /// Keyword range, relative to the processed text.
    pub keyword: Range<u32>,
    /// The call expression the code replaces, relative to the processed text.
    pub call: Range<u32>,
    pub code: String,
}

/// A CHTL-JS function backed by a call pattern.
#[derive(Clone, Debug)]
pub struct ChtljsFunction {
    name: String,
    syntax: Syntax,
}

impl ChtljsFunction {
    /// A function taking one object argument with the given keys:
    /// `name({ p1: $, p2: $ })`, or `name()` without keys.
    pub fn new(name: &str, params: &[&str]) -> Self {
        let pattern = if params.is_empty() {
            format!("{name}()")
        } else {
            let entries: Vec<String> = params.iter().map(|p| format!("{p}: $")).collect();
            format!("{name}({{ {} }})", entries.join(", "))
        };
        Self::from_pattern(name, &pattern, DEFAULT_IGNORE)
    }

    /// A function with an explicit pattern.
    pub fn from_pattern(name: &str, pattern: &str, ignore_chars: &str) -> Self {
        Self {
            name: name.to_owned(),
            syntax: syntax_analys(pattern, ignore_chars),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.syntax.pattern()
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    pub fn syntax_mut(&mut self) -> &mut Syntax {
        &mut self.syntax
    }

    pub fn bind(&mut self, name: &str, transform: Transform) -> BindOutcome {
        self.syntax.bind(name, transform)
    }

    pub fn bind_strict(&mut self, name: &str, transform: Transform) -> Result<(), CjmodError> {
        self.syntax.bind_strict(name, transform)
    }

    /// Register the output template used for every generated call.
    pub fn transform(&mut self, template: &str) {
        self.syntax.set_template(template);
    }

    /// Builder form of [`bind`](Self::bind).
    #[must_use]
    pub fn with_bind(mut self, name: &str, transform: Transform) -> Self {
        self.bind(name, transform);
        self
    }

    /// Builder form of [`transform`](Self::transform).
    #[must_use]
    pub fn with_template(mut self, template: &str) -> Self {
        self.transform(template);
        self
    }

    /// Match the first call in `content` and generate its code.
    pub fn process(&mut self, content: &str) -> Result<Generated, CjmodError> {
        let mut scanner = CjmodScanner::new(content);
        self.process_with(&mut scanner)
    }

    /// Match the next call in `scanner` and generate its code.
    pub fn process_with(&mut self, scanner: &mut CjmodScanner<'_>) -> Result<Generated, CjmodError> {
        let matched = self.syntax.match_call(scanner)?;
        Ok(Generated {
            keyword: matched.keyword,
            call: matched.call,
            code: generate_code(&self.syntax),
        })
    }

    /// Process every call in `content`, in order.
    ///
    /// A call that fails to match is reported and scanning resumes after
    /// its keyword, with any policy frames it left open dropped.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %self.name))]
    pub fn process_all(&mut self, content: &str) -> Vec<Result<Generated, CjmodError>> {
        if self.syntax.keyword().is_none() {
            return vec![Err(CjmodError::KeywordNotFound {
                keyword: self.pattern().to_owned(),
            })];
        }
        let mut scanner = CjmodScanner::new(content);
        let mut results = Vec::new();
        loop {
            match self.process_with(&mut scanner) {
                Ok(generated) => results.push(Ok(generated)),
                Err(CjmodError::KeywordNotFound { .. }) => break,
                Err(err) => {
                    tracing::debug!(error = %err, "call did not match");
                    results.push(Err(err));
                    scanner.clear_policies();
                    let Some(resume) = scanner.keyword_hit().map(|hit| hit.range.end) else {
                        break;
                    };
                    scanner.set_position(resume);
                }
            }
        }
        results
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
