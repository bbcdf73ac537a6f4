//! Compilation context: scanner setup plus the registered extensions.

use std::fmt;
use std::sync::Arc;

use chtl_cjmod::ChtljsFunction;
use chtl_scanner::{KeywordRegistry, ScannerConfig, UnifiedScanner};

type FunctionFactory = dyn Fn() -> ChtljsFunction + Send + Sync;

/// A CJMOD extension: a trigger keyword and a factory for the function
/// that handles it.
///
/// Every fragment gets a fresh [`ChtljsFunction`] from the factory, so
/// matched values never leak between fragments.
#[derive(Clone)]
pub struct Extension {
    name: String,
    trigger: String,
    factory: Arc<FunctionFactory>,
}

impl Extension {
    pub fn new<F>(name: &str, trigger: &str, factory: F) -> Self
    where
        F: Fn() -> ChtljsFunction + Send + Sync + 'static,
    {
        Self {
            name: name.to_owned(),
            trigger: trigger.to_owned(),
            factory: Arc::new(factory),
        }
    }

    /// An extension cloning a configured function for each fragment.
    ///
    /// The trigger is the pattern's keyword, or the function name if the
    /// pattern has none.
    pub fn from_function(function: ChtljsFunction) -> Self {
        let name = function.name().to_owned();
        let trigger = function
            .syntax()
            .keyword()
            .unwrap_or(function.name())
            .to_owned();
        Self {
            name,
            trigger,
            factory: Arc::new(move || function.clone()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// A fresh function for one fragment.
    pub fn instantiate(&self) -> ChtljsFunction {
        (self.factory)()
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

/// Everything needed to compile one or more files: scanner options, the
/// keyword seed, and the extensions.
///
/// Set up once, then shared read-only by dispatches.
#[derive(Clone, Debug)]
pub struct CompilationContext {
    config: ScannerConfig,
    keywords: KeywordRegistry,
    extensions: Vec<Extension>,
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        let keywords = if config.builtin_keywords {
            KeywordRegistry::with_builtins()
        } else {
            KeywordRegistry::empty()
        };
        Self {
            config,
            keywords,
            extensions: Vec::new(),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn keywords(&self) -> &KeywordRegistry {
        &self.keywords
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Register a CHTL-JS keyword without an extension.
    pub fn register_keyword(&mut self, word: &str) -> bool {
        self.keywords.register(word)
    }

    /// Register `extension` and its trigger keyword.
    ///
    /// An extension with the same name replaces the earlier one in place.
    pub fn register_extension(&mut self, extension: Extension) {
        self.keywords.register(extension.trigger());
        match self
            .extensions
            .iter_mut()
            .find(|existing| existing.name == extension.name)
        {
            Some(existing) => {
                tracing::debug!(extension = extension.name(), "replacing extension");
                *existing = extension;
            }
            None => {
                tracing::debug!(
                    extension = extension.name(),
                    trigger = extension.trigger(),
                    "registered extension"
                );
                self.extensions.push(extension);
            }
        }
    }

    /// Builder form of [`register_extension`](Self::register_extension).
    #[must_use]
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.register_extension(extension);
        self
    }

    /// A scanner configured with this context's keywords.
    pub fn scanner(&self) -> UnifiedScanner {
        UnifiedScanner::with_registry(self.config.clone(), self.keywords.clone())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
