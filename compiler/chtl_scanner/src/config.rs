//! Scanner configuration.

/// Options controlling fragment classification.
///
/// All detectors are on by default. Turning a detector off only affects
/// script classification; block boundaries are never configurable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Seed the keyword registry with `listen`, `delegate`, `animate`, `vir`.
    pub builtin_keywords: bool,
    /// Classify scripts containing `{{selector}}` as CHTL-JS.
    pub detect_enhanced_selectors: bool,
    /// Classify scripts containing `->` as CHTL-JS.
    pub detect_arrow_operators: bool,
    /// Classify scripts containing `vir name =` as CHTL-JS. When off, the
    /// `vir` keyword no longer counts as a keyword call either.
    pub detect_virtual_objects: bool,
    /// Recognise `<script>` and `<style>` tags in addition to `script {}` blocks.
    pub html_tags: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            builtin_keywords: true,
            detect_enhanced_selectors: true,
            detect_arrow_operators: true,
            detect_virtual_objects: true,
            html_tags: true,
        }
    }
}

impl ScannerConfig {
    #[must_use]
    pub fn with_builtin_keywords(mut self, enabled: bool) -> Self {
        self.builtin_keywords = enabled;
        self
    }

    #[must_use]
    pub fn with_enhanced_selectors(mut self, enabled: bool) -> Self {
        self.detect_enhanced_selectors = enabled;
        self
    }

    #[must_use]
    pub fn with_arrow_operators(mut self, enabled: bool) -> Self {
        self.detect_arrow_operators = enabled;
        self
    }

    #[must_use]
    pub fn with_virtual_objects(mut self, enabled: bool) -> Self {
        self.detect_virtual_objects = enabled;
        self
    }

    #[must_use]
    pub fn with_html_tags(mut self, enabled: bool) -> Self {
        self.html_tags = enabled;
        self
    }
}
