//! Trigger keywords that mark a script block as CHTL-JS.
//!
//! The registry is seeded with the builtin CHTL-JS functions and grows as
//! extensions register their call names. Registration is a configuration
//! step: it happens before scanning and is never interleaved with a scan.

use rustc_hash::FxHashSet;

/// Builtin CHTL-JS trigger keywords.
pub const BUILTIN_KEYWORDS: &[&str] = &["listen", "delegate", "animate", "vir"];

/// Set of identifiers that force CHTL-JS classification.
#[derive(Clone, Debug, Default)]
pub struct KeywordRegistry {
    words: FxHashSet<String>,
}

impl KeywordRegistry {
    /// An empty registry (no builtins).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry seeded with [`BUILTIN_KEYWORDS`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for word in BUILTIN_KEYWORDS {
            registry.words.insert((*word).to_owned());
        }
        registry
    }

    /// Add a trigger keyword.
    ///
    /// Returns `true` if the word was newly added. Registering a word twice
    /// is a no-op. Words that are not identifiers can never match a script
    /// token and are rejected (returns `false`).
    pub fn register(&mut self, word: &str) -> bool {
        if !is_identifier(word) {
            tracing::warn!(word, "ignoring keyword that is not an identifier");
            return false;
        }
        if self.words.contains(word) {
            return false;
        }
        tracing::debug!(word, "registered CHTL-JS keyword");
        self.words.insert(word.to_owned())
    }

    /// Returns `true` if `word` is registered.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Returns `true` if `word` is one of the builtin keywords.
    pub fn is_builtin(word: &str) -> bool {
        BUILTIN_KEYWORDS.contains(&word)
    }

    /// Number of registered keywords.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if no keywords are registered.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over registered keywords in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Returns `true` if `b` can start an identifier.
///
/// Non-ASCII bytes are accepted so that Unicode identifiers stay in one
/// piece; the scanner never needs to know their exact category.
#[inline]
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

/// Returns `true` if `b` can continue an identifier.
#[inline]
pub fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Returns `true` if `word` is a non-empty identifier.
pub fn is_identifier(word: &str) -> bool {
    let bytes = word.as_bytes();
    match bytes.split_first() {
        Some((&first, rest)) => is_ident_start(first) && rest.iter().all(|&b| is_ident_continue(b)),
        None => false,
    }
}
