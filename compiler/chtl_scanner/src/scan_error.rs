//! Scan failures.
//!
//! A failed scan returns no fragments at all: once brace or string state
//! desynchronizes, no fragment boundary before the failure is trustworthy.

use std::fmt;

use thiserror::Error;

/// The construct that was left open when input ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Construct {
    /// A CHTL element block `{ ... }`.
    Block,
    /// A `style { ... }` block.
    StyleBlock,
    /// A `script { ... }` block.
    ScriptBlock,
    /// A `<style>` tag body without `</style>`.
    StyleTag,
    /// A `<script>` tag body without `</script>`.
    ScriptTag,
    /// A quoted string literal.
    String,
    /// A `/* ... */` comment.
    BlockComment,
}

impl Construct {
    pub const fn description(self) -> &'static str {
        match self {
            Construct::Block => "block",
            Construct::StyleBlock => "style block",
            Construct::ScriptBlock => "script block",
            Construct::StyleTag => "<style> tag",
            Construct::ScriptTag => "<script> tag",
            Construct::String => "string literal",
            Construct::BlockComment => "block comment",
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Error returned by [`UnifiedScanner::scan`](crate::UnifiedScanner::scan).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// A block, string, or comment was never closed.
    #[error("{filename}: unterminated {construct} starting at byte {offset}")]
    Unterminated {
        construct: Construct,
        /// Byte offset where the unterminated construct began.
        offset: u32,
        filename: String,
    },
    /// The source does not fit the `u32` offset space.
    #[error("{filename}: source of {len} bytes exceeds the 4 GiB scan limit")]
    SourceTooLarge { len: usize, filename: String },
}

impl ScanError {
    /// Byte offset of the failure, if it has one.
    pub fn offset(&self) -> Option<u32> {
        match self {
            ScanError::Unterminated { offset, .. } => Some(*offset),
            ScanError::SourceTooLarge { .. } => None,
        }
    }

    /// The unterminated construct, if any.
    pub fn construct(&self) -> Option<Construct> {
        match self {
            ScanError::Unterminated { construct, .. } => Some(*construct),
            ScanError::SourceTooLarge { .. } => None,
        }
    }
}
