//! Typed source fragments produced by the unified scanner.

use std::fmt;
use std::ops::Range;

/// Language of a fragment.
///
/// Closed set: text the scanner cannot attribute to a style or script
/// block is always [`FragmentKind::Chtl`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Host markup text.
    Chtl,
    /// Script block using CHTL-JS features or registered keywords.
    ChtlJs,
    /// Style block body.
    Css,
    /// Script block with no CHTL-JS features.
    Js,
}

impl FragmentKind {
    /// Short lowercase name, used in logs and statistics.
    pub const fn as_str(self) -> &'static str {
        match self {
            FragmentKind::Chtl => "chtl",
            FragmentKind::ChtlJs => "chtl-js",
            FragmentKind::Css => "css",
            FragmentKind::Js => "js",
        }
    }

    /// Returns `true` for the two script kinds.
    pub const fn is_script(self) -> bool {
        matches!(self, FragmentKind::ChtlJs | FragmentKind::Js)
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous, typed slice of source text.
///
/// `content` is the exact substring `source[start..end]`, never trimmed or
/// normalized. Fragments are immutable once produced; code generated for a
/// fragment travels separately, keyed by the fragment's range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fragment {
    kind: FragmentKind,
    content: String,
    start: u32,
    end: u32,
}

impl Fragment {
    /// Create a fragment covering `content` starting at byte `start`.
    ///
    /// The scanner is the normal producer; this constructor exists so that
    /// extension authors can test against hand-written fragments.
    ///
    /// # Panics
    ///
    /// Panics if `start + content.len()` overflows `u32`.
    pub fn new(kind: FragmentKind, content: impl Into<String>, start: u32) -> Self {
        let content = content.into();
        let len = u32::try_from(content.len())
            .ok()
            .and_then(|len| start.checked_add(len));
        let Some(end) = len else {
            panic!("fragment end exceeds u32::MAX");
        };
        Self {
            kind,
            content,
            start,
            end,
        }
    }

    /// Language of this fragment.
    #[inline]
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Exact source text covered by this fragment.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Byte offset of the first byte.
    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Byte offset one past the last byte.
    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Byte range into the original source.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if the fragment covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A break in the coverage invariant, reported by [`validate_coverage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoverageGap {
    /// The first fragment does not start at offset 0.
    LeadingGap { first_start: u32 },
    /// `fragments[index].end != fragments[index + 1].start`.
    Discontinuity { index: usize, end: u32, next_start: u32 },
    /// The last fragment does not end at the source length.
    TrailingGap { last_end: u32, source_len: u32 },
    /// No fragments for a non-empty source.
    Missing { source_len: u32 },
}

/// Check that `fragments` tile `0..source_len` with no gaps or overlaps.
pub fn validate_coverage(fragments: &[Fragment], source_len: u32) -> Result<(), CoverageGap> {
    let (Some(first), Some(last)) = (fragments.first(), fragments.last()) else {
        return if source_len == 0 {
            Ok(())
        } else {
            Err(CoverageGap::Missing { source_len })
        };
    };
    if first.start != 0 {
        return Err(CoverageGap::LeadingGap {
            first_start: first.start,
        });
    }
    for (index, pair) in fragments.windows(2).enumerate() {
        if pair[0].end != pair[1].start {
            return Err(CoverageGap::Discontinuity {
                index,
                end: pair[0].end,
                next_start: pair[1].start,
            });
        }
    }
    if last.end != source_len {
        return Err(CoverageGap::TrailingGap {
            last_end: last.end,
            source_len,
        });
    }
    Ok(())
}
