//! Sentinel-terminated source buffer for zero-bounds-check scanning.
//!
//! The buffer guarantees a `0x00` sentinel byte after the source content,
//! allowing the scanner to detect EOF without explicit bounds checking.
//! The total buffer size is rounded up to the next 64-byte boundary, which
//! also guarantees that `peek()` at the last content byte reads the sentinel.

use crate::Cursor;

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// Sentinel-terminated source buffer.
///
/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
///
/// The buffer keeps a borrow of the original `&str` so that slices handed
/// out by the [`Cursor`] never need to re-validate UTF-8.
#[derive(Clone, Debug)]
pub struct SourceBuffer<'src> {
    /// Owned buffer: `[source_bytes..., 0x00 sentinel, 0x00 padding...]`.
    buf: Vec<u8>,
    /// The original source text.
    source: &'src str,
    /// Length of the actual source content (excludes sentinel and padding).
    source_len: u32,
}

impl<'src> SourceBuffer<'src> {
    /// Create a new sentinel-terminated buffer from source text.
    ///
    /// Returns `None` when the source does not fit the `u32` offset space
    /// used by fragments; the scanner reports that as
    /// [`ScanError::SourceTooLarge`](crate::ScanError::SourceTooLarge).
    pub fn new(source: &'src str) -> Option<Self> {
        let source_bytes = source.as_bytes();
        let source_len = u32::try_from(source_bytes.len()).ok()?;
        let len = source_bytes.len();

        // Round up to next 64-byte boundary (minimum: source + 1 sentinel byte).
        let padded_len = (len + 1 + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        // The sentinel (buf[source_len]) and padding are already 0x00.
        let mut buf = vec![0u8; padded_len];
        buf[..len].copy_from_slice(source_bytes);

        Some(Self {
            buf,
            source,
            source_len,
        })
    }

    /// Returns the source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// Returns the original source text.
    pub fn as_str(&self) -> &'src str {
        self.source
    }

    /// Create a [`Cursor`] positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source, self.source_len)
    }

    /// Length of the source content in bytes.
    pub fn len(&self) -> u32 {
        self.source_len
    }

    /// Returns `true` if the source content is empty.
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests;
