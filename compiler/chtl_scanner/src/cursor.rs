//! Cursor over a sentinel-terminated buffer.
//!
//! The cursor advances through the buffer byte-by-byte. EOF is detected
//! when the current byte equals the sentinel (`0x00`) and the position
//! has reached or exceeded the source length. Interior null bytes are
//! distinguished from EOF by comparing `pos` against `source_len`.

/// Cursor over a sentinel-terminated byte buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
/// The cursor is [`Copy`], so the scanner can snapshot it for lookahead
/// (e.g. checking whether `script` is followed by `{`) and discard the copy.
///
/// # Invariant
///
/// `buf[source_len] == 0x00`, and all bytes after `source_len` are `0x00`.
/// This is guaranteed by [`SourceBuffer`](crate::SourceBuffer) construction.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Sentinel-terminated buffer (source + sentinel + padding).
    buf: &'a [u8],
    /// Original text, used for slicing without re-validating UTF-8.
    src: &'a str,
    /// Current read position (byte index into `buf`).
    pos: u32,
    /// Length of actual source content (excludes sentinel and padding).
    source_len: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8], src: &'a str, source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(buf[source_len as usize] == 0, "sentinel byte must be 0x00");
        Self {
            buf,
            src,
            pos: 0,
            source_len,
        }
    }

    /// Returns the byte at the current position, `0x00` at EOF.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// Returns the byte one position ahead of current.
    ///
    /// Safe at the last content byte: the sentinel follows it.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf[self.pos as usize + 1]
    }

    /// Advance the cursor by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance the cursor by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Returns `true` if the cursor has reached EOF.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current() == 0 && self.pos >= self.source_len
    }

    /// Current byte offset in the source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the source content (excludes sentinel and padding).
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Extract a source substring.
    ///
    /// Returns an empty string if `start..end` does not fall on character
    /// boundaries; scanner boundaries are always at ASCII delimiters, so
    /// that only happens on misuse.
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        debug_assert!(
            end <= self.source_len,
            "slice end {end} exceeds source length {}",
            self.source_len
        );
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        self.src.get(start as usize..end as usize).unwrap_or_default()
    }

    /// Extract a source substring from `start` to the current position.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Returns `true` if the remaining source starts with `needle`.
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// # Contract
    ///
    /// `pred(0)` must return `false` so the sentinel terminates the loop.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while pred(self.buf[self.pos as usize]) {
            self.pos += 1;
        }
    }

    /// Advance past ASCII whitespace, including newlines.
    #[inline]
    pub fn eat_whitespace(&mut self) {
        self.eat_while(|b| b.is_ascii_whitespace());
    }

    /// Returns the number of bytes in the UTF-8 character starting with `byte`.
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Advance the cursor past one full UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.advance_n(width);
    }

    /// Advance to the next `\n` byte or EOF.
    ///
    /// Used to skip line comment bodies. The newline itself is not consumed.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn eat_until_newline_or_eof(&mut self) {
        if let Some(offset) = memchr::memchr(b'\n', self.remaining()) {
            self.pos += offset as u32;
        } else {
            self.pos = self.source_len;
        }
    }

    /// Advance to the next `quote` or `\` inside a string literal body.
    ///
    /// Returns the byte found, or `0` at EOF (cursor parked on the sentinel).
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_string_delim(&mut self, quote: u8) -> u8 {
        if let Some(offset) = memchr::memchr2(quote, b'\\', self.remaining()) {
            self.pos += offset as u32;
            self.buf[self.pos as usize]
        } else {
            self.pos = self.source_len;
            0
        }
    }

    /// Advance past the next occurrence of `needle`.
    ///
    /// Returns `false` (cursor parked at EOF) if `needle` does not occur in
    /// the remaining source. Used for block comment bodies and raw tag bodies.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn eat_past(&mut self, needle: &[u8]) -> bool {
        if let Some(offset) = memchr::memmem::find(self.remaining(), needle) {
            self.pos += (offset + needle.len()) as u32;
            true
        } else {
            self.pos = self.source_len;
            false
        }
    }

    /// Source bytes from the current position to the end of content.
    #[inline]
    fn remaining(&self) -> &'a [u8] {
        let start = (self.pos.min(self.source_len)) as usize;
        &self.buf[start..self.source_len as usize]
    }
}

#[cfg(test)]
mod tests;
