//! Fragment-relative lookup engine.
//!
//! A [`CjmodScanner`] walks one fragment's text. It finds keyword
//! occurrences, peeks at neighbouring tokens, and buffers opaque regions
//! through a LIFO stack of [`Policy`] frames. String literals and comments
//! are always skipped as a whole, so delimiters inside them never count.

use std::fmt;
use std::ops::Range;

use chtl_scanner::{is_ident_continue, is_ident_start, Cursor, SourceBuffer};
use smallvec::SmallVec;

use crate::token::{lex_one, skip_comment, skip_string, tokenize, Token};
use crate::CjmodError;

/// Buffering mode of a policy frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Tokens are read one at a time.
    #[default]
    Normal,
    /// The region is returned verbatim when the frame ends.
    Collect,
    /// The region is consumed and discarded.
    Skip,
}

impl Policy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Policy::Normal => "normal",
            Policy::Collect => "collect",
            Policy::Skip => "skip",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PolicyFrame {
    trigger: String,
    policy: Policy,
    /// First byte after the opening trigger.
    start: u32,
}

/// The keyword occurrence found by the last [`CjmodScanner::scan_keyword`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct KeywordHit {
    pub(crate) word: String,
    pub(crate) range: Range<u32>,
}

/// Lookup engine over one fragment.
///
/// Sources too large for `u32` offsets behave as empty.
pub struct CjmodScanner<'f> {
    source: &'f str,
    buffer: Option<SourceBuffer<'f>>,
    pos: u32,
    keyword: Option<KeywordHit>,
    stack: SmallVec<[PolicyFrame; 4]>,
}

impl<'f> CjmodScanner<'f> {
    pub fn new(source: &'f str) -> Self {
        Self {
            source,
            buffer: SourceBuffer::new(source),
            pos: 0,
            keyword: None,
            stack: SmallVec::new(),
        }
    }

    pub fn source(&self) -> &'f str {
        self.source
    }

    /// Current byte offset into the fragment.
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Policy of the top frame, or `Normal` with an empty stack.
    pub fn policy(&self) -> Policy {
        self.stack.last().map_or(Policy::Normal, |frame| frame.policy)
    }

    /// Number of open policy frames.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The keyword found by the last successful [`scan_keyword`](Self::scan_keyword).
    pub fn current_keyword(&self) -> Option<&str> {
        self.keyword.as_ref().map(|hit| hit.word.as_str())
    }

    /// Rewind to the start and drop the keyword and all policy frames.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.keyword = None;
        self.stack.clear();
    }

    /// Find the next occurrence of identifier `keyword` at or after the
    /// cursor and move past it.
    pub fn scan_keyword(&mut self, keyword: &str) -> Result<Range<u32>, CjmodError> {
        let Some(range) = self.find_word(self.pos, keyword) else {
            return Err(CjmodError::KeywordNotFound {
                keyword: keyword.to_owned(),
            });
        };
        tracing::trace!(keyword, start = range.start, "keyword found");
        self.pos = range.end;
        self.keyword = Some(KeywordHit {
            word: keyword.to_owned(),
            range: range.clone(),
        });
        Ok(range)
    }

    /// The value token `offset` steps away from `keyword`.
    ///
    /// Uses the current keyword occurrence if it is `keyword`, otherwise
    /// the first occurrence in the fragment. Only value tokens count;
    /// punctuation is stepped over. Walking off either end yields `""`.
    pub fn peek_keyword(&self, keyword: &str, offset: isize) -> Result<&'f str, CjmodError> {
        if offset == 0 {
            return Err(CjmodError::ZeroOffset);
        }
        let anchor = match &self.keyword {
            Some(hit) if hit.word == keyword => Some(hit.range.clone()),
            _ => self.find_word(0, keyword),
        };
        let Some(anchor) = anchor else {
            return Err(CjmodError::KeywordNotFound {
                keyword: keyword.to_owned(),
            });
        };
        let tokens = self.level_tokens(anchor.start);
        let Some(index) = tokens.iter().position(|t| t.start == anchor.start) else {
            return Ok("");
        };
        let steps = offset.unsigned_abs() - 1;
        let found = if offset > 0 {
            tokens[index + 1..].iter().filter(|t| t.is_value()).nth(steps)
        } else {
            tokens[..index].iter().rev().filter(|t| t.is_value()).nth(steps)
        };
        Ok(found.map_or("", |t| t.text(self.source)))
    }

    /// Read the next token.
    ///
    /// Under a `Collect` or `Skip` frame the token is consumed but not
    /// returned. Returns `None` at the end of the fragment.
    pub fn next_token(&mut self) -> Option<&'f str> {
        let token = {
            let mut cursor = self.cursor_at(self.pos)?;
            lex_one(&mut cursor)?
        };
        self.pos = token.end;
        match self.policy() {
            Policy::Normal => Some(token.text(self.source)),
            Policy::Collect | Policy::Skip => None,
        }
    }

    /// Open a policy region just after the next `trigger`.
    pub fn policy_change_begin(
        &mut self,
        trigger: &str,
        policy: Policy,
    ) -> Result<(), CjmodError> {
        let found = if trigger.is_empty() {
            None
        } else {
            self.find_outside_literals(self.pos, trigger)
        };
        let Some(at) = found else {
            return Err(CjmodError::TriggerNotFound {
                trigger: trigger.to_owned(),
                from: self.pos,
            });
        };
        let start = at + byte_len(trigger);
        tracing::trace!(
            trigger,
            %policy,
            start,
            depth = self.stack.len() + 1,
            "policy begin"
        );
        self.stack.push(PolicyFrame {
            trigger: trigger.to_owned(),
            policy,
            start,
        });
        self.pos = start;
        Ok(())
    }

    /// Close the top policy region at `trigger` and return its contents.
    ///
    /// The region ends before a `trigger` seen outside any bracket pair
    /// opened inside the region, or just after a closing bracket equal to
    /// `trigger` that closes the region's outermost pair. A region opened
    /// by `{`, `(` or `[` ends at the bracket matching the opener; a region
    /// closed by its opener's pair before `trigger` is unterminated.
    /// `resume` must be
    /// the policy of the frame underneath (`Normal` for the last frame);
    /// anything else is a [`CjmodError::PolicyStackMismatch`] and leaves
    /// the stack untouched.
    ///
    /// Returns the verbatim region for `Collect`, an empty string for
    /// `Skip`, and the region's value tokens joined by spaces for `Normal`.
    pub fn policy_change_end(
        &mut self,
        trigger: &str,
        resume: Policy,
    ) -> Result<String, CjmodError> {
        let Some(frame) = self.stack.last() else {
            return Err(CjmodError::PolicyStackEmpty);
        };
        let expected = self
            .stack
            .len()
            .checked_sub(2)
            .and_then(|below| self.stack.get(below))
            .map_or(Policy::Normal, |frame| frame.policy);
        if resume != expected {
            return Err(CjmodError::PolicyStackMismatch {
                expected,
                found: resume,
            });
        }
        let Some((end, next)) = self.region_end(frame.start, &frame.trigger, trigger) else {
            return Err(CjmodError::Unterminated {
                trigger: trigger.to_owned(),
                policy: frame.policy,
                offset: frame.start,
            });
        };
        let region = self.slice(frame.start, end);
        let output = match frame.policy {
            Policy::Collect => region.to_owned(),
            Policy::Skip => String::new(),
            Policy::Normal => tokenize(region)
                .iter()
                .filter(|t| t.is_value())
                .map(|t| t.text(region))
                .collect::<Vec<_>>()
                .join(" "),
        };
        tracing::trace!(
            trigger,
            opened_by = %frame.trigger,
            policy = %frame.policy,
            start = frame.start,
            end,
            "policy end"
        );
        self.stack.pop();
        self.pos = next;
        Ok(output)
    }

    // ─── Crate-internal cursor helpers used by matching ────────────────

    pub(crate) fn keyword_hit(&self) -> Option<&KeywordHit> {
        self.keyword.as_ref()
    }

    pub(crate) fn set_position(&mut self, pos: u32) {
        self.pos = pos.min(self.len());
    }

    pub(crate) fn clear_policies(&mut self) {
        self.stack.clear();
    }

    /// Error if policy frames are still open.
    pub(crate) fn ensure_balanced(&self) -> Result<(), CjmodError> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(CjmodError::UnbalancedPolicyStack {
                depth: self.stack.len(),
            })
        }
    }

    /// Skip whitespace and comments at the cursor.
    pub(crate) fn skip_trivia(&mut self) {
        let Some(mut cursor) = self.cursor_at(self.pos) else {
            return;
        };
        loop {
            cursor.eat_whitespace();
            if !skip_comment(&mut cursor) {
                break;
            }
        }
        self.pos = cursor.pos();
    }

    /// The next character after optional trivia, without consuming it.
    pub(crate) fn next_char(&mut self) -> Option<char> {
        self.skip_trivia();
        self.source.get(self.pos as usize..)?.chars().next()
    }

    /// Consume `c` after optional trivia. Returns `false` if it is not next.
    pub(crate) fn eat_char(&mut self, c: char) -> bool {
        self.skip_trivia();
        let rest = self.source.get(self.pos as usize..).unwrap_or_default();
        if rest.starts_with(c) {
            self.pos += byte_len(c.encode_utf8(&mut [0; 4]));
            true
        } else {
            false
        }
    }

    /// Consume the token `word` after optional trivia.
    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        self.skip_trivia();
        let token = self.cursor_at(self.pos).and_then(|mut cursor| lex_one(&mut cursor));
        match token {
            Some(token) if token.text(self.source) == word => {
                self.pos = token.end;
                true
            }
            _ => false,
        }
    }

    /// Consume one argument expression and return its trimmed range.
    ///
    /// Stops before `,` `;` `)` `]` `}` at bracket depth 0, before `:` too
    /// when `stop_at_colon` is set, and before the identifier `stop_word`.
    pub(crate) fn collect_value(
        &mut self,
        stop_at_colon: bool,
        stop_word: Option<&str>,
    ) -> Range<u32> {
        self.skip_trivia();
        let start = self.pos;
        let Some(mut cursor) = self.cursor_at(start) else {
            return start..start;
        };
        let mut depth = 0u32;
        let mut last_significant = start;
        while !cursor.is_eof() {
            if skip_comment(&mut cursor) {
                continue;
            }
            match cursor.current() {
                quote @ (b'"' | b'\'' | b'`') => skip_string(&mut cursor, quote),
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    cursor.advance();
                }
                b')' | b']' | b'}' | b',' | b';' if depth == 0 => break,
                b':' if depth == 0 && stop_at_colon => break,
                b if is_ident_start(b) => {
                    let word = cursor.pos();
                    cursor.eat_while(is_ident_continue);
                    if depth == 0 && stop_word == Some(cursor.slice_from(word)) {
                        self.pos = word;
                        return start..last_significant;
                    }
                }
                b')' | b']' | b'}' => {
                    depth -= 1;
                    cursor.advance();
                }
                b if b.is_ascii_whitespace() => {
                    cursor.advance();
                    continue;
                }
                _ => cursor.advance_char(),
            }
            last_significant = cursor.pos();
        }
        self.pos = cursor.pos();
        start..last_significant
    }

    /// Tokens at the bracket level of byte `at`: the interior of the
    /// innermost `{}`/`[]` group containing it, or the whole fragment.
    pub(crate) fn level_tokens(&self, at: u32) -> Vec<Token> {
        let Some(mut cursor) = self.cursor_at(0) else {
            return Vec::new();
        };
        let mut open: SmallVec<[u32; 8]> = SmallVec::new();
        while !cursor.is_eof() && cursor.pos() < at {
            if skip_comment(&mut cursor) {
                continue;
            }
            match cursor.current() {
                quote @ (b'"' | b'\'' | b'`') => skip_string(&mut cursor, quote),
                b'{' | b'[' => {
                    open.push(cursor.pos());
                    cursor.advance();
                }
                b'}' | b']' => {
                    open.pop();
                    cursor.advance();
                }
                _ => cursor.advance_char(),
            }
        }
        let start = open.last().map_or(0, |&brace| brace + 1);
        let region = self.slice(start, self.len());
        let mut tokens = tokenize(region);
        if !open.is_empty() {
            // The group's closing bracket is the first unmatched closer.
            if let Some(close) = tokens
                .iter()
                .position(|t| matches!(t.text(region), "}" | "]"))
            {
                tokens.truncate(close);
            }
        }
        for token in &mut tokens {
            token.start += start;
            token.end += start;
        }
        tokens
    }

    // ─── Private helpers ───────────────────────────────────────────────

    fn len(&self) -> u32 {
        self.buffer.as_ref().map_or(0, SourceBuffer::len)
    }

    fn slice(&self, start: u32, end: u32) -> &'f str {
        self.source
            .get(start as usize..end as usize)
            .unwrap_or_default()
    }

    fn cursor_at(&self, pos: u32) -> Option<Cursor<'_>> {
        let buffer = self.buffer.as_ref()?;
        let mut cursor = buffer.cursor();
        cursor.advance_n(pos.min(buffer.len()));
        Some(cursor)
    }

    /// Next identifier equal to `word` at or after `from`, at any depth.
    fn find_word(&self, from: u32, word: &str) -> Option<Range<u32>> {
        let mut cursor = self.cursor_at(from)?;
        while !cursor.is_eof() {
            if skip_comment(&mut cursor) {
                continue;
            }
            match cursor.current() {
                quote @ (b'"' | b'\'' | b'`') => skip_string(&mut cursor, quote),
                b if is_ident_start(b) => {
                    let start = cursor.pos();
                    cursor.eat_while(is_ident_continue);
                    if cursor.slice_from(start) == word {
                        return Some(start..cursor.pos());
                    }
                }
                b'0'..=b'9' => {
                    cursor.eat_while(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_');
                }
                _ => cursor.advance_char(),
            }
        }
        None
    }

    /// Offset of the next `needle` at or after `from`, outside literals.
    fn find_outside_literals(&self, from: u32, needle: &str) -> Option<u32> {
        let mut cursor = self.cursor_at(from)?;
        while !cursor.is_eof() {
            if cursor.starts_with(needle.as_bytes()) {
                return Some(cursor.pos());
            }
            if skip_comment(&mut cursor) {
                continue;
            }
            match cursor.current() {
                quote @ (b'"' | b'\'' | b'`') => skip_string(&mut cursor, quote),
                _ => cursor.advance_char(),
            }
        }
        None
    }

    /// End of a policy region starting at `start`: `(region_end, resume_at)`.
    ///
    /// A region opened by a bracket starts inside that bracket's pair, so
    /// the trigger is looked for at that level and the region cannot
    /// outlive the pair.
    fn region_end(&self, start: u32, opened_by: &str, trigger: &str) -> Option<(u32, u32)> {
        if trigger.is_empty() {
            return None;
        }
        let needle = trigger.as_bytes();
        let trigger_len = byte_len(trigger);
        let mut cursor = self.cursor_at(start)?;
        let base = u32::from(matches!(opened_by.as_bytes().last(), Some(b'(' | b'[' | b'{')));
        let mut depth = base;
        while !cursor.is_eof() {
            let pos = cursor.pos();
            if depth == base && cursor.starts_with(needle) {
                return Some((pos, pos + trigger_len));
            }
            if skip_comment(&mut cursor) {
                continue;
            }
            match cursor.current() {
                quote @ (b'"' | b'\'' | b'`') => skip_string(&mut cursor, quote),
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    cursor.advance();
                }
                close @ (b')' | b']' | b'}') => {
                    if depth == base && base > 0 {
                        return None;
                    }
                    depth = depth.saturating_sub(1);
                    cursor.advance();
                    if depth == 0 && needle == [close].as_slice() {
                        return Some((cursor.pos(), cursor.pos()));
                    }
                }
                _ => cursor.advance_char(),
            }
        }
        None
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "triggers are slices of a fragment, which fits in u32"
)]
fn byte_len(text: &str) -> u32 {
    text.len() as u32
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
