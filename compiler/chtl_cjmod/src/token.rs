//! Generic token grammar used by the lookup engine.
//!
//! This is deliberately not a JavaScript lexer. It recognises four value
//! shapes (identifier, number, quoted string, balanced group) and treats
//! everything else as punctuation. Whitespace and comments are dropped.
//! Unterminated strings and groups run to the end of the input instead of
//! failing: the scanner has already rejected those for real fragments.

use std::ops::Range;

use chtl_scanner::{is_ident_continue, is_ident_start, Cursor, SourceBuffer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    /// `"..."`, `'...'` or `` `...` ``, quotes included.
    Str,
    /// `{...}` or `[...]`, brackets included, nesting balanced.
    Group,
    /// Any other single byte, plus the two-byte `->` and `=>`.
    Punct,
}

/// A token as a byte range into the tokenized text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
}

impl Token {
    /// The token's text within `source`.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or_default()
    }

    /// Value tokens are everything but punctuation.
    #[inline]
    pub fn is_value(&self) -> bool {
        self.kind != TokenKind::Punct
    }

    #[inline]
    pub fn range(&self) -> Range<u32> {
        self.start..self.end
    }
}

/// Tokenize `source` in one pass.
///
/// Returns no tokens for sources too large for `u32` offsets.
pub fn tokenize(source: &str) -> Vec<Token> {
    let Some(buffer) = SourceBuffer::new(source) else {
        return Vec::new();
    };
    let mut cursor = buffer.cursor();
    let mut tokens = Vec::new();
    while let Some(token) = lex_one(&mut cursor) {
        tokens.push(token);
    }
    tokens
}

/// Lex the token at the cursor, skipping leading trivia.
pub(crate) fn lex_one(cursor: &mut Cursor<'_>) -> Option<Token> {
    loop {
        cursor.eat_whitespace();
        if cursor.is_eof() {
            return None;
        }
        if skip_comment(cursor) {
            continue;
        }
        let start = cursor.pos();
        let kind = match cursor.current() {
            quote @ (b'"' | b'\'' | b'`') => {
                skip_string(cursor, quote);
                TokenKind::Str
            }
            b'{' | b'[' => {
                skip_group(cursor);
                TokenKind::Group
            }
            b if is_ident_start(b) => {
                cursor.eat_while(is_ident_continue);
                TokenKind::Ident
            }
            b'0'..=b'9' => {
                eat_number(cursor);
                TokenKind::Number
            }
            b'.' if cursor.peek().is_ascii_digit() => {
                eat_number(cursor);
                TokenKind::Number
            }
            b'-' | b'=' if cursor.peek() == b'>' => {
                cursor.advance_n(2);
                TokenKind::Punct
            }
            _ => {
                cursor.advance_char();
                TokenKind::Punct
            }
        };
        return Some(Token {
            kind,
            start,
            end: cursor.pos(),
        });
    }
}

/// Skip a `//` or `/* */` comment at the cursor. Returns `false` if there is none.
pub(crate) fn skip_comment(cursor: &mut Cursor<'_>) -> bool {
    if cursor.current() != b'/' {
        return false;
    }
    match cursor.peek() {
        b'/' => {
            cursor.eat_until_newline_or_eof();
            true
        }
        b'*' => {
            cursor.advance_n(2);
            cursor.eat_past(b"*/");
            true
        }
        _ => false,
    }
}

/// Skip a string literal whose opening quote is at the cursor.
pub(crate) fn skip_string(cursor: &mut Cursor<'_>, quote: u8) {
    cursor.advance();
    loop {
        match cursor.skip_to_string_delim(quote) {
            0 => return,
            b'\\' => {
                cursor.advance();
                if cursor.is_eof() {
                    return;
                }
                cursor.advance_char();
            }
            _ => {
                cursor.advance();
                return;
            }
        }
    }
}

/// Skip a balanced `{...}`, `[...]` or `(...)` group starting at the cursor.
fn skip_group(cursor: &mut Cursor<'_>) {
    let mut depth = 0u32;
    while !cursor.is_eof() {
        if skip_comment(cursor) {
            continue;
        }
        match cursor.current() {
            quote @ (b'"' | b'\'' | b'`') => {
                skip_string(cursor, quote);
                continue;
            }
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    cursor.advance();
                    return;
                }
            }
            _ => {}
        }
        cursor.advance_char();
    }
}

fn eat_number(cursor: &mut Cursor<'_>) {
    // Covers `1`, `1.5`, `1e9`, `0x1F` and `1_000` without validating them.
    cursor.eat_while(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_');
}
