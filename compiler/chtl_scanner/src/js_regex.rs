//! JavaScript regular expression literals in script bodies.
//!
//! A `/` opens a regex where an expression may begin, which is decided
//! from the previous significant byte or word. After a value it divides.

use crate::keywords::is_ident_continue;

/// Words after which an expression, and so a regex, may begin.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Returns `true` if a `/` directly after `before` opens a regex literal.
pub(crate) fn regex_allowed(before: &[u8]) -> bool {
    let before = before.trim_ascii_end();
    let Some(&last) = before.last() else {
        return true;
    };
    if is_ident_continue(last) {
        let word_len = before
            .iter()
            .rev()
            .take_while(|&&b| is_ident_continue(b))
            .count();
        let word = &before[before.len() - word_len..];
        return EXPRESSION_KEYWORDS.iter().any(|kw| kw.as_bytes() == word);
    }
    matches!(
        last,
        b'(' | b','
            | b'='
            | b':'
            | b'['
            | b'!'
            | b'&'
            | b'|'
            | b'?'
            | b'{'
            | b'}'
            | b';'
            | b'+'
            | b'-'
            | b'*'
            | b'%'
            | b'<'
            | b'>'
            | b'~'
            | b'^'
    )
}

/// Byte length of the regex literal `rest` starts with, flags included.
///
/// `rest` starts on the opening `/`. A `/` inside a `[...]` class or after
/// `\` does not close the literal. `None` if a line break or the end of
/// input comes first, in which case the `/` is a division.
pub(crate) fn regex_len(rest: &[u8]) -> Option<usize> {
    let mut in_class = false;
    let mut i = 1;
    loop {
        match *rest.get(i)? {
            b'\n' | b'\r' | 0 => return None,
            b'\\' => i += 1,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => break,
            _ => {}
        }
        i += 1;
    }
    i += 1;
    let flags = rest[i..].iter().take_while(|&&b| is_ident_continue(b)).count();
    Some(i + flags)
}

#[cfg(test)]
mod tests;
