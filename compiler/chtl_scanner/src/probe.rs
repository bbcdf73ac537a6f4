//! Detector probes for CHTL-JS features.
//!
//! Cheap string-to-bool heuristics. They are what the scanner uses to
//! classify a whole script block, and callers can run them directly for
//! quick triage without a scan. All probes ignore the contents of string
//! literals and comments.

use crate::js_regex::{regex_allowed, regex_len};
use crate::keywords::{is_ident_continue, is_ident_start, KeywordRegistry};
use crate::ScannerConfig;

const VIR: &str = "vir";

/// Which CHTL-JS features a script body uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptFeatures {
    /// `{{selector}}` enhanced selectors.
    pub enhanced_selectors: bool,
    /// The `->` operator.
    pub arrow_operators: bool,
    /// An identifier from the keyword registry.
    pub keyword_calls: bool,
    /// `vir name = ...` virtual object declarations.
    pub virtual_objects: bool,
}

impl ScriptFeatures {
    /// Run every enabled probe over `source` in a single masking pass.
    pub fn detect(source: &str, keywords: &KeywordRegistry, config: &ScannerConfig) -> Self {
        let code = mask_literals(source);
        Self {
            enhanced_selectors: config.detect_enhanced_selectors && enhanced_selectors_in(&code),
            arrow_operators: config.detect_arrow_operators && arrow_in(&code),
            keyword_calls: keyword_in(&code, keywords, |word| {
                config.detect_virtual_objects || word != VIR
            }),
            virtual_objects: config.detect_virtual_objects && virtual_object_in(&code),
        }
    }

    /// Returns `true` if any feature was found.
    pub fn is_chtljs(&self) -> bool {
        self.enhanced_selectors || self.arrow_operators || self.keyword_calls || self.virtual_objects
    }
}

/// Returns `true` if `source` contains a `{{...}}` enhanced selector.
///
/// The selector body must be a single line without `;`, which keeps nested
/// statement blocks (`{{ a(); }}`) from matching.
pub fn has_enhanced_selectors(source: &str) -> bool {
    enhanced_selectors_in(&mask_literals(source))
}

/// Returns `true` if `source` uses the `->` operator outside comments and strings.
///
/// A `-->` is a decrement followed by `>` and does not count.
pub fn has_arrow_operators(source: &str) -> bool {
    arrow_in(&mask_literals(source))
}

/// Returns `true` if `source` contains an identifier registered in `keywords`.
pub fn has_chtljs_function_calls(source: &str, keywords: &KeywordRegistry) -> bool {
    keyword_in(&mask_literals(source), keywords, |_| true)
}

/// Returns `true` if `source` declares a virtual object (`vir name =`).
pub fn has_virtual_object_syntax(source: &str) -> bool {
    virtual_object_in(&mask_literals(source))
}

/// Copy `source` with string, regex and comment bodies blanked out.
///
/// Quotes, comment delimiters and the opening `/` of a regex are kept;
/// everything after them up to the literal's end becomes a space, so byte offsets line up with the original text. An unterminated
/// literal blanks out the rest of the input.
pub(crate) fn mask_literals(source: &str) -> Vec<u8> {
    let mut out = source.as_bytes().to_vec();
    let len = out.len();
    let mut i = 0;
    while i < len {
        match out[i] {
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < len && out[i] != quote {
                    if out[i] == b'\\' && i + 1 < len {
                        out[i] = b' ';
                        i += 1;
                    }
                    out[i] = b' ';
                    i += 1;
                }
                i += 1;
            }
            b'/' if i + 1 < len && out[i + 1] == b'/' => {
                i += 2;
                while i < len && out[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            b'/' if i + 1 < len && out[i + 1] == b'*' => {
                i += 2;
                while i < len && !(out[i] == b'*' && i + 1 < len && out[i + 1] == b'/') {
                    out[i] = b' ';
                    i += 1;
                }
                i += 2;
            }
            b'/' if regex_allowed(&out[..i]) => match regex_len(&out[i..]) {
                Some(len) => {
                    out[i + 1..i + len].fill(b' ');
                    i += len;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    out
}

/// Iterate over `(offset, identifier)` pairs in masked code.
pub(crate) fn identifiers(code: &[u8]) -> impl Iterator<Item = (usize, &str)> {
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < code.len() {
            let b = code[i];
            let boundary = i == 0 || !is_ident_continue(code[i - 1]);
            if is_ident_start(b) && boundary {
                let start = i;
                while i < code.len() && is_ident_continue(code[i]) {
                    i += 1;
                }
                if let Ok(word) = std::str::from_utf8(&code[start..i]) {
                    return Some((start, word));
                }
            } else {
                i += 1;
            }
        }
        None
    })
}

fn enhanced_selectors_in(code: &[u8]) -> bool {
    let mut from = 0;
    while let Some(open) = memchr::memmem::find(&code[from..], b"{{") {
        let body_start = from + open + 2;
        let body_len = code[body_start..]
            .iter()
            .take_while(|&&b| !matches!(b, b'{' | b'}' | b';' | b'\n'))
            .count();
        let close = body_start + body_len;
        let body = &code[body_start..close];
        if !body.trim_ascii().is_empty() && code[close..].starts_with(b"}}") {
            return true;
        }
        from = body_start;
    }
    false
}

/// `->` not preceded by another `-`, so `i-->0` is a decrement.
fn arrow_in(code: &[u8]) -> bool {
    memchr::memmem::find_iter(code, b"->").any(|at| at == 0 || code[at - 1] != b'-')
}

fn keyword_in(code: &[u8], keywords: &KeywordRegistry, accept: impl Fn(&str) -> bool) -> bool {
    !keywords.is_empty()
        && identifiers(code).any(|(_, word)| keywords.contains(word) && accept(word))
}

fn virtual_object_in(code: &[u8]) -> bool {
    identifiers(code).any(|(offset, word)| {
        if word != VIR {
            return false;
        }
        let rest = &code[offset + word.len()..];
        let gap = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
        if gap == 0 || !rest.get(gap).is_some_and(|&b| is_ident_start(b)) {
            return false;
        }
        let name_len = rest[gap..].iter().take_while(|&&b| is_ident_continue(b)).count();
        let after = &rest[gap + name_len..];
        let ws = after.iter().take_while(|b| b.is_ascii_whitespace()).count();
        after.get(ws) == Some(&b'=') && after.get(ws + 1) != Some(&b'=')
    })
}
