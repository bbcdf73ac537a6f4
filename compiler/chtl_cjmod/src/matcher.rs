//! Matching a declared pattern against a fragment.
//!
//! The keyword anchors the match. Pattern elements before it are matched
//! backwards over the tokens at the keyword's bracket level; elements after
//! it are consumed forwards through the lookup engine, one argument
//! expression per placeholder.

use std::ops::Range;

use chtl_scanner::is_identifier;

use crate::args::Arg;
use crate::token::TokenKind;
use crate::{CjmodError, CjmodScanner, Piece, Syntax};

/// Where a pattern matched, as byte ranges into the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallMatch {
    pub keyword: Range<u32>,
    /// First matched pattern element through the last consumed one.
    pub call: Range<u32>,
}

impl Syntax {
    /// Match this pattern at the next keyword occurrence in `scanner`.
    ///
    /// Earlier matched values are cleared first; bound transforms run as
    /// each placeholder is matched, so a failing fallible transform aborts
    /// the match.
    #[tracing::instrument(level = "debug", skip_all, fields(pattern = %self.pattern()))]
    pub fn match_call(&mut self, scanner: &mut CjmodScanner<'_>) -> Result<CallMatch, CjmodError> {
        let Some((keyword_piece, keyword)) = self.keyword_piece() else {
            return Err(CjmodError::KeywordNotFound {
                keyword: self.pattern().to_owned(),
            });
        };
        let keyword_range = scanner.scan_keyword(&keyword)?;
        self.args_mut().clear_matches();

        let start = self.match_backward(scanner, keyword_piece, keyword_range.start)?;
        self.match_forward(scanner, keyword_piece)?;
        scanner.ensure_balanced()?;

        let call = start..scanner.position();
        tracing::debug!(
            keyword = %keyword,
            start = call.start,
            end = call.end,
            "matched call"
        );
        Ok(CallMatch {
            keyword: keyword_range,
            call,
        })
    }

    /// Piece index and text of the keyword literal.
    fn keyword_piece(&self) -> Option<(usize, String)> {
        self.pieces()
            .iter()
            .enumerate()
            .find_map(|(at, piece)| match *piece {
                Piece::Arg(index) => self
                    .args()
                    .get(index)
                    .filter(|arg| !arg.is_placeholder() && is_identifier(arg.name()))
                    .map(|arg| (at, arg.name().to_owned())),
                Piece::Scaffold(_) => None,
            })
    }

    /// Match the args before the keyword, nearest first. Returns the start
    /// of the earliest matched token.
    fn match_backward(
        &mut self,
        scanner: &CjmodScanner<'_>,
        keyword_piece: usize,
        keyword_start: u32,
    ) -> Result<u32, CjmodError> {
        let before: Vec<usize> = self.pieces()[..keyword_piece]
            .iter()
            .rev()
            .filter_map(|piece| match *piece {
                Piece::Arg(index) => Some(index),
                Piece::Scaffold(_) => None,
            })
            .collect();
        if before.is_empty() {
            return Ok(keyword_start);
        }

        let source = scanner.source();
        let tokens = scanner.level_tokens(keyword_start);
        let anchor = tokens
            .iter()
            .position(|t| t.start == keyword_start)
            .unwrap_or(tokens.len());
        let mut rest = tokens[..anchor].iter().rev();
        let mut start = keyword_start;

        for index in before {
            let Some(arg) = self.args().get(index) else {
                continue;
            };
            let token = if arg.is_placeholder() {
                rest.find(|t| t.is_value())
            } else {
                let ignore = self.ignore_chars();
                rest.find(|t| !(t.kind == TokenKind::Punct && ignore.contains(t.text(source))))
            };
            let Some(token) = token else {
                return Err(CjmodError::TriggerNotFound {
                    trigger: arg.display_name(),
                    from: keyword_start,
                });
            };
            let text = token.text(source);
            if !arg.is_placeholder() && text != arg.name() {
                return Err(CjmodError::TriggerNotFound {
                    trigger: arg.name().to_owned(),
                    from: token.start,
                });
            }
            if let Some(arg) = self.args_mut().arg_mut(index) {
                if arg.is_placeholder() {
                    arg.set_raw(text)?;
                }
            }
            start = token.start;
        }
        Ok(start)
    }

    /// Consume the pieces after the keyword in order.
    ///
    /// Trailing `key: $` entries the call leaves out stay unmatched: a
    /// missing `,` or key right before a closing bracket is skipped.
    fn match_forward(
        &mut self,
        scanner: &mut CjmodScanner<'_>,
        keyword_piece: usize,
    ) -> Result<(), CjmodError> {
        let after = self.pieces()[keyword_piece + 1..].to_vec();
        let mut at = 0;
        while let Some(&piece) = after.get(at) {
            at += 1;
            match piece {
                Piece::Scaffold(c) => {
                    // `f({ a: 1, })`: a trailing comma before a closer is fine.
                    let eaten = scanner.eat_char(c)
                        || (is_closer(c) && scanner.eat_char(',') && scanner.eat_char(c))
                        || (c == ',' && scanner.next_char().is_some_and(is_closer));
                    if !eaten {
                        return Err(CjmodError::TriggerNotFound {
                            trigger: c.to_string(),
                            from: scanner.position(),
                        });
                    }
                }
                Piece::Arg(index) => {
                    let Some(arg) = self.args().get(index) else {
                        continue;
                    };
                    if !arg.is_placeholder() {
                        if scanner.eat_word(arg.name()) {
                            continue;
                        }
                        if scanner.next_char().is_some_and(is_closer) {
                            if let Some(skip) = self.omitted_entry(&after[at..]) {
                                tracing::trace!(key = arg.name(), "keyed argument omitted");
                                at += skip;
                                continue;
                            }
                        }
                        return Err(CjmodError::TriggerNotFound {
                            trigger: arg.name().to_owned(),
                            from: scanner.position(),
                        });
                    }
                    let stop_word = match after.get(at) {
                        Some(Piece::Arg(next)) => self
                            .args()
                            .get(*next)
                            .filter(|next| !next.is_placeholder() && is_identifier(next.name()))
                            .map(Arg::name),
                        _ => None,
                    };
                    let range = scanner.collect_value(arg.terminator() == Some(':'), stop_word);
                    let raw = scanner
                        .source()
                        .get(range.start as usize..range.end as usize)
                        .unwrap_or_default();
                    if let Some(arg) = self.args_mut().arg_mut(index) {
                        tracing::trace!(arg = %arg.display_name(), raw, "matched argument");
                        arg.set_raw(raw)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of pieces to skip after an absent key: its `: $` and an
    /// optional `,`. `None` if the pieces are not a keyed placeholder.
    fn omitted_entry(&self, rest: &[Piece]) -> Option<usize> {
        match rest {
            [Piece::Scaffold(':'), Piece::Arg(index), tail @ ..]
                if self.args().get(*index).is_some_and(|arg| arg.is_placeholder()) =>
            {
                Some(if matches!(tail.first(), Some(Piece::Scaffold(','))) {
                    3
                } else {
                    2
                })
            }
            _ => None,
        }
    }
}

fn is_closer(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests;
