//! Pattern analysis: turning `printMylove({ url: $, mode: $ })` into args.

use chtl_scanner::is_identifier;

use crate::args::Arg;
use crate::{Args, BindOutcome, CjmodError, Transform};

/// Scaffolding characters most call patterns use.
pub const DEFAULT_IGNORE: &str = ",:{}();";

/// One step of a pattern, in source order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    /// Index into [`Syntax::args`].
    Arg(usize),
    /// An ignore character.
    Scaffold(char),
}

/// Pattern text between placeholders, kept for default rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(usize),
}

/// An analysed call pattern plus its bound transforms and matched values.
#[derive(Clone, Debug)]
pub struct Syntax {
    pattern: String,
    ignore: String,
    args: Args,
    pieces: Vec<Piece>,
    segments: Vec<Segment>,
    template: Option<String>,
}

/// Analyse `pattern`, splitting on whitespace and on every character in
/// `ignore_chars`.
///
/// A standalone `$` is a placeholder; every other token is a literal.
/// Args keep left-to-right order, which is also the order anonymous
/// `bind("$", ..)` calls fill placeholders in.
pub fn syntax_analys(pattern: &str, ignore_chars: &str) -> Syntax {
    let mut builder = PatternBuilder::default();
    let mut token = String::new();
    for c in pattern.chars() {
        if c.is_whitespace() {
            builder.token(&std::mem::take(&mut token));
            builder.pending.push(c);
        } else if ignore_chars.contains(c) {
            builder.token(&std::mem::take(&mut token));
            builder.scaffold(c);
        } else {
            token.push(c);
        }
    }
    builder.token(&token);
    builder.flush_text();

    let syntax = Syntax {
        pattern: pattern.to_owned(),
        ignore: ignore_chars.to_owned(),
        args: Args::from_args(builder.args),
        pieces: builder.pieces,
        segments: builder.segments,
        template: None,
    };
    tracing::trace!(
        pattern,
        args = syntax.args.len(),
        placeholders = syntax.args.placeholder_count(),
        "analysed pattern"
    );
    syntax
}

#[derive(Default)]
struct PatternBuilder {
    args: Vec<Arg>,
    pieces: Vec<Piece>,
    segments: Vec<Segment>,
    /// Verbatim pattern text since the last placeholder.
    pending: String,
    slots: usize,
}

impl PatternBuilder {
    fn token(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        let index = self.args.len();
        if token == "$" {
            let mut arg = Arg::placeholder(self.slots);
            // `key: $` labels the placeholder with `key`.
            if let [.., Piece::Arg(key), Piece::Scaffold(':')] = self.pieces.as_slice() {
                let key = &self.args[*key];
                if !key.is_placeholder() {
                    arg.set_label(key.name());
                }
            }
            self.flush_text();
            self.segments.push(Segment::Slot(self.slots));
            self.slots += 1;
            self.args.push(arg);
        } else {
            self.pending.push_str(token);
            self.args.push(Arg::literal(token));
        }
        self.pieces.push(Piece::Arg(index));
    }

    fn scaffold(&mut self, c: char) {
        if let Some(&Piece::Arg(index)) = self.pieces.last() {
            let arg = &mut self.args[index];
            if arg.is_placeholder() {
                arg.set_terminator(c);
            }
        }
        self.pending.push(c);
        self.pieces.push(Piece::Scaffold(c));
    }

    fn flush_text(&mut self) {
        if !self.pending.is_empty() {
            self.segments
                .push(Segment::Text(std::mem::take(&mut self.pending)));
        }
    }
}

impl Syntax {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn ignore_chars(&self) -> &str {
        &self.ignore
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Args {
        &mut self.args
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The call keyword: the first literal that is an identifier.
    pub fn keyword(&self) -> Option<&str> {
        self.args
            .iter()
            .find(|arg| !arg.is_placeholder() && is_identifier(arg.name()))
            .map(Arg::name)
    }

    pub fn bind(&mut self, name: &str, transform: Transform) -> BindOutcome {
        self.args.bind(name, transform)
    }

    pub fn bind_strict(&mut self, name: &str, transform: Transform) -> Result<(), CjmodError> {
        self.args.bind_strict(name, transform)
    }

    /// Register `template` as the output shape and render it with the
    /// current values.
    pub fn transform(&mut self, template: &str) -> String {
        self.set_template(template);
        self.args.transform(template)
    }

    /// Register `template` as the output shape without rendering.
    pub fn set_template(&mut self, template: &str) {
        self.template = Some(template.to_owned());
    }

    /// The registered output template, if any.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// The pattern with each placeholder replaced by its `{$N}` marker.
    pub fn default_template(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Slot(slot) => format!("{{${slot}}}"),
            })
            .collect()
    }

    /// Render the output: the registered template, or else the pattern
    /// itself with placeholder values filled in and scaffolding untouched.
    pub fn render(&self) -> String {
        if let Some(template) = &self.template {
            return self.args.transform(template);
        }
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    if let Some(arg) = self.args.placeholder(*slot) {
                        out.push_str(&arg.value());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
