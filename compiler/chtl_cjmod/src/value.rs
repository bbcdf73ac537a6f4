//! Argument values and the coercions applied before a transform runs.

use std::fmt;

use crate::token::{tokenize, TokenKind};

/// The value handed to a transform closure.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// Text with surrounding quotes removed.
    Str(String),
    Num(f64),
    Bool(bool),
    /// Source text exactly as matched.
    Raw(String),
}

/// Which [`ArgValue`] variant a transform expects.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Num,
    Bool,
    #[default]
    Raw,
    /// Pick a variant from the value's [`TypeHint`].
    Auto,
}

impl ArgValue {
    /// Coerce matched source text to the requested kind.
    ///
    /// Numeric and boolean coercion fall back to [`ArgValue::Str`] when the
    /// text does not parse.
    pub fn coerce(raw: &str, kind: ValueKind) -> Self {
        let text = raw.trim();
        match kind {
            ValueKind::Str => ArgValue::Str(unquote(text).to_owned()),
            ValueKind::Num => parse_number(text)
                .map_or_else(|| ArgValue::Str(unquote(text).to_owned()), ArgValue::Num),
            ValueKind::Bool => parse_bool(text)
                .map_or_else(|| ArgValue::Str(unquote(text).to_owned()), ArgValue::Bool),
            ValueKind::Raw => ArgValue::Raw(raw.to_owned()),
            ValueKind::Auto => match TypeHint::infer(text) {
                TypeHint::String => ArgValue::Str(unquote(text).to_owned()),
                TypeHint::Number => {
                    parse_number(text).map_or_else(|| ArgValue::Raw(raw.to_owned()), ArgValue::Num)
                }
                TypeHint::Boolean => ArgValue::Bool(text == "true"),
                _ => ArgValue::Raw(raw.to_owned()),
            },
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            ArgValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) | ArgValue::Raw(s) => f.write_str(s),
            ArgValue::Num(n) => write!(f, "{n}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Coarse shape of a matched argument.
///
/// Advisory only: inferred from the text on demand and used to choose a
/// coercion for [`ValueKind::Auto`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeHint {
    Empty,
    String,
    Number,
    Boolean,
    Object,
    Array,
    Function,
    Identifier,
    Expression,
}

impl TypeHint {
    pub fn infer(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return TypeHint::Empty;
        }
        if parse_bool(text).is_some() {
            return TypeHint::Boolean;
        }
        if parse_number(text).is_some() {
            return TypeHint::Number;
        }
        if is_function(text) {
            return TypeHint::Function;
        }
        if is_object(text) {
            return TypeHint::Object;
        }
        let tokens = tokenize(text);
        match tokens.as_slice() {
            [single] => match single.kind {
                TokenKind::Str => TypeHint::String,
                TokenKind::Group => TypeHint::Array,
                TokenKind::Ident => TypeHint::Identifier,
                TokenKind::Number | TokenKind::Punct => TypeHint::Expression,
            },
            _ => TypeHint::Expression,
        }
    }
}

/// Returns `true` if `text` is a single balanced `{ ... }` group.
pub fn is_object(text: &str) -> bool {
    let text = text.trim();
    let tokens = tokenize(text);
    matches!(tokens.as_slice(), [t] if t.kind == TokenKind::Group
        && text.starts_with('{')
        && t.end as usize == text.len()
        && text.ends_with('}'))
}

/// Returns `true` if `text` looks like a function: it mentions `function`
/// or an `=>` outside strings and nested groups.
pub fn is_function(text: &str) -> bool {
    let tokens = tokenize(text);
    tokens.iter().any(|t| {
        let word = t.text(text);
        (t.kind == TokenKind::Ident && word == "function")
            || (t.kind == TokenKind::Punct && word == "=>")
    })
}

/// Strip one pair of matching quotes.
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&open), Some(&close))
            if bytes.len() >= 2 && open == close && matches!(open, b'"' | b'\'' | b'`') =>
        {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let n: f64 = text.parse().ok()?;
    n.is_finite().then_some(n)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
