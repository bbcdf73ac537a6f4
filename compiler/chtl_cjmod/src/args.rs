//! Pattern arguments, their transforms, and template substitution.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{ArgValue, CjmodError, TypeHint, ValueKind};

type TransformFn = dyn Fn(ArgValue) -> Result<String, String> + Send + Sync;

/// A per-argument transform: the value kind it wants plus the closure.
///
/// Cloning is cheap; the closure is shared.
#[derive(Clone)]
pub struct Transform {
    kind: ValueKind,
    func: Arc<TransformFn>,
}

impl Transform {
    /// An infallible transform.
    pub fn new<F>(kind: ValueKind, func: F) -> Self
    where
        F: Fn(ArgValue) -> String + Send + Sync + 'static,
    {
        Self {
            kind,
            func: Arc::new(move |value| Ok(func(value))),
        }
    }

    /// A transform that can reject its input.
    ///
    /// The error message surfaces from matching as [`CjmodError::Transform`].
    pub fn fallible<F>(kind: ValueKind, func: F) -> Self
    where
        F: Fn(ArgValue) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            kind,
            func: Arc::new(func),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Coerce `raw` to this transform's kind and run the closure.
    pub fn apply(&self, raw: &str) -> Result<String, String> {
        (self.func)(ArgValue::coerce(raw, self.kind))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// What a lenient [`Args::bind`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// The argument had no transform before.
    Bound,
    /// An earlier transform was replaced.
    Rebound,
    /// Nothing matched: no unbound `$` left, or an unknown name.
    NoOp,
}

/// One element of a declared pattern.
#[derive(Clone, Debug)]
pub struct Arg {
    /// Literal text; empty for placeholders.
    name: String,
    /// Position among placeholders, `None` for literals.
    slot: Option<usize>,
    /// Key of a `key: $` placeholder.
    label: Option<String>,
    /// First scaffolding character after a placeholder.
    terminator: Option<char>,
    raw: Option<String>,
    transform: Option<Transform>,
    /// Transform output captured when the value was matched.
    rendered: Option<String>,
}

impl Arg {
    pub(crate) fn literal(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            slot: None,
            label: None,
            terminator: None,
            raw: None,
            transform: None,
            rendered: None,
        }
    }

    pub(crate) fn placeholder(slot: usize) -> Self {
        Self {
            slot: Some(slot),
            ..Self::literal("")
        }
    }

    pub(crate) fn set_label(&mut self, label: &str) {
        self.label = Some(label.to_owned());
    }

    pub(crate) fn set_terminator(&mut self, terminator: char) {
        self.terminator = Some(terminator);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_placeholder(&self) -> bool {
        self.slot.is_some()
    }

    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn terminator(&self) -> Option<char> {
        self.terminator
    }

    /// Matched source text, if any.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.transform.is_some()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Shape of the matched text, inferred on demand.
    pub fn type_hint(&self) -> TypeHint {
        TypeHint::infer(self.raw.as_deref().unwrap_or_default())
    }

    /// Name used in errors and logs: the label, `$N`, or the literal text.
    pub fn display_name(&self) -> String {
        match (&self.label, self.slot) {
            (Some(label), _) => label.clone(),
            (None, Some(slot)) => format!("${slot}"),
            (None, None) => self.name.clone(),
        }
    }

    /// The text this argument contributes to generated code.
    ///
    /// An unmatched placeholder contributes nothing. A literal's raw value
    /// is its own text. A transform that fails here yields an empty string;
    /// matching is where such failures are reported.
    pub fn value(&self) -> String {
        if let Some(rendered) = &self.rendered {
            return rendered.clone();
        }
        let raw = match (&self.raw, self.slot) {
            (Some(raw), _) => raw.as_str(),
            (None, Some(_)) => return String::new(),
            (None, None) => self.name.as_str(),
        };
        match &self.transform {
            Some(transform) => transform.apply(raw).unwrap_or_else(|message| {
                tracing::debug!(
                    arg = %self.display_name(),
                    %message,
                    "transform failed during render"
                );
                String::new()
            }),
            None => raw.to_owned(),
        }
    }

    /// Record matched text and render it through the bound transform.
    pub(crate) fn set_raw(&mut self, raw: &str) -> Result<(), CjmodError> {
        self.raw = Some(raw.to_owned());
        self.rendered = None;
        if let Some(transform) = &self.transform {
            match transform.apply(raw) {
                Ok(rendered) => self.rendered = Some(rendered),
                Err(message) => {
                    return Err(CjmodError::Transform {
                        arg: self.display_name(),
                        message,
                    })
                }
            }
        }
        Ok(())
    }

    fn clear_match(&mut self) {
        self.raw = None;
        self.rendered = None;
    }

    fn set_transform(&mut self, transform: Transform) -> BindOutcome {
        self.rendered = None;
        match self.transform.replace(transform) {
            Some(_) => BindOutcome::Rebound,
            None => BindOutcome::Bound,
        }
    }
}

/// Selects an argument for [`Args::match_value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgRef<'a> {
    /// Placeholder slot (`$N`).
    Slot(usize),
    /// Label, `$N`, or literal name.
    Name(&'a str),
}

impl From<usize> for ArgRef<'_> {
    fn from(slot: usize) -> Self {
        ArgRef::Slot(slot)
    }
}

impl<'a> From<&'a str> for ArgRef<'a> {
    fn from(name: &'a str) -> Self {
        ArgRef::Name(name)
    }
}

/// The ordered arguments of a pattern.
#[derive(Clone, Debug, Default)]
pub struct Args {
    args: Vec<Arg>,
    /// Labels first, then literal names; first occurrence wins.
    names: FxHashMap<String, usize>,
    /// Index into `args` of each placeholder slot.
    slots: Vec<usize>,
}

impl Args {
    pub(crate) fn from_args(args: Vec<Arg>) -> Self {
        let mut names = FxHashMap::default();
        let mut slots = Vec::new();
        for (index, arg) in args.iter().enumerate() {
            if arg.is_placeholder() {
                slots.push(index);
            }
            if let Some(label) = arg.label() {
                names.entry(label.to_owned()).or_insert(index);
            }
        }
        for (index, arg) in args.iter().enumerate() {
            if !arg.is_placeholder() {
                names.entry(arg.name.clone()).or_insert(index);
            }
        }
        Self { args, names, slots }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    /// The placeholder in slot `slot`.
    pub fn placeholder(&self, slot: usize) -> Option<&Arg> {
        self.slots.get(slot).map(|&index| &self.args[index])
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Arg> {
        self.slots.iter().map(|&index| &self.args[index])
    }

    pub fn placeholder_count(&self) -> usize {
        self.slots.len()
    }

    /// Index into `args` for a label, `$N` marker, or literal name.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        if let Some(slot) = name.strip_prefix('$').and_then(|n| n.parse::<usize>().ok()) {
            return self.slots.get(slot).copied();
        }
        self.names.get(name).copied()
    }

    pub(crate) fn arg_mut(&mut self, index: usize) -> Option<&mut Arg> {
        self.args.get_mut(index)
    }

    /// Bind `transform` to an argument.
    ///
    /// `"$"` targets the first placeholder without a transform; once every
    /// placeholder is bound, further `"$"` binds do nothing. Any other name
    /// is resolved as in [`Args::resolve`] and overwrites an existing
    /// binding.
    pub fn bind(&mut self, name: &str, transform: Transform) -> BindOutcome {
        let target = if name == "$" {
            self.slots
                .iter()
                .copied()
                .find(|&index| !self.args[index].is_bound())
        } else {
            self.resolve(name)
        };
        let Some(index) = target else {
            tracing::debug!(name, "bind matched no argument");
            return BindOutcome::NoOp;
        };
        let outcome = self.args[index].set_transform(transform);
        tracing::trace!(name, index, ?outcome, "bound transform");
        outcome
    }

    /// Like [`Args::bind`], but rebinding, exhausted `"$"` binds, and
    /// unknown names are errors.
    pub fn bind_strict(&mut self, name: &str, transform: Transform) -> Result<(), CjmodError> {
        let index = if name == "$" {
            self.slots
                .iter()
                .copied()
                .find(|&index| !self.args[index].is_bound())
                .ok_or_else(|| CjmodError::DuplicateBind {
                    name: name.to_owned(),
                })?
        } else {
            self.resolve(name).ok_or_else(|| CjmodError::UnknownArg {
                name: name.to_owned(),
            })?
        };
        if self.args[index].is_bound() {
            return Err(CjmodError::DuplicateBind {
                name: name.to_owned(),
            });
        }
        self.args[index].set_transform(transform);
        Ok(())
    }

    /// Assign raw text to an argument without a fragment.
    ///
    /// The bound transform runs immediately, so a fallible transform's
    /// error is returned here.
    pub fn match_value<'a>(
        &mut self,
        target: impl Into<ArgRef<'a>>,
        raw: &str,
    ) -> Result<(), CjmodError> {
        let index = match target.into() {
            ArgRef::Slot(slot) => self.slots.get(slot).copied().ok_or_else(|| {
                CjmodError::UnknownArg {
                    name: format!("${slot}"),
                }
            })?,
            ArgRef::Name(name) => self.resolve(name).ok_or_else(|| CjmodError::UnknownArg {
                name: name.to_owned(),
            })?,
        };
        self.args[index].set_raw(raw)
    }

    /// Forget all matched values; transforms stay bound.
    pub fn clear_matches(&mut self) {
        for arg in &mut self.args {
            arg.clear_match();
        }
    }

    /// Substitute argument values into `template`.
    ///
    /// Markers are `{label}`, `{$N}` and `{name}` for literals. A `{` that
    /// does not start a known marker is copied through. Substituted text
    /// is never rescanned.
    pub fn transform(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let marker = after
                .find('}')
                .map(|close| &after[..close])
                .filter(|key| !key.contains('{'))
                .and_then(|key| self.resolve(key).map(|index| (key, index)));
            match marker {
                Some((key, index)) => {
                    out.push_str(&self.args[index].value());
                    rest = &after[key.len() + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Values of all placeholders joined with `", "`.
    pub fn result(&self) -> String {
        self.placeholders()
            .map(Arg::value)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests;
