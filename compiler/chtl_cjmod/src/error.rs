//! Errors raised by the extension engine.
//!
//! Everything here is local to one `(fragment, extension)` pair. A lookup
//! that simply runs off the end of the token stream is not an error; it
//! yields an empty string.

use thiserror::Error;

use crate::Policy;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CjmodError {
    /// `peek_keyword` was asked for offset 0.
    #[error("peek offset must be non-zero")]
    ZeroOffset,

    /// A policy region or keyword scan could not find its trigger.
    #[error("trigger `{trigger}` not found after byte {from}")]
    TriggerNotFound { trigger: String, from: u32 },

    /// A collect or skip region reached the end of the fragment.
    #[error("no closing `{trigger}` for {policy} region starting at byte {offset}")]
    Unterminated {
        trigger: String,
        policy: Policy,
        offset: u32,
    },

    /// `policy_change_end` named a resume policy that does not match the
    /// frame below the top of the stack.
    #[error("policy stack mismatch: resuming {found}, but the enclosing policy is {expected}")]
    PolicyStackMismatch { expected: Policy, found: Policy },

    /// `policy_change_end` with nothing pushed.
    #[error("policy_change_end called with no open policy region")]
    PolicyStackEmpty,

    /// Regions were still open when matching finished.
    #[error("{depth} policy region(s) left open after matching")]
    UnbalancedPolicyStack { depth: usize },

    #[error("keyword `{keyword}` not found in fragment")]
    KeywordNotFound { keyword: String },

    /// A bind or manual match named an argument the pattern does not have.
    #[error("pattern has no argument named `{name}`")]
    UnknownArg { name: String },

    /// A fallible transform rejected its value.
    #[error("transform for `{arg}` failed: {message}")]
    Transform { arg: String, message: String },

    /// `bind_strict` on an argument that already has a transform.
    #[error("argument `{name}` is already bound")]
    DuplicateBind { name: String },
}
