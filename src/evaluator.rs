//! Decision aggregation for full command lines.
//!
//! A command line is approved only when every segment of it is approved.
//! There is no deny verdict anywhere in this crate: every failure mode —
//! unsafe syntax, malformed quoting, an unrecognized command, a recursion
//! budget blow-out — collapses into [`Verdict::NoDecision`], which the caller
//! treats as "ask the user". Bugs here can only cause extra prompting.
//!
//! Wrapper handlers (`bash -c`, `timeout`, `xargs`, ...) re-enter
//! [`evaluate_at_depth`] on their reconstructed inner command. Each step
//! recurses on a strictly shorter string, but the depth budget is still
//! enforced explicitly so adversarially nested wrappers cannot grow the
//! stack without bound.

use crate::parse::{has_unsafe_shell_syntax, split_segments, strip_env_assignments, tokenize};
use crate::policy;
use crate::settings::ApprovedPatterns;

/// Maximum wrapper nesting before the gate gives up and stays silent.
pub const MAX_WRAPPER_DEPTH: usize = 16;

/// The only two outcomes the gate can produce.
///
/// `NoDecision` is not a denial; it means the gate has nothing to say and the
/// normal interactive approval flow takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every part of the command is a known-safe, read-only operation.
    Allow,
    /// The gate stays silent; the caller must ask the user.
    NoDecision,
}

impl Verdict {
    /// `Allow` when the condition holds, `NoDecision` otherwise.
    #[inline]
    #[must_use]
    pub const fn allow_if(condition: bool) -> Self {
        if condition { Self::Allow } else { Self::NoDecision }
    }

    #[inline]
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluate a full command line against the built-in policy pipeline.
#[must_use]
pub fn evaluate_command(command: &str) -> Verdict {
    evaluate_at_depth(command, 0)
}

/// Evaluate a full command line, tracking wrapper recursion depth.
///
/// Entry point for wrapper handlers; callers outside the policy tree should
/// use [`evaluate_command`].
#[must_use]
pub(crate) fn evaluate_at_depth(command: &str, depth: usize) -> Verdict {
    if depth > MAX_WRAPPER_DEPTH {
        return Verdict::NoDecision;
    }
    Verdict::allow_if(
        split_segments(command)
            .iter()
            .all(|segment| evaluate_segment(segment, depth).is_allow()),
    )
}

/// Evaluate one segment through the built-in pipeline:
/// syntax guard, env-prefix strip, tokenizer, policy dispatch.
pub(crate) fn evaluate_segment(segment: &str, depth: usize) -> Verdict {
    if has_unsafe_shell_syntax(segment) {
        return Verdict::NoDecision;
    }
    let stripped = strip_env_assignments(segment);
    if stripped.is_empty() {
        return Verdict::Allow;
    }
    let Some(tokens) = tokenize(stripped) else {
        return Verdict::NoDecision;
    };
    if tokens.is_empty() {
        return Verdict::Allow;
    }
    policy::dispatch(&tokens, depth)
}

/// Evaluate a full command line, letting user-approved settings patterns
/// cover segments the built-in pipeline did not approve.
///
/// The syntax guard still vetoes pattern matches, and patterns are matched
/// strictly per segment — a wildcard never reaches across a `|`, `&&`, or
/// `;` boundary.
#[must_use]
pub fn evaluate_with_settings(command: &str, patterns: &ApprovedPatterns) -> Verdict {
    Verdict::allow_if(split_segments(command).iter().all(|segment| {
        evaluate_segment(segment, 0).is_allow()
            || (!has_unsafe_shell_syntax(segment) && patterns.matches(segment))
    }))
}
