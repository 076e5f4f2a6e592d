//! Prefix wrappers: `timeout`, `time`, `env`, `nice`, `ionice`.
//!
//! Each one peels its own flags off the front and hands the wrapped command
//! back to the evaluator at `depth + 1`.

use crate::evaluator::{evaluate_at_depth, Verdict};
use crate::parse::join_tokens;

const TIMEOUT_FLAGS_WITH_ARG: [&str; 4] = ["--kill-after", "--signal", "-k", "-s"];

fn recurse(inner: &[String], depth: usize) -> Verdict {
    if inner.is_empty() {
        return Verdict::NoDecision;
    }
    evaluate_at_depth(&join_tokens(inner), depth + 1)
}

/// `timeout [flags] duration command [args...]`.
pub fn timeout(tokens: &[String], depth: usize) -> Verdict {
    let mut idx = 1;
    while idx < tokens.len() {
        let tok = &tokens[idx];
        if TIMEOUT_FLAGS_WITH_ARG.contains(&tok.as_str()) {
            idx += 2;
        } else if tok.starts_with('-') {
            idx += 1;
        } else {
            break;
        }
    }
    // the duration itself
    idx += 1;
    if idx > tokens.len() {
        return Verdict::NoDecision;
    }
    recurse(&tokens[idx..], depth)
}

/// `time [-p] command [args...]`.
pub fn time(tokens: &[String], depth: usize) -> Verdict {
    let mut idx = 1;
    while idx < tokens.len() && tokens[idx].starts_with('-') {
        idx += 1;
    }
    recurse(&tokens[idx..], depth)
}

/// `env [-i] [-u NAME] [NAME=VALUE...] command [args...]`. Bare `env`
/// prints the environment and is safe on its own.
pub fn env_wrapper(tokens: &[String], depth: usize) -> Verdict {
    let mut idx = 1;
    while idx < tokens.len() {
        let tok = &tokens[idx];
        if tok == "-u" || tok == "--unset" {
            idx += 2;
        } else if tok.starts_with('-') || tok.contains('=') {
            idx += 1;
        } else {
            break;
        }
    }
    if idx >= tokens.len() {
        return Verdict::Allow;
    }
    recurse(&tokens[idx..], depth)
}

/// `nice [-n N] command` and `ionice [-c N] [-n N] command`.
pub fn nice(tokens: &[String], depth: usize) -> Verdict {
    let mut idx = 1;
    while idx < tokens.len() {
        let tok = &tokens[idx];
        if tok == "-n" || tok == "-c" || tok == "--adjustment" {
            idx += 2;
        } else if tok.starts_with('-') {
            idx += 1;
        } else {
            break;
        }
    }
    if idx >= tokens.len() {
        return Verdict::NoDecision;
    }
    recurse(&tokens[idx..], depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn timeout_wraps_inner_verdict() {
        assert!(timeout(&toks(&["timeout", "30", "ls", "-la"]), 0).is_allow());
        assert!(timeout(&toks(&["timeout", "-s", "KILL", "5s", "git", "status"]), 0).is_allow());
        assert!(!timeout(&toks(&["timeout", "30", "rm", "-rf", "/"]), 0).is_allow());
        assert!(!timeout(&toks(&["timeout", "30"]), 0).is_allow());
    }

    #[test]
    fn time_wraps_inner_verdict() {
        assert!(time(&toks(&["time", "ls"]), 0).is_allow());
        assert!(time(&toks(&["time", "-p", "cargo", "check"]), 0).is_allow());
        assert!(!time(&toks(&["time", "rm", "file"]), 0).is_allow());
        assert!(!time(&toks(&["time"]), 0).is_allow());
    }

    #[test]
    fn env_bare_is_allowed() {
        assert!(env_wrapper(&toks(&["env"]), 0).is_allow());
    }

    #[test]
    fn env_with_assignments_wraps_inner() {
        assert!(env_wrapper(&toks(&["env", "RUST_LOG=debug", "cargo", "check"]), 0).is_allow());
        assert!(env_wrapper(&toks(&["env", "-i", "ls"]), 0).is_allow());
        assert!(env_wrapper(&toks(&["env", "-u", "PATH", "pwd"]), 0).is_allow());
        assert!(!env_wrapper(&toks(&["env", "X=1", "rm", "-rf", "/"]), 0).is_allow());
    }

    #[test]
    fn nice_wraps_inner_verdict() {
        assert!(nice(&toks(&["nice", "-n", "10", "ls"]), 0).is_allow());
        assert!(nice(&toks(&["ionice", "-c", "3", "grep", "foo"]), 0).is_allow());
        assert!(!nice(&toks(&["nice", "-n", "10", "rm", "x"]), 0).is_allow());
        assert!(!nice(&toks(&["nice"]), 0).is_allow());
    }

    #[test]
    fn wrappers_compose() {
        assert!(timeout(&toks(&["timeout", "5", "env", "A=1", "nice", "ls"]), 0).is_allow());
    }
}
