//! Shell re-entry (`sh -c`, `bash -c`) and `xargs`.
//!
//! Both hand an embedded command back to the evaluator at `depth + 1`, so a
//! wrapper chain cannot recurse past the depth budget.

use crate::evaluator::{evaluate_at_depth, Verdict};
use crate::parse::join_tokens;

/// Flags that consume the following token.
const XARGS_FLAGS_WITH_ARG: [&str; 7] = ["-E", "-I", "-L", "-P", "-d", "-n", "-s"];

/// Flags that stand alone.
const XARGS_FLAGS_NO_ARG: [&str; 5] = ["-0", "-p", "-r", "-t", "-x"];

/// `sh`/`bash`: only the `-c <script>` form is inspectable. The script
/// string is evaluated as a full command line of its own. Running a script
/// file, or any invocation without `-c`, gets no decision.
pub fn shell(tokens: &[String], depth: usize) -> Verdict {
    let mut iter = tokens.iter().skip(1);
    for tok in iter.by_ref() {
        if tok == "-c" {
            break;
        }
        if !tok.starts_with('-') {
            // a script file path
            return Verdict::NoDecision;
        }
    }
    let Some(script) = iter.next() else {
        return Verdict::NoDecision;
    };
    // tokens after the script are positional parameters, inert on their own
    evaluate_at_depth(script, depth + 1)
}

/// `xargs [flags] command [args...]`: the constructed command is what runs,
/// so it is the thing to judge. Any `-I` placeholder in the args is replaced
/// with a dummy file name before re-evaluation.
pub fn xargs(tokens: &[String], depth: usize) -> Verdict {
    let mut placeholder: Option<String> = None;
    let mut idx = 1;
    while idx < tokens.len() {
        let tok = &tokens[idx];
        if let Some(flag) = XARGS_FLAGS_WITH_ARG.iter().find(|f| tok.starts_with(**f)) {
            if tok.len() == flag.len() {
                if *flag == "-I" {
                    placeholder = tokens.get(idx + 1).cloned();
                }
                idx += 2;
            } else {
                if *flag == "-I" {
                    placeholder = Some(tok[flag.len()..].to_string());
                }
                idx += 1;
            }
            continue;
        }
        if XARGS_FLAGS_NO_ARG.contains(&tok.as_str()) || tok.starts_with("--") {
            idx += 1;
            continue;
        }
        break;
    }
    if idx >= tokens.len() {
        return Verdict::NoDecision;
    }
    let inner: Vec<String> = tokens[idx..]
        .iter()
        .map(|tok| match &placeholder {
            Some(ph) if tok.contains(ph.as_str()) => tok.replace(ph.as_str(), "file"),
            _ => tok.clone(),
        })
        .collect();
    evaluate_at_depth(&join_tokens(&inner), depth + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn bash_c_safe_script_allowed() {
        assert!(shell(&toks(&["bash", "-c", "ls -la"]), 0).is_allow());
        assert!(shell(&toks(&["sh", "-c", "pwd"]), 0).is_allow());
    }

    #[test]
    fn bash_c_unsafe_script_no_decision() {
        assert!(!shell(&toks(&["bash", "-c", "rm -rf /"]), 0).is_allow());
        assert!(!shell(&toks(&["bash", "-c", "ls > out"]), 0).is_allow());
    }

    #[test]
    fn bash_c_chained_script_segments_each_judged() {
        assert!(shell(&toks(&["bash", "-c", "ls && pwd"]), 0).is_allow());
        assert!(!shell(&toks(&["bash", "-c", "ls && rm -rf /"]), 0).is_allow());
    }

    #[test]
    fn bash_script_file_no_decision() {
        assert!(!shell(&toks(&["bash", "deploy.sh"]), 0).is_allow());
        assert!(!shell(&toks(&["bash"]), 0).is_allow());
    }

    #[test]
    fn bash_leading_flags_before_c_ok() {
        assert!(shell(&toks(&["bash", "--noprofile", "-c", "pwd"]), 0).is_allow());
    }

    #[test]
    fn xargs_safe_inner_command() {
        assert!(xargs(&toks(&["xargs", "grep", "foo"]), 0).is_allow());
        assert!(xargs(&toks(&["xargs", "-0", "-n", "1", "cat"]), 0).is_allow());
    }

    #[test]
    fn xargs_unsafe_inner_command() {
        assert!(!xargs(&toks(&["xargs", "rm", "-f"]), 0).is_allow());
        assert!(!xargs(&toks(&["xargs", "-P", "4", "rm"]), 0).is_allow());
    }

    #[test]
    fn xargs_placeholder_replaced() {
        assert!(xargs(&toks(&["xargs", "-I", "{}", "cat", "{}"]), 0).is_allow());
        assert!(xargs(&toks(&["xargs", "-I{}", "wc", "-l", "{}"]), 0).is_allow());
        assert!(!xargs(&toks(&["xargs", "-I", "{}", "rm", "{}"]), 0).is_allow());
    }

    #[test]
    fn xargs_bare_no_decision() {
        assert!(!xargs(&toks(&["xargs"]), 0).is_allow());
        assert!(!xargs(&toks(&["xargs", "-0"]), 0).is_allow());
    }
}
