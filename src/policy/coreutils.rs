//! Text utilities that are mostly read-only but carry escape hatches:
//! `find -exec`, `sed`'s in-place and `e` modifier, `sort -o`, and awk
//! programs that shell out or redirect.

use crate::evaluator::{evaluate_at_depth, Verdict};
use crate::parse::{has_flag, join_tokens};

const FIND_DANGEROUS_FLAGS: [&str; 7] =
    ["-delete", "-fls", "-fprint", "-fprint0", "-fprintf", "-ok", "-okdir"];

/// `find` is read-only unless it deletes, writes listings to files, or runs
/// a command. `-exec`/`-execdir` bodies are re-evaluated with `{}` replaced
/// by a plain file name.
pub fn find(tokens: &[String], depth: usize) -> Verdict {
    let mut i = 1;
    while i < tokens.len() {
        let tok = &tokens[i];
        if FIND_DANGEROUS_FLAGS.contains(&tok.as_str()) {
            return Verdict::NoDecision;
        }
        if tok == "-exec" || tok == "-execdir" {
            let body_start = i + 1;
            let body_end = tokens[body_start..]
                .iter()
                .position(|t| t == ";" || t == "+")
                .map_or(tokens.len(), |p| body_start + p);
            if body_start >= body_end {
                return Verdict::NoDecision;
            }
            let body: Vec<String> = tokens[body_start..body_end]
                .iter()
                .map(|t| t.replace("{}", "file"))
                .collect();
            if !evaluate_at_depth(&join_tokens(&body), depth + 1).is_allow() {
                return Verdict::NoDecision;
            }
            i = body_end + 1;
            continue;
        }
        i += 1;
    }
    Verdict::Allow
}

/// True when a sed expression ends in the GNU `e` modifier, which executes
/// the pattern space as a shell command. Covers both `s///e` and the
/// standalone `e` command with an optional address.
fn expr_has_exec(expr: &str) -> bool {
    let bytes = expr.as_bytes();
    if bytes == b"e"
        || (bytes.last() == Some(&b'e')
            && bytes.len() >= 2
            && matches!(bytes[bytes.len() - 2], b'0'..=b'9' | b'/' | b'$'))
    {
        return true;
    }
    if bytes.len() < 4 || bytes[0] != b's' {
        return false;
    }
    let delim = bytes[1];
    let mut count = 0;
    let mut escaped = false;
    let mut flags_start = None;
    for (i, &b) in bytes[2..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        if b == b'\\' {
            escaped = true;
            continue;
        }
        if b == delim {
            count += 1;
            if count == 2 {
                flags_start = Some(i + 3);
                break;
            }
        }
    }
    flags_start.is_some_and(|start| start < bytes.len() && bytes[start..].contains(&b'e'))
}

/// Only the script positions are checked for the `e` modifier; bare
/// filenames that happen to end in `e` stay harmless.
fn sed_has_exec_modifier(tokens: &[String]) -> bool {
    let mut i = 1;
    let mut saw_script = false;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "-e" || token == "--expression" {
            if tokens.get(i + 1).is_some_and(|t| expr_has_exec(t)) {
                return true;
            }
            saw_script = true;
            i += 2;
            continue;
        }
        if token.starts_with('-') {
            i += 1;
            continue;
        }
        if !saw_script {
            if expr_has_exec(token) {
                return true;
            }
            saw_script = true;
        }
        i += 1;
    }
    false
}

pub fn sed(tokens: &[String]) -> Verdict {
    Verdict::allow_if(
        !has_flag(tokens, Some("-i"), Some("--in-place")) && !sed_has_exec_modifier(tokens),
    )
}

pub fn sort(tokens: &[String]) -> Verdict {
    Verdict::allow_if(
        !has_flag(tokens, Some("-o"), Some("--output"))
            && !has_flag(tokens, None, Some("--compress-program")),
    )
}

/// Program text with double-quoted string literals removed, so keywords
/// inside awk strings do not trip the check.
fn outside_double_quotes(program: &str) -> String {
    let mut out = String::with_capacity(program.len());
    let mut in_quotes = false;
    let mut escaped = false;
    for c in program.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            _ if !in_quotes => out.push(c),
            _ => {}
        }
    }
    out
}

fn awk_has_dangerous_construct(program: &str) -> bool {
    let code = outside_double_quotes(program);
    code.contains("system") || code.contains("getline") || code.contains('|') || code.contains('>')
}

pub fn awk(tokens: &[String]) -> Verdict {
    if has_flag(tokens, Some("-f"), None) {
        return Verdict::NoDecision;
    }
    for token in &tokens[1..] {
        if token.starts_with('-') {
            continue;
        }
        if awk_has_dangerous_construct(token) {
            return Verdict::NoDecision;
        }
    }
    Verdict::Allow
}
