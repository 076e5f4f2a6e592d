//! Shell command parsing: segmentation, syntax guarding, tokenization.
//!
//! This module is the quote-aware front end of the gate. It deliberately
//! implements only the slice of shell syntax the gate needs to reason about:
//!
//! - [`split_segments`] breaks a command line into simple-command segments at
//!   unquoted control operators (`|`, `&&`, `&`, `;`, newline).
//! - [`has_unsafe_shell_syntax`] flags constructs that can never be approved
//!   (redirection, backticks, command substitution) outside quoted regions.
//! - [`tokenize`] turns one segment into argv-style words, failing explicitly
//!   on malformed quoting.
//! - [`strip_env_assignments`] drops leading `NAME=value` words so the real
//!   command name can be resolved.
//!
//! All three scanners share the same quote-state rules so a `>` inside
//! `"..."` is neither a segment boundary nor a rejection.

/// Split a command line into trimmed, non-empty simple-command segments.
///
/// Boundaries are unquoted `|`, `;`, newline, `&&`, and a solitary `&`.
/// A lone `&` (background operator) is treated like `&&`: both sides are
/// independent commands that each need approval.
#[must_use]
pub fn split_segments(command: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' && !in_single {
            escaped = true;
            current.push(c);
            continue;
        }
        if c == '\'' && !in_double {
            in_single = !in_single;
            current.push(c);
            continue;
        }
        if c == '"' && !in_single {
            in_double = !in_double;
            current.push(c);
            continue;
        }
        if !in_single && !in_double {
            match c {
                '|' | ';' | '\n' => {
                    segments.push(std::mem::take(&mut current));
                    continue;
                }
                '&' => {
                    segments.push(std::mem::take(&mut current));
                    if chars.peek() == Some(&'&') {
                        chars.next();
                    }
                    continue;
                }
                _ => {}
            }
        }
        current.push(c);
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Check a segment for shell constructs the gate can never approve:
/// unquoted `>`, `<`, backtick, or `$(`.
///
/// Redirection characters are literal inside either quote style, but
/// substitution (`` ` `` and `$(`) still expands inside double quotes, so
/// only single quotes shield it.
///
/// This runs before the policy pipeline and again as a hard veto inside the
/// settings fallback — an approved pattern cannot rescue a segment that
/// redirects output or substitutes commands.
#[must_use]
pub fn has_unsafe_shell_syntax(segment: &str) -> bool {
    // Quick reject: none of the trigger bytes can appear inside a multi-byte
    // UTF-8 sequence, so a byte scan is sound.
    let bytes = segment.as_bytes();
    if memchr::memchr3(b'>', b'<', b'`', bytes).is_none() && memchr::memchr(b'$', bytes).is_none()
    {
        return false;
    }

    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev = '\0';

    for c in segment.chars() {
        if escaped {
            escaped = false;
            prev = c;
            continue;
        }
        if c == '\\' && !in_single {
            escaped = true;
            prev = c;
            continue;
        }
        if c == '\'' && !in_double {
            in_single = !in_single;
            prev = c;
            continue;
        }
        if c == '"' && !in_single {
            in_double = !in_double;
            prev = c;
            continue;
        }
        if !in_single {
            if c == '`' {
                return true;
            }
            if c == '(' && prev == '$' {
                return true;
            }
            if !in_double && (c == '>' || c == '<') {
                return true;
            }
        }
        prev = c;
    }
    false
}

/// Tokenize one segment into shell words.
///
/// Returns `None` on malformed quoting (unterminated single or double quote);
/// callers must treat that as "no decision", never as a best-effort parse.
#[must_use]
pub fn tokenize(segment: &str) -> Option<Vec<String>> {
    shell_words::split(segment).ok()
}

/// Join tokens back into a single command string, quoting as needed.
///
/// Used by wrapper handlers to reconstruct the inner command before
/// re-entering the pipeline.
#[must_use]
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    shell_words::join(tokens)
}

/// Strip leading environment assignments (`NAME=value` words) from a segment.
///
/// Grammar: `NAME` starts with an ASCII uppercase letter or `_` and contains
/// only ASCII uppercase, digits, or `_`. The value runs to the first unquoted
/// space, so `FOO='bar baz' ls` strips down to `ls`. The assignments
/// themselves need no validation — they cannot execute anything on their own.
#[must_use]
pub fn strip_env_assignments(segment: &str) -> &str {
    let mut rest = segment;
    loop {
        let trimmed = rest.trim_start();
        let Some(first) = trimmed.as_bytes().first() else {
            return trimmed;
        };
        if !first.is_ascii_uppercase() && *first != b'_' {
            return trimmed;
        }
        let Some(eq_pos) = trimmed.find('=') else {
            return trimmed;
        };
        let key = &trimmed[..eq_pos];
        let valid_key = key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        if !valid_key {
            return trimmed;
        }
        match find_unquoted_space(&trimmed[eq_pos..]) {
            Some(space_pos) => rest = &trimmed[eq_pos + space_pos..],
            // Assignment with no command after it ("FOO=bar"): nothing runs.
            None => return trimmed,
        }
    }
}

fn find_unquoted_space(s: &str) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if !in_single => escaped = true,
            b'\'' if !in_double => in_single = !in_single,
            b'"' if !in_single => in_double = !in_double,
            b' ' if !in_single && !in_double => return Some(i),
            _ => {}
        }
    }
    None
}

/// Resolve the command name from the first token: the final path component,
/// so `/usr/bin/git` and `git` dispatch identically.
#[must_use]
pub fn command_name(token: &str) -> &str {
    token.rsplit('/').next().unwrap_or(token)
}

/// Check whether a flag is present anywhere after the command name.
///
/// `short` is a single-letter flag (matched inside combined clusters like
/// `-ni`); `long` matches both `--flag` and `--flag=value`. Scanning stops at
/// a literal `--` since everything after it is positional.
#[must_use]
pub fn has_flag(tokens: &[String], short: Option<&str>, long: Option<&str>) -> bool {
    let short_char = short.map(|s| s.trim_start_matches('-'));
    for token in &tokens[1..] {
        if token == "--" {
            return false;
        }
        if let Some(long_flag) = long {
            if token == long_flag || token.starts_with(&format!("{long_flag}=")) {
                return true;
            }
        }
        if let Some(c) = short_char {
            if token.starts_with('-') && !token.starts_with("--") && token[1..].contains(c) {
                return true;
            }
        }
    }
    false
}
