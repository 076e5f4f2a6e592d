//! Policy dispatch table: resolved command name → verdict.
//!
//! Two tiers:
//!
//! 1. [`SAFE_COMMANDS`] — read-only utilities that are safe with any
//!    arguments (the syntax guard has already rejected redirection and
//!    substitution by the time dispatch runs).
//! 2. [`ToolPolicy`] — tool families that need argument inspection. The
//!    dispatch is a closed enum with an exhaustive match, so adding a family
//!    without wiring its handler is a compile error rather than a silent
//!    fall-through to "always safe".
//!
//! Anything not covered by either tier gets no decision.

pub mod coreutils;
pub mod forges;
pub mod interpreters;
pub mod packages;
pub mod shell;
pub mod vcs;
pub mod wrappers;

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::evaluator::Verdict;
use crate::parse::command_name;

/// Read-only utilities that are safe regardless of arguments.
pub static SAFE_COMMANDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        // search / filter
        "grep", "rg", "fd", "bat", "eza", "exa",
        // file contents and counting
        "head", "tail", "cat", "ls", "wc", "uniq", "tr", "cut",
        // comparison
        "diff", "delta", "colordiff", "comm", "paste",
        // text shaping
        "tac", "rev", "nl", "expand", "unexpand", "fold", "fmt", "column", "iconv",
        // pure output / arithmetic
        "echo", "printf", "seq", "expr", "test", "true", "false", "bc", "factor",
        // path and filesystem metadata
        "dirname", "basename", "realpath", "readlink", "file", "stat", "du", "df",
        // environment inspection
        "printenv", "which", "whoami", "date", "pwd", "tree", "cd", "command",
        "hostname", "uname", "arch", "nproc", "uptime", "id", "groups", "tty",
        "locale", "cal", "sleep", "who", "w",
        // process inspection
        "ps", "top", "htop", "procs", "lsof", "pgrep",
        // structured data and encodings
        "jq", "base64", "xxd", "getconf", "uuidgen",
        // checksums and binary inspection
        "md5sum", "md5", "sha256sum", "shasum", "sha1sum", "sha512sum", "cksum",
        "b2sum", "strings", "hexdump", "od", "nm", "size",
        // dns lookups
        "dig", "nslookup", "host", "whois",
        // dev utilities
        "shellcheck", "cloc", "tokei", "scg",
    ])
});

/// Tool families that need their arguments inspected before approval.
///
/// Keep [`ToolPolicy::resolve`] and [`ToolPolicy::evaluate`] in sync; the
/// exhaustive match in `evaluate` is the point of using an enum here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPolicy {
    // wrappers that run other commands
    Shell,
    Xargs,
    Timeout,
    Time,
    EnvWrapper,
    Nice,
    // version control
    Git,
    Jj,
    Gh,
    Glab,
    // package and toolchain managers
    Npm,
    Yarn,
    Pnpm,
    Npx,
    Deno,
    Bun,
    Bunx,
    Pip,
    Uv,
    Poetry,
    Bundle,
    Gem,
    Brew,
    Mise,
    Cargo,
    Rustup,
    Go,
    // guarded coreutils
    Find,
    Sed,
    Sort,
    Awk,
    // interpreters
    Python,
}

impl ToolPolicy {
    /// Map a resolved command name to its policy family, if any.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        Some(match name {
            "sh" | "bash" => Self::Shell,
            "xargs" => Self::Xargs,
            "timeout" => Self::Timeout,
            "time" => Self::Time,
            "env" => Self::EnvWrapper,
            "nice" | "ionice" => Self::Nice,
            "git" => Self::Git,
            "jj" => Self::Jj,
            "gh" => Self::Gh,
            "glab" => Self::Glab,
            "npm" => Self::Npm,
            "yarn" => Self::Yarn,
            "pnpm" => Self::Pnpm,
            "npx" => Self::Npx,
            "deno" => Self::Deno,
            "bun" => Self::Bun,
            "bunx" => Self::Bunx,
            "pip" | "pip3" => Self::Pip,
            "uv" => Self::Uv,
            "poetry" => Self::Poetry,
            "bundle" => Self::Bundle,
            "gem" => Self::Gem,
            "brew" => Self::Brew,
            "mise" => Self::Mise,
            "cargo" => Self::Cargo,
            "rustup" => Self::Rustup,
            "go" => Self::Go,
            "find" => Self::Find,
            "sed" => Self::Sed,
            "sort" => Self::Sort,
            "awk" | "gawk" | "mawk" | "nawk" => Self::Awk,
            "python" | "python3" => Self::Python,
            _ => return None,
        })
    }

    /// Run the family's handler over the full token list.
    #[must_use]
    pub fn evaluate(self, tokens: &[String], depth: usize) -> Verdict {
        match self {
            Self::Shell => shell::shell(tokens, depth),
            Self::Xargs => shell::xargs(tokens, depth),
            Self::Timeout => wrappers::timeout(tokens, depth),
            Self::Time => wrappers::time(tokens, depth),
            Self::EnvWrapper => wrappers::env_wrapper(tokens, depth),
            Self::Nice => wrappers::nice(tokens, depth),
            Self::Git => vcs::git(tokens),
            Self::Jj => vcs::jj(tokens),
            Self::Gh => forges::gh(tokens),
            Self::Glab => forges::glab(tokens),
            Self::Npm => packages::npm(tokens),
            Self::Yarn => packages::yarn(tokens),
            Self::Pnpm => packages::pnpm(tokens),
            Self::Npx => packages::npx(tokens),
            Self::Deno => packages::deno(tokens),
            Self::Bun => packages::bun(tokens),
            Self::Bunx => packages::bunx(tokens),
            Self::Pip => packages::pip(tokens),
            Self::Uv => packages::uv(tokens),
            Self::Poetry => packages::poetry(tokens),
            Self::Bundle => packages::bundle(tokens),
            Self::Gem => packages::gem(tokens),
            Self::Brew => packages::brew(tokens),
            Self::Mise => packages::mise(tokens),
            Self::Cargo => packages::cargo(tokens),
            Self::Rustup => packages::rustup(tokens, depth),
            Self::Go => packages::go(tokens),
            Self::Find => coreutils::find(tokens, depth),
            Self::Sed => coreutils::sed(tokens),
            Self::Sort => coreutils::sort(tokens),
            Self::Awk => coreutils::awk(tokens),
            Self::Python => interpreters::python(tokens),
        }
    }
}

/// Dispatch a non-empty token list to the policy tables.
#[must_use]
pub fn dispatch(tokens: &[String], depth: usize) -> Verdict {
    // A bare version/help query is read-only no matter what the binary is.
    if tokens.len() == 2 && (tokens[1] == "--version" || tokens[1] == "--help") {
        return Verdict::Allow;
    }
    let name = command_name(&tokens[0]);
    match ToolPolicy::resolve(name) {
        Some(policy) => policy.evaluate(tokens, depth),
        None => Verdict::allow_if(SAFE_COMMANDS.contains(name)),
    }
}

/// True when the second-level subcommand is in `simple`, or when a
/// `(prefix, actions)` pair in `multi` matches tokens 1 and 2.
pub(crate) fn safe_subcommand(
    tokens: &[String],
    simple: &[&str],
    multi: &[(&str, &[&str])],
) -> bool {
    let Some(sub) = tokens.get(1) else {
        return false;
    };
    if simple.contains(&sub.as_str()) {
        return true;
    }
    multi.iter().any(|(prefix, actions)| {
        sub == prefix
            && tokens
                .get(2)
                .is_some_and(|a| actions.contains(&a.as_str()))
    })
}

/// True when every `required` flag is present and no `forbidden` flag is.
pub(crate) fn flags_allow(args: &[String], required: &[&str], forbidden: &[&str]) -> bool {
    required
        .iter()
        .all(|flag| args.iter().any(|a| a == flag))
        && !args.iter().any(|a| forbidden.contains(&a.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_commands_never_shadow_handlers() {
        for name in SAFE_COMMANDS.iter().copied() {
            assert!(
                ToolPolicy::resolve(name).is_none(),
                "{name} is in SAFE_COMMANDS but also has a handler; the handler would be dead"
            );
        }
    }

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn bare_version_query_allowed_for_anything() {
        assert!(dispatch(&toks(&["rm", "--version"]), 0).is_allow());
        assert!(dispatch(&toks(&["chmod", "--version"]), 0).is_allow());
        assert!(dispatch(&toks(&["cargo", "--help"]), 0).is_allow());
    }

    #[test]
    fn version_with_payload_not_allowed() {
        assert!(!dispatch(&toks(&["rm", "-rf", "/", "--version"]), 0).is_allow());
        assert!(!dispatch(&toks(&["npx", "evil-package", "--version"]), 0).is_allow());
    }

    #[test]
    fn unknown_command_no_decision() {
        assert!(!dispatch(&toks(&["frobnicate", "--all"]), 0).is_allow());
    }

    #[test]
    fn non_posix_shells_not_wrappers() {
        // zsh word-splitting and globbing diverge from the POSIX rules the
        // tokenizer assumes, so its -c scripts are not inspectable.
        assert!(!dispatch(&toks(&["zsh", "-c", "ls"]), 0).is_allow());
        assert!(!dispatch(&toks(&["fish", "-c", "ls"]), 0).is_allow());
        assert!(dispatch(&toks(&["zsh", "--version"]), 0).is_allow());
        assert!(dispatch(&toks(&["bash", "-c", "ls"]), 0).is_allow());
    }

    #[test]
    fn path_prefix_resolves_to_same_policy() {
        assert!(dispatch(&toks(&["/usr/bin/ls", "-la"]), 0).is_allow());
        assert!(dispatch(&toks(&["/usr/bin/git", "log"]), 0).is_allow());
        assert!(!dispatch(&toks(&["/usr/bin/git", "push"]), 0).is_allow());
    }

    #[test]
    fn flags_allow_helper() {
        assert!(flags_allow(&toks(&["--check"]), &["--check"], &[]));
        assert!(!flags_allow(&toks(&[]), &["--check"], &[]));
        assert!(!flags_allow(
            &toks(&["--dry-run", "--force"]),
            &["--dry-run"],
            &["--force"]
        ));
    }
}
