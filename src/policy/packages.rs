//! Package and toolchain managers.
//!
//! The common shape is a read-only verb set per tool, with a few guarded
//! forms on top: `npm run` only for test scripts, `cargo publish` only with
//! `--dry-run`, `npx` only for a short roster of linters, `rustup run`
//! re-evaluated as a wrapper.

use crate::evaluator::{evaluate_at_depth, Verdict};
use crate::parse::join_tokens;
use crate::policy::{flags_allow, safe_subcommand};

const NPM_READ_ONLY: [&str; 14] = [
    "--version", "audit", "doctor", "explain", "fund", "info", "list", "ls",
    "outdated", "prefix", "root", "test", "view", "why",
];

const YARN_READ_ONLY: [&str; 5] = ["--version", "info", "list", "ls", "why"];

const PNPM_READ_ONLY: [&str; 6] = ["--version", "audit", "list", "ls", "outdated", "why"];

const NPX_SAFE: [&str; 3] = ["@herb-tools/linter", "eslint", "karma"];

const NPX_FLAGS_NO_ARG: [&str; 6] =
    ["--ignore-existing", "--no", "--quiet", "--yes", "-q", "-y"];

const DENO_SAFE: [&str; 6] = ["--version", "check", "doc", "info", "lint", "test"];

const BUN_SAFE: [&str; 3] = ["--version", "outdated", "test"];

const BUNX_FLAGS_NO_ARG: [&str; 4] = ["--bun", "--no-install", "--silent", "--verbose"];

const PIP_READ_ONLY: [&str; 9] = [
    "--version", "check", "debug", "freeze", "help", "index", "inspect", "list", "show",
];

const BUNDLE_READ_ONLY: [&str; 5] = ["--version", "check", "info", "list", "show"];

const BUNDLE_EXEC_SAFE: [&str; 6] =
    ["brakeman", "cucumber", "erb_lint", "herb", "rspec", "standardrb"];

const GEM_READ_ONLY: [&str; 14] = [
    "--version", "contents", "dependency", "environment", "help", "info",
    "list", "outdated", "pristine", "search", "sources", "specification",
    "stale", "which",
];

const BREW_READ_ONLY: [&str; 19] = [
    "--prefix", "--version", "casks", "cat", "config", "deps", "desc",
    "doctor", "formulae", "home", "info", "leaves", "list", "log",
    "outdated", "search", "shellenv", "tap", "uses",
];

const CARGO_SAFE: [&str; 17] = [
    "--version", "audit", "bench", "build", "check", "clippy", "deny",
    "doc", "license", "locate-project", "metadata", "pkgid",
    "read-manifest", "search", "test", "tree", "verify-project",
];

const RUSTUP_SAFE: [&str; 4] = ["--version", "doc", "show", "which"];

const GO_SAFE: [&str; 8] =
    ["--version", "build", "doc", "env", "list", "test", "version", "vet"];

pub fn npm(tokens: &[String]) -> Verdict {
    let Some(sub) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    if NPM_READ_ONLY.contains(&sub.as_str()) {
        return Verdict::Allow;
    }
    let ok = match sub.as_str() {
        "config" => tokens.get(2).is_some_and(|a| a == "list" || a == "get"),
        "run" | "run-script" => tokens
            .get(2)
            .is_some_and(|a| a == "test" || a.starts_with("test:")),
        _ => false,
    };
    Verdict::allow_if(ok)
}

pub fn yarn(tokens: &[String]) -> Verdict {
    let Some(sub) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    Verdict::allow_if(
        YARN_READ_ONLY.contains(&sub.as_str()) || sub == "test" || sub.starts_with("test:"),
    )
}

pub fn pnpm(tokens: &[String]) -> Verdict {
    Verdict::allow_if(
        tokens
            .get(1)
            .is_some_and(|sub| PNPM_READ_ONLY.contains(&sub.as_str())),
    )
}

/// `npx` downloads and runs arbitrary packages, so only a fixed roster of
/// known linters passes, plus `tsc --noEmit` as a type check.
pub fn npx(tokens: &[String]) -> Verdict {
    match runner_package_index(tokens, 1, &NPX_FLAGS_NO_ARG) {
        Some(idx) => safe_runner_package(tokens, idx),
        None => Verdict::NoDecision,
    }
}

/// `bunx` is npx with bun's flag set and the same package roster.
pub fn bunx(tokens: &[String]) -> Verdict {
    if tokens.len() == 2 && tokens[1] == "--version" {
        return Verdict::Allow;
    }
    match runner_package_index(tokens, 1, &BUNX_FLAGS_NO_ARG) {
        Some(idx) => safe_runner_package(tokens, idx),
        None => Verdict::NoDecision,
    }
}

pub fn bun(tokens: &[String]) -> Verdict {
    // `bun x <pkg>` is bunx under another name
    if tokens.get(1).is_some_and(|t| t == "x") {
        return match runner_package_index(tokens, 2, &BUNX_FLAGS_NO_ARG) {
            Some(idx) => safe_runner_package(tokens, idx),
            None => Verdict::NoDecision,
        };
    }
    Verdict::allow_if(safe_subcommand(
        tokens,
        &BUN_SAFE,
        &[("pm", &["bin", "cache", "hash", "ls"])],
    ))
}

pub fn deno(tokens: &[String]) -> Verdict {
    let Some(sub) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    if DENO_SAFE.contains(&sub.as_str()) {
        return Verdict::Allow;
    }
    Verdict::allow_if(sub == "fmt" && flags_allow(&tokens[2..], &["--check"], &[]))
}

fn safe_runner_package(tokens: &[String], idx: usize) -> Verdict {
    let pkg = &tokens[idx];
    if NPX_SAFE.contains(&pkg.as_str()) {
        return Verdict::Allow;
    }
    if pkg == "tsc" {
        return Verdict::allow_if(flags_allow(&tokens[idx + 1..], &["--noEmit"], &[]));
    }
    Verdict::NoDecision
}

fn runner_package_index(tokens: &[String], start: usize, flags_no_arg: &[&str]) -> Option<usize> {
    let mut i = start;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok == "--package" || tok == "-p" {
            i += 2;
            continue;
        }
        if flags_no_arg.contains(&tok.as_str()) {
            i += 1;
            continue;
        }
        if tok == "--" {
            return Some(i + 1).filter(|idx| *idx < tokens.len());
        }
        if tok.starts_with('-') {
            return None;
        }
        return Some(i);
    }
    None
}

pub fn pip(tokens: &[String]) -> Verdict {
    let Some(sub) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    if PIP_READ_ONLY.contains(&sub.as_str()) {
        return Verdict::Allow;
    }
    Verdict::allow_if(
        sub == "config" && tokens.get(2).is_some_and(|a| a == "list" || a == "get"),
    )
}

pub fn uv(tokens: &[String]) -> Verdict {
    Verdict::allow_if(safe_subcommand(
        tokens,
        &["--version"],
        &[
            ("pip", &["check", "freeze", "list", "show"]),
            ("python", &["list"]),
            ("tool", &["list"]),
        ],
    ))
}

pub fn poetry(tokens: &[String]) -> Verdict {
    Verdict::allow_if(safe_subcommand(
        tokens,
        &["--version", "check", "show"],
        &[("env", &["info", "list"])],
    ))
}

pub fn bundle(tokens: &[String]) -> Verdict {
    let Some(sub) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    if BUNDLE_READ_ONLY.contains(&sub.as_str()) {
        return Verdict::Allow;
    }
    Verdict::allow_if(
        sub == "exec"
            && tokens
                .get(2)
                .is_some_and(|t| BUNDLE_EXEC_SAFE.contains(&t.as_str())),
    )
}

pub fn gem(tokens: &[String]) -> Verdict {
    Verdict::allow_if(
        tokens
            .get(1)
            .is_some_and(|sub| GEM_READ_ONLY.contains(&sub.as_str())),
    )
}

pub fn brew(tokens: &[String]) -> Verdict {
    Verdict::allow_if(
        tokens
            .get(1)
            .is_some_and(|sub| BREW_READ_ONLY.contains(&sub.as_str())),
    )
}

pub fn mise(tokens: &[String]) -> Verdict {
    Verdict::allow_if(safe_subcommand(
        tokens,
        &["--version", "current", "doctor", "env", "list", "ls", "which"],
        &[("config", &["list", "ls"]), ("settings", &["get"])],
    ))
}

/// A `+toolchain` selector before the subcommand is skipped. A trailing
/// `--help` is read-only unless a `--` could forward it to a test binary.
pub fn cargo(tokens: &[String]) -> Verdict {
    let sub_idx = if tokens.get(1).is_some_and(|t| t.starts_with('+')) {
        2
    } else {
        1
    };
    let Some(sub) = tokens.get(sub_idx) else {
        return Verdict::NoDecision;
    };
    if tokens.last().is_some_and(|t| t == "--help") && !tokens.iter().any(|t| t == "--") {
        return Verdict::Allow;
    }
    if CARGO_SAFE.contains(&sub.as_str()) {
        return Verdict::Allow;
    }
    let rest = &tokens[sub_idx + 1..];
    let ok = match sub.as_str() {
        "fmt" => flags_allow(rest, &["--check"], &[]),
        "package" => flags_allow(rest, &["--list"], &[]),
        "publish" => flags_allow(rest, &["--dry-run"], &["--force", "--no-verify"]),
        _ => false,
    };
    Verdict::allow_if(ok)
}

/// `rustup run <toolchain> <command...>` re-enters the evaluator on the
/// wrapped command.
pub fn rustup(tokens: &[String], depth: usize) -> Verdict {
    if safe_subcommand(
        tokens,
        &RUSTUP_SAFE,
        &[
            ("component", &["list"]),
            ("target", &["list"]),
            ("toolchain", &["list"]),
        ],
    ) {
        return Verdict::Allow;
    }
    if tokens.len() >= 4 && tokens[1] == "run" {
        return evaluate_at_depth(&join_tokens(&tokens[3..]), depth + 1);
    }
    Verdict::NoDecision
}

pub fn go(tokens: &[String]) -> Verdict {
    Verdict::allow_if(
        tokens
            .get(1)
            .is_some_and(|sub| GO_SAFE.contains(&sub.as_str())),
    )
}
