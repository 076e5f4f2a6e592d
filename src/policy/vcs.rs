//! Version control: `git` and `jj`.
//!
//! Read-only subcommands pass; anything that moves refs, rewrites history,
//! or touches remote configuration gets no decision. `--upload-pack` and
//! `--receive-pack` let a fetch run an arbitrary binary, so their presence
//! poisons an otherwise read-only subcommand.

use crate::evaluator::Verdict;

const GIT_READ_ONLY: [&str; 26] = [
    "--version", "blame", "cat-file", "check-ignore", "count-objects", "describe",
    "diff", "diff-tree", "fetch", "for-each-ref", "grep", "help",
    "log", "ls-files", "ls-remote", "ls-tree", "merge-base", "merge-tree",
    "name-rev", "reflog", "rev-parse", "shortlog", "show", "status",
    "verify-commit", "verify-tag",
];

const GIT_REMOTE_MUTATING: [&str; 6] =
    ["add", "prune", "remove", "rename", "set-branches", "set-url"];

const GIT_BRANCH_MUTATING: [&str; 13] = [
    "--copy", "--delete", "--edit-description", "--move",
    "--set-upstream-to", "--unset-upstream",
    "-C", "-D", "-M", "-c", "-d", "-m", "-u",
];

const GIT_TAG_MUTATING: [&str; 8] =
    ["--annotate", "--delete", "--force", "--sign", "-a", "-d", "-f", "-s"];

const GIT_CONFIG_SAFE: [&str; 5] =
    ["--get", "--get-all", "--get-regexp", "--list", "-l"];

const JJ_GLOBAL_STANDALONE: [&str; 6] = [
    "--debug", "--ignore-immutable", "--ignore-working-copy",
    "--no-pager", "--quiet", "--verbose",
];

const JJ_GLOBAL_VALUED: [&str; 5] =
    ["--at-op", "--at-operation", "--color", "--repository", "-R"];

const JJ_READ_ONLY: [&str; 7] =
    ["--version", "diff", "help", "log", "show", "st", "status"];

const JJ_MULTI: [(&str, &[&str]); 5] = [
    ("bookmark", &["list"]),
    ("config", &["get", "list"]),
    ("file", &["show"]),
    ("git", &["fetch"]),
    ("op", &["log"]),
];

pub fn git(tokens: &[String]) -> Verdict {
    let mut args = &tokens[1..];
    while args.len() >= 2 && args[0] == "-C" {
        args = &args[2..];
    }
    let Some(subcmd) = args.first() else {
        return Verdict::NoDecision;
    };
    if GIT_READ_ONLY.contains(&subcmd.as_str()) {
        let has_pack_override = args[1..]
            .iter()
            .any(|a| a.starts_with("--upload-p") || a.starts_with("--receive-p"));
        return Verdict::allow_if(!has_pack_override);
    }
    let rest = &args[1..];
    let ok = match subcmd.as_str() {
        "remote" => rest
            .first()
            .is_none_or(|a| !GIT_REMOTE_MUTATING.contains(&a.as_str())),
        "branch" => rest.iter().all(|a| {
            !GIT_BRANCH_MUTATING.contains(&a.as_str())
                && !GIT_BRANCH_MUTATING
                    .iter()
                    .any(|f| f.starts_with("--") && a.starts_with(&format!("{f}=")))
        }),
        "stash" => rest
            .first()
            .is_some_and(|a| a == "list" || a == "show"),
        "tag" => rest.iter().all(|a| !GIT_TAG_MUTATING.contains(&a.as_str())),
        "config" => rest
            .first()
            .is_some_and(|a| GIT_CONFIG_SAFE.contains(&a.as_str())),
        "worktree" => rest.first().is_some_and(|a| a == "list"),
        "notes" => rest.first().is_some_and(|a| a == "list" || a == "show"),
        _ => false,
    };
    Verdict::allow_if(ok)
}

pub fn jj(tokens: &[String]) -> Verdict {
    let mut args = &tokens[1..];
    loop {
        let Some(first) = args.first() else {
            return Verdict::NoDecision;
        };
        if JJ_GLOBAL_STANDALONE.contains(&first.as_str()) {
            args = &args[1..];
        } else if JJ_GLOBAL_VALUED.contains(&first.as_str()) {
            if args.len() < 2 {
                return Verdict::NoDecision;
            }
            args = &args[2..];
        } else if let Some((flag, value)) = first.split_once('=') {
            if JJ_GLOBAL_VALUED.contains(&flag) && !value.is_empty() {
                args = &args[1..];
            } else {
                break;
            }
        } else {
            break;
        }
    }
    let Some(subcmd) = args.first() else {
        return Verdict::NoDecision;
    };
    if JJ_READ_ONLY.contains(&subcmd.as_str()) {
        return Verdict::Allow;
    }
    for (prefix, actions) in JJ_MULTI {
        if subcmd == prefix && args.get(1).is_some_and(|a| actions.contains(&a.as_str())) {
            return Verdict::Allow;
        }
    }
    // the one three-word form: jj git remote list
    if subcmd == "git" && args.get(1).is_some_and(|t| t == "remote") {
        return Verdict::allow_if(args.get(2).is_some_and(|a| a == "list"));
    }
    Verdict::NoDecision
}
