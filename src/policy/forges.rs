//! Code-hosting CLIs (`gh`, `glab`).
//!
//! Noun subcommands (pr, issue, repo, ...) pass only with a read-only verb.
//! The `api` subcommand defaults to GET and is allowed unless a mutating
//! method or a request-body flag appears; both CLIs share that grammar.

use crate::evaluator::Verdict;

const READ_ONLY_NOUNS: [&str; 14] = [
    "attestation", "cache", "codespace", "extension", "gpg-key",
    "issue", "label", "pr", "release", "repo", "run",
    "ssh-key", "variable", "workflow",
];

const READ_ONLY_VERBS: [&str; 7] =
    ["checks", "diff", "list", "status", "verify", "view", "watch"];

const ALWAYS_SAFE: [&str; 3] = ["--version", "search", "status"];

const API_BODY_FLAGS: [&str; 5] = ["-f", "-F", "--field", "--raw-field", "--input"];

const GLAB_READ_ONLY_NOUNS: [&str; 17] = [
    "ci", "cluster", "deploy-key", "gpg-key", "incident", "issue",
    "iteration", "label", "milestone", "mr", "release", "repo",
    "schedule", "snippet", "ssh-key", "stack", "variable",
];

const GLAB_READ_ONLY_VERBS: [&str; 5] = ["diff", "issues", "list", "status", "view"];

const GLAB_ALWAYS_SAFE: [&str; 4] = ["--version", "-v", "check-update", "version"];

pub fn gh(tokens: &[String]) -> Verdict {
    let Some(subcmd) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    if READ_ONLY_NOUNS.contains(&subcmd.as_str()) {
        return Verdict::allow_if(
            tokens
                .get(2)
                .is_some_and(|verb| READ_ONLY_VERBS.contains(&verb.as_str())),
        );
    }
    if ALWAYS_SAFE.contains(&subcmd.as_str()) {
        return Verdict::Allow;
    }
    match subcmd.as_str() {
        "auth" => Verdict::allow_if(
            tokens
                .get(2)
                .is_some_and(|a| a == "status" || a == "token"),
        ),
        "browse" => Verdict::allow_if(tokens[2..].iter().any(|a| a == "--no-browser")),
        "api" => api(tokens),
        _ => Verdict::NoDecision,
    }
}

pub fn glab(tokens: &[String]) -> Verdict {
    let Some(subcmd) = tokens.get(1) else {
        return Verdict::NoDecision;
    };
    if GLAB_READ_ONLY_NOUNS.contains(&subcmd.as_str()) {
        return Verdict::allow_if(
            tokens
                .get(2)
                .is_some_and(|verb| GLAB_READ_ONLY_VERBS.contains(&verb.as_str())),
        );
    }
    if GLAB_ALWAYS_SAFE.contains(&subcmd.as_str()) {
        return Verdict::Allow;
    }
    match subcmd.as_str() {
        "auth" => Verdict::allow_if(tokens.get(2).is_some_and(|a| a == "status")),
        "api" => api(tokens),
        _ => Verdict::NoDecision,
    }
}

fn api(tokens: &[String]) -> Verdict {
    for (i, token) in tokens[2..].iter().enumerate() {
        if token == "-X" || token == "--method" {
            return Verdict::allow_if(
                tokens
                    .get(i + 3)
                    .is_some_and(|m| m.eq_ignore_ascii_case("GET")),
            );
        }
        if token.starts_with("-X") && token.len() > 2 && !token.starts_with("-X=") {
            return Verdict::allow_if(token[2..].eq_ignore_ascii_case("GET"));
        }
        if let Some(val) = token
            .strip_prefix("-X=")
            .or_else(|| token.strip_prefix("--method="))
        {
            return Verdict::allow_if(val.eq_ignore_ascii_case("GET"));
        }
        for flag in API_BODY_FLAGS {
            let attached_short = flag.len() == 2 && token.len() > 2 && token.starts_with(flag);
            let attached_long = flag.starts_with("--") && token.starts_with(&format!("{flag}="));
            if token == flag || attached_short || attached_long {
                return Verdict::NoDecision;
            }
        }
    }
    Verdict::Allow
}

#[cfg(test)]
mod tests {
    use crate::evaluator::evaluate_command;

    fn allowed(cmd: &str) -> bool {
        evaluate_command(cmd).is_allow()
    }

    #[test]
    fn noun_verb_pairs() {
        assert!(allowed("gh pr view 123"));
        assert!(allowed("gh pr list"));
        assert!(allowed("gh pr diff 123"));
        assert!(allowed("gh pr checks 123"));
        assert!(allowed("gh issue view 456"));
        assert!(allowed("gh run view 789"));
        assert!(allowed("gh run watch 123 --repo owner/repo"));
        assert!(allowed("gh release list"));
        assert!(allowed("gh attestation verify artifact.tar.gz"));
        assert!(allowed("gh gpg-key list"));
        assert!(allowed("gh workflow list"));
    }

    #[test]
    fn noun_without_read_verb_blocked() {
        assert!(!allowed("gh pr create --title test"));
        assert!(!allowed("gh pr merge 123"));
        assert!(!allowed("gh repo delete o/r"));
        assert!(!allowed("gh pr"));
        assert!(!allowed("gh"));
    }

    #[test]
    fn always_safe_subcommands() {
        assert!(allowed("gh status"));
        assert!(allowed("gh search issues foo"));
        assert!(allowed("gh --version"));
    }

    #[test]
    fn auth_inspection_only() {
        assert!(allowed("gh auth status"));
        assert!(allowed("gh auth token"));
        assert!(!allowed("gh auth login"));
        assert!(!allowed("gh auth"));
    }

    #[test]
    fn browse_requires_no_browser() {
        assert!(allowed("gh browse --no-browser"));
        assert!(allowed("gh browse src/main.rs --no-browser"));
        assert!(!allowed("gh browse"));
    }

    #[test]
    fn api_get_only() {
        assert!(allowed("gh api repos/o/r/pulls/1"));
        assert!(allowed("gh api repos/o/r/pulls -X GET"));
        assert!(allowed("gh api repos/o/r/pulls -XGET"));
        assert!(allowed("gh api repos/o/r/pulls --paginate"));
        assert!(allowed("gh api repos/o/r/contents/f --jq '.content'"));
        assert!(!allowed("gh api repos/o/r/pulls/1 -X POST"));
        assert!(!allowed("gh api repos/o/r/pulls -XPOST"));
        assert!(!allowed("gh api repos/o/r/pulls/1 --method=PATCH"));
    }

    #[test]
    fn glab_noun_verb_pairs() {
        assert!(allowed("glab mr list"));
        assert!(allowed("glab mr view 123"));
        assert!(allowed("glab mr diff 123"));
        assert!(allowed("glab issue list"));
        assert!(allowed("glab ci status"));
        assert!(allowed("glab release list"));
        assert!(allowed("glab snippet view 1"));
        assert!(allowed("glab auth status"));
        assert!(allowed("glab version"));
        assert!(allowed("glab check-update"));
        assert!(!allowed("glab mr create --title test"));
        assert!(!allowed("glab mr merge 123"));
        assert!(!allowed("glab auth login"));
        assert!(!allowed("glab"));
    }

    #[test]
    fn glab_api_shares_gh_grammar() {
        assert!(allowed("glab api projects/1/merge_requests"));
        assert!(allowed("glab api projects/1/issues -X GET"));
        assert!(!allowed("glab api projects/1/issues -X POST"));
        assert!(!allowed("glab api projects/1/issues -f title=x"));
    }

    #[test]
    fn api_body_flags_blocked() {
        assert!(!allowed("gh api repos/o/r/issues -f title=x"));
        assert!(!allowed("gh api repos/o/r/issues --field title=x"));
        assert!(!allowed("gh api repos/o/r/issues --input payload.json"));
        assert!(!allowed("gh api repos/o/r/issues -Ftitle=x"));
    }
}
