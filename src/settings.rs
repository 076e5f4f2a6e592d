//! User-approved command patterns from Claude Code settings files.
//!
//! Patterns look like `Bash(npm test)` or `Bash(cargo test *)`. They are a
//! fallback tier: a segment the policy tables cannot vouch for may still be
//! covered by a pattern the user approved earlier. Globs match per segment
//! only, and a `prefix *` glob requires a word boundary after the prefix so
//! `Bash(ls *)` does not cover `lsof`.
//!
//! Loading is fail-soft. A missing or malformed settings file contributes
//! nothing rather than aborting the hook.

use std::collections::HashSet;
use std::path::Path;

use crate::parse::strip_env_assignments;

#[derive(Debug, Default)]
pub struct ApprovedPatterns {
    exact: HashSet<String>,
    globs: Vec<Vec<String>>,
}

impl ApprovedPatterns {
    /// Load the user tier (`$HOME/.claude/settings.json`) and the project
    /// tier (`$CLAUDE_PROJECT_DIR/.claude/settings.json` plus
    /// `settings.local.json`). All tiers are unioned.
    #[must_use]
    pub fn load() -> Self {
        let mut patterns = Self::default();
        if let Some(home) = std::env::var_os("HOME") {
            patterns.load_file(&Path::new(&home).join(".claude/settings.json"));
        }
        if let Some(project_dir) = std::env::var_os("CLAUDE_PROJECT_DIR") {
            let base = Path::new(&project_dir).join(".claude");
            patterns.load_file(&base.join("settings.json"));
            patterns.load_file(&base.join("settings.local.json"));
        }
        patterns
    }

    /// Build from raw pattern strings. Entries that are not `Bash(...)` are
    /// ignored, same as when loading from disk.
    #[must_use]
    pub fn from_entries(entries: &[&str]) -> Self {
        let mut patterns = Self::default();
        for entry in entries {
            patterns.add_pattern(entry);
        }
        patterns
    }

    pub fn load_file(&mut self, path: &Path) {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&contents) else {
            return;
        };
        if let Some(arr) = value.get("approved_commands").and_then(|v| v.as_array()) {
            for entry in arr.iter().filter_map(|e| e.as_str()) {
                self.add_pattern(entry);
            }
        }
        if let Some(arr) = value
            .get("permissions")
            .and_then(|v| v.get("allow"))
            .and_then(|v| v.as_array())
        {
            for entry in arr.iter().filter_map(|e| e.as_str()) {
                self.add_pattern(entry);
            }
        }
    }

    fn add_pattern(&mut self, entry: &str) {
        let Some(inner) = entry.strip_prefix("Bash(").and_then(|s| s.strip_suffix(')')) else {
            return;
        };
        if inner.is_empty() {
            return;
        }
        // legacy form: "npm run:*" means "npm run *"
        let normalized = if let Some(prefix) = inner.strip_suffix(":*") {
            format!("{prefix} *")
        } else {
            inner.to_string()
        };
        if normalized.contains('*') {
            self.globs
                .push(normalized.split('*').map(String::from).collect());
        } else {
            self.exact.insert(normalized);
        }
    }

    /// True when the segment, minus any leading environment assignments,
    /// matches an approved pattern. The caller is responsible for rejecting
    /// segments with unsafe shell syntax before consulting this.
    #[must_use]
    pub fn matches(&self, segment: &str) -> bool {
        let normalized = strip_env_assignments(segment).trim();
        if normalized.is_empty() {
            return false;
        }
        if self.exact.contains(normalized) {
            return true;
        }
        self.globs.iter().any(|parts| glob_matches(parts, normalized))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.globs.is_empty()
    }
}

fn glob_matches(parts: &[String], text: &str) -> bool {
    let first = &parts[0];
    let last = &parts[parts.len() - 1];

    // "prefix *": the prefix must be followed by a space or end the text
    if parts.len() == 2 && last.is_empty() && first.ends_with(' ') {
        let prefix = &first[..first.len() - 1];
        return text == prefix || text.starts_with(first.as_str());
    }

    if !text.starts_with(first.as_str()) || !text.ends_with(last.as_str()) {
        return false;
    }
    let mut pos = first.len();
    let end = text.len() - last.len();
    if pos > end {
        return false;
    }
    for part in &parts[1..parts.len() - 1] {
        match text[pos..end].find(part.as_str()) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }
    pos <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn exact_pattern() {
        let p = ApprovedPatterns::from_entries(&["Bash(npm test)"]);
        assert!(p.matches("npm test"));
        assert!(!p.matches("npm test --watch"));
    }

    #[test]
    fn space_star_requires_word_boundary() {
        let p = ApprovedPatterns::from_entries(&["Bash(ls *)"]);
        assert!(p.matches("ls -la"));
        assert!(p.matches("ls foo"));
        assert!(!p.matches("lsof"));
    }

    #[test]
    fn star_without_space_has_no_boundary() {
        let p = ApprovedPatterns::from_entries(&["Bash(ls*)"]);
        assert!(p.matches("ls -la"));
        assert!(p.matches("lsof"));
    }

    #[test]
    fn legacy_colon_star_form() {
        let p = ApprovedPatterns::from_entries(&["Bash(npm run:*)"]);
        assert!(p.matches("npm run build"));
        assert!(!p.matches("npm running"));
        assert!(!p.matches("npm install"));
    }

    #[test]
    fn star_at_beginning_and_middle() {
        let p = ApprovedPatterns::from_entries(&["Bash(* --version)"]);
        assert!(p.matches("some-tool --version"));
        assert!(!p.matches("some-tool --help"));

        let p = ApprovedPatterns::from_entries(&["Bash(git * main)"]);
        assert!(p.matches("git checkout main"));
        assert!(p.matches("git merge main"));
        assert!(!p.matches("git checkout develop"));
    }

    #[test]
    fn non_bash_entries_ignored() {
        let p = ApprovedPatterns::from_entries(&["WebFetch", "Read(/etc/*)", "Bash()"]);
        assert!(p.is_empty());
    }

    #[test]
    fn env_prefix_stripped_before_matching() {
        let p = ApprovedPatterns::from_entries(&["Bash(bundle install)"]);
        assert!(p.matches("RACK_ENV=test bundle install"));
    }

    #[test]
    fn bare_star_matches_everything() {
        let p = ApprovedPatterns::from_entries(&["Bash(*)"]);
        assert!(p.matches("anything at all"));
    }

    #[test]
    fn empty_patterns_match_nothing() {
        let p = ApprovedPatterns::default();
        assert!(p.is_empty());
        assert!(!p.matches("anything"));
    }

    #[test]
    fn load_file_missing_or_malformed_is_empty() {
        let mut p = ApprovedPatterns::default();
        p.load_file(Path::new("/nonexistent/path/settings.json"));
        assert!(p.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json{{{").unwrap();
        p.load_file(&path);
        assert!(p.is_empty());
    }

    #[test]
    fn load_file_reads_both_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"approved_commands":["Bash(npm test)","WebFetch"],"permissions":{"allow":["Bash(cargo test *)"]}}"#,
        )
        .unwrap();
        let mut p = ApprovedPatterns::default();
        p.load_file(&path);
        assert!(p.matches("npm test"));
        assert!(p.matches("cargo test --release"));
        assert!(p.matches("cargo test"));
        assert!(!p.matches("curl evil.example.com"));
    }

    #[test]
    fn tiers_union_without_shadowing() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.json");
        let project = dir.path().join("project.json");
        fs::write(&user, r#"{"permissions":{"allow":["Bash(npm test)"]}}"#).unwrap();
        fs::write(&project, r#"{"permissions":{"allow":["Bash(cargo test *)"]}}"#).unwrap();
        let mut p = ApprovedPatterns::default();
        p.load_file(&user);
        p.load_file(&project);
        assert!(p.matches("npm test"));
        assert!(p.matches("cargo test --lib"));
    }
}
