//! Structured logging for gate decisions.
//!
//! Appends one line per evaluated command to a configured log file, in text
//! or JSON format. Logging is best-effort: any failure to open or write the
//! file is swallowed so it can never affect the verdict.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use crate::config::LoggingConfig;
use crate::evaluator::Verdict;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// A structured log entry for a command evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub decision: String,
    pub source: String,
    pub command: String,
}

impl LogEntry {
    /// `source` names what vouched for the command: "policy" or "settings".
    /// A no-decision entry carries "none".
    #[must_use]
    pub fn new(verdict: Verdict, source: &str, command: &str) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or_else(
                |_| "1970-01-01T00:00:00Z".to_string(),
                |d| time_to_iso8601(d.as_secs()),
            );
        let decision = match verdict {
            Verdict::Allow => "allow",
            Verdict::NoDecision => "no-decision",
        };
        Self {
            timestamp,
            decision: decision.to_string(),
            source: source.to_string(),
            command: command.to_string(),
        }
    }

    /// Render as a human-readable log line.
    #[must_use]
    pub fn format_text(&self) -> String {
        format!(
            "[{}] {} [{}] \"{}\"",
            self.timestamp,
            self.decision.to_uppercase(),
            self.source,
            self.command
        )
    }

    /// Render as a JSON line.
    #[must_use]
    pub fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Append an entry to the configured log file, if any.
pub fn log_decision(config: &LoggingConfig, entry: &LogEntry) {
    let Some(ref path) = config.file else {
        return;
    };
    let expanded = expand_tilde(path);
    let Ok(mut file) = open_log_file(&expanded) else {
        return;
    };
    let line = match config.format {
        LogFormat::Text => entry.format_text(),
        LogFormat::Json => entry.format_json(),
    };
    let _ = writeln!(file, "{line}");
}

fn expand_tilde(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => format!("{}/{rest}", home.to_string_lossy()),
        _ => path.to_string(),
    }
}

fn open_log_file(path: &str) -> std::io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn time_to_iso8601(secs: u64) -> String {
    const SECS_PER_DAY: u64 = 86400;
    const DAYS_PER_YEAR: u64 = 365;
    const DAYS_PER_4YEARS: u64 = 1461;
    const DAYS_PER_100YEARS: u64 = 36524;
    const DAYS_PER_400YEARS: u64 = 146_097;

    let mut days = secs / SECS_PER_DAY;
    let time_of_day = secs % SECS_PER_DAY;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    days += 719_468;
    let era = days / DAYS_PER_400YEARS;
    let doe = days % DAYS_PER_400YEARS;
    let yoe = (doe - doe / DAYS_PER_4YEARS + doe / DAYS_PER_100YEARS - doe / DAYS_PER_400YEARS)
        / DAYS_PER_YEAR;
    let year = yoe + era * 400;
    let doy = doe - (DAYS_PER_YEAR * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };

    format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}Z")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_format_shape() {
        let mut entry = LogEntry::new(Verdict::Allow, "policy", "ls -la");
        entry.timestamp = "2025-01-01T00:00:00Z".to_string();
        assert_eq!(
            entry.format_text(),
            "[2025-01-01T00:00:00Z] ALLOW [policy] \"ls -la\""
        );
    }

    #[test]
    fn json_format_shape() {
        let mut entry = LogEntry::new(Verdict::NoDecision, "none", "rm -rf /");
        entry.timestamp = "2025-01-01T00:00:00Z".to_string();
        let json = entry.format_json();
        assert!(json.contains("\"decision\":\"no-decision\""));
        assert!(json.contains("\"source\":\"none\""));
    }

    #[test]
    fn log_decision_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.log");
        let config = LoggingConfig {
            file: Some(path.to_string_lossy().into_owned()),
            format: LogFormat::Text,
        };
        log_decision(&config, &LogEntry::new(Verdict::Allow, "policy", "ls"));
        log_decision(&config, &LogEntry::new(Verdict::NoDecision, "none", "rm x"));
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ALLOW"));
        assert!(lines[1].contains("NO-DECISION"));
    }

    #[test]
    fn log_decision_without_file_is_noop() {
        let config = LoggingConfig::default();
        log_decision(&config, &LogEntry::new(Verdict::Allow, "policy", "ls"));
    }

    #[test]
    fn iso8601_rendering() {
        assert_eq!(time_to_iso8601(0), "1970-01-01T00:00:00Z");
        assert_eq!(time_to_iso8601(1_735_689_600), "2025-01-01T00:00:00Z");
    }
}
