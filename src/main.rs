#![forbid(unsafe_code)]
//! Safe Command Gate (scg) for Claude Code.
//!
//! Auto-approves Bash commands that are provably read-only so they skip the
//! permission prompt. This hook runs before Bash commands execute.
//!
//! Exit behavior:
//!   - Exit 0 with JSON {"hookSpecificOutput": {"permissionDecision": "allow", ...}} = approve
//!   - Exit 0 with no output = no decision, normal permission flow applies
//!
//! The hook never blocks anything. Every failure path, from unreadable stdin
//! to an unparseable command, ends in silence rather than a verdict.

use clap::Parser;
use colored::Colorize;
use safe_command_gate::cli::Cli;
use safe_command_gate::config::Config;
use safe_command_gate::evaluator::{evaluate_command, evaluate_with_settings, Verdict};
use safe_command_gate::hook::{self, MAX_HOOK_INPUT_BYTES};
use safe_command_gate::logging::{log_decision, LogEntry};
use safe_command_gate::settings::ApprovedPatterns;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

/// Configure colored output based on TTY detection and config.
///
/// Disables colors if stderr is not a terminal (e.g., piped to a file).
fn configure_colors(mode: &str) {
    match mode {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {
            if !io::stderr().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

/// Evaluate a command through both tiers: the policy tables first, then the
/// user's approved settings patterns. Returns the verdict and which tier
/// vouched for it.
fn evaluate(command: &str) -> (Verdict, &'static str) {
    if evaluate_command(command).is_allow() {
        return (Verdict::Allow, "policy");
    }
    let patterns = ApprovedPatterns::load();
    if !patterns.is_empty() && evaluate_with_settings(command, &patterns).is_allow() {
        return (Verdict::Allow, "settings");
    }
    (Verdict::NoDecision, "none")
}

/// One-off check mode: `scg "git status"`. Exit 0 when the command would be
/// auto-approved, 1 otherwise.
fn run_check(command: &str, verbose: bool) -> ExitCode {
    let (verdict, source) = evaluate(command);
    match verdict {
        Verdict::Allow => {
            if verbose {
                eprintln!("{} ({source}): {command}", "allow".green().bold());
            }
            ExitCode::SUCCESS
        }
        Verdict::NoDecision => {
            if verbose {
                eprintln!("{}: {command}", "no decision".yellow().bold());
            }
            ExitCode::FAILURE
        }
    }
}

/// Hook mode: read the PreToolUse payload from stdin, approve or stay quiet.
/// Always exits 0; a broken payload must not fail the tool call.
fn run_hook(config: &Config) -> ExitCode {
    let Ok(input) = hook::read_hook_input(MAX_HOOK_INPUT_BYTES) else {
        return ExitCode::SUCCESS;
    };
    let Some(command) = hook::extract_command(&input) else {
        return ExitCode::SUCCESS;
    };
    let (verdict, source) = evaluate(&command);
    log_decision(&config.logging, &LogEntry::new(verdict, source, &command));
    if verdict.is_allow() {
        hook::emit_allow("scg: read-only command");
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load();
    configure_colors(&config.general.color);
    match cli.command {
        Some(ref command) => run_check(command, cli.verbose || config.general.verbose),
        None => run_hook(&config),
    }
}
