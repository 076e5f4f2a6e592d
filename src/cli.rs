//! CLI argument parsing.
//!
//! With no arguments scg runs in hook mode, reading a `PreToolUse` payload
//! from stdin. With a command string it runs a one-off check and reports the
//! verdict via the exit code.

use clap::Parser;

/// Safe command gate for Claude Code.
///
/// scg auto-approves Bash commands it can prove are read-only, so agents
/// spend fewer permission prompts on `ls`, `git status`, and friends. It
/// never denies: commands it cannot vouch for fall through to Claude Code's
/// normal permission flow.
#[derive(Parser, Debug)]
#[command(name = "scg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command string to check (omit to run in hook mode)
    pub command: Option<String>,

    /// Explain the verdict on stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
