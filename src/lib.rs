#![cfg_attr(not(test), forbid(unsafe_code))]
//! Safe Command Gate (scg): a `PreToolUse` hook that auto-approves
//! provably read-only Bash commands for Claude Code.
//!
//! # Architecture
//!
//! A command line flows through three stages:
//!
//! 1. [`parse`] splits the line into segments at unquoted `|`, `;`, `&`,
//!    `&&`, and newlines, rejects unquoted redirection and command
//!    substitution, and tokenizes each segment with shell quoting rules.
//! 2. [`evaluator`] drives the per-segment verdict: every segment of a
//!    chain must be safe for the whole command to be approved, and wrapper
//!    commands (`timeout`, `xargs`, `bash -c`, ...) re-enter the evaluator
//!    on their inner command up to a fixed depth.
//! 3. [`policy`] holds the per-tool knowledge: a catalog of always-safe
//!    utilities plus argument-inspecting handlers for git, gh, package
//!    managers, and guarded coreutils.
//!
//! [`settings`] adds a fallback tier of user-approved `Bash(...)` patterns
//! from Claude Code settings files, and [`hook`] speaks the JSON protocol.
//!
//! The gate only ever says "allow" or nothing. It never denies, so a false
//! negative costs one permission prompt rather than a broken session.

pub mod cli;
pub mod config;
pub mod evaluator;
pub mod hook;
pub mod logging;
pub mod parse;
pub mod policy;
pub mod settings;

pub use evaluator::{evaluate_command, evaluate_with_settings, Verdict};
pub use settings::ApprovedPatterns;
