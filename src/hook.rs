//! Claude Code hook protocol handling.
//!
//! This module handles the JSON input/output for the Claude Code `PreToolUse`
//! hook. It parses incoming hook requests and formats allow responses. The
//! gate never emits a deny; when it cannot vouch for a command it stays
//! silent and Claude Code falls back to its normal permission prompt.

use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

/// Byte cap on hook input read from stdin.
pub const MAX_HOOK_INPUT_BYTES: usize = 1024 * 1024;

/// Incoming `PreToolUse` payload. Every field is optional so that payloads
/// for other tools still deserialize cleanly.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    /// Which tool Claude Code is about to run ("Bash", "Read", ...).
    pub tool_name: Option<String>,

    /// Arguments for that tool.
    pub tool_input: Option<ToolInput>,
}

/// The slice of tool input this gate cares about.
#[derive(Debug, Deserialize)]
pub struct ToolInput {
    /// The candidate command line, when the tool is Bash. Kept as a raw
    /// value so a non-string here degrades to silence instead of a parse
    /// error for the whole payload.
    pub command: Option<serde_json::Value>,
}

/// Wrapper object for the approval response.
#[derive(Debug, Serialize)]
pub struct HookOutput {
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: HookSpecificOutput,
}

/// Body of the approval response.
#[derive(Debug, Serialize)]
pub struct HookSpecificOutput {
    /// Always "`PreToolUse`".
    #[serde(rename = "hookEventName")]
    pub hook_event_name: &'static str,

    /// Always "allow"; anything the gate cannot vouch for gets no output.
    #[serde(rename = "permissionDecision")]
    pub permission_decision: &'static str,

    /// One-line justification shown to the user.
    #[serde(rename = "permissionDecisionReason")]
    pub permission_decision_reason: String,
}

/// Ways reading the hook payload can fail. All of them end the run quietly.
#[derive(Debug)]
pub enum HookReadError {
    /// stdin could not be read.
    Io(io::Error),
    /// Payload was larger than the cap.
    InputTooLarge(usize),
    /// Payload was not valid hook JSON.
    Json(serde_json::Error),
}

/// Read the hook payload from stdin, refusing anything over `max_bytes`.
///
/// # Errors
///
/// Returns a [`HookReadError`] variant for an stdin read failure, an
/// oversized payload, or malformed JSON.
pub fn read_hook_input(max_bytes: usize) -> Result<HookInput, HookReadError> {
    let mut raw = String::new();
    // One extra byte so an at-limit read is distinguishable from overflow.
    io::stdin()
        .lock()
        .take(max_bytes as u64 + 1)
        .read_to_string(&mut raw)
        .map_err(HookReadError::Io)?;

    if raw.len() > max_bytes {
        return Err(HookReadError::InputTooLarge(raw.len()));
    }

    serde_json::from_str(&raw).map_err(HookReadError::Json)
}

/// Pull the candidate command out of the payload. Returns `None` for
/// anything that is not a Bash invocation carrying a non-empty string.
#[must_use]
pub fn extract_command(input: &HookInput) -> Option<String> {
    if input.tool_name.as_deref() != Some("Bash") {
        return None;
    }

    match input.tool_input.as_ref()?.command.as_ref()? {
        serde_json::Value::String(cmd) if !cmd.is_empty() => Some(cmd.clone()),
        _ => None,
    }
}

/// Build the allow payload for a vouched-for command.
#[must_use]
pub fn allow_output(reason: &str) -> HookOutput {
    HookOutput {
        hook_specific_output: HookSpecificOutput {
            hook_event_name: "PreToolUse",
            permission_decision: "allow",
            permission_decision_reason: reason.to_string(),
        },
    }
}

/// Serialize and print the allow payload to stdout.
pub fn emit_allow(reason: &str) {
    if let Ok(json) = serde_json::to_string(&allow_output(reason)) {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout, "{json}");
        let _ = stdout.flush();
    }
}
