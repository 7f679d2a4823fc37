//! Hub settings and built-in agent descriptors

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::terminal::config::DEFAULT_CAPTURE_LINES;
use crate::terminal::{InjectionStrategy, Key};
use crate::types::{AgentConfig, LogLocation};

/// Idle time after which the reaper destroys a session (30 minutes)
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Reaper period (1 minute)
pub const DEFAULT_REAPER_INTERVAL_MS: u64 = 60_000;

/// Prompts accepted by one fan-out batch
pub const DEFAULT_FAN_OUT_CAP: usize = 4;

/// Ready budget of a fan-out slot
pub const DEFAULT_FAN_OUT_READY_TIMEOUT_MS: u64 = 30_000;

/// Response budget of a fan-out slot
pub const DEFAULT_FAN_OUT_RESPONSE_TIMEOUT_MS: u64 = 120_000;

/// Default Gemini model for the flash slot
pub const GEMINI_FLASH_MODEL: &str = "gemini-3-flash-preview";

/// Default Gemini model for the pro slot
pub const GEMINI_PRO_MODEL: &str = "gemini-3-pro-preview";

// ============================================================================
// Hub settings
// ============================================================================

/// Tunables of an [`AgentHub`](crate::hub::AgentHub)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Idle threshold for the reaper
    pub idle_timeout_ms: u64,
    /// Reaper period
    pub reaper_interval_ms: u64,
    /// Response poll cadence
    pub response_poll_ms: u64,
    /// Maximum prompts per fan-out batch
    pub fan_out_cap: usize,
    /// Ready budget of each fan-out slot
    pub fan_out_ready_timeout_ms: u64,
    /// Response budget of each fan-out slot
    pub fan_out_response_timeout_ms: u64,
    /// Screen capture window in lines
    pub capture_lines: usize,
    /// Home directory agent log locations resolve against (the user's home when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_home: Option<PathBuf>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            reaper_interval_ms: DEFAULT_REAPER_INTERVAL_MS,
            response_poll_ms: crate::correlate::RESPONSE_POLL_INTERVAL.as_millis() as u64,
            fan_out_cap: DEFAULT_FAN_OUT_CAP,
            fan_out_ready_timeout_ms: DEFAULT_FAN_OUT_READY_TIMEOUT_MS,
            fan_out_response_timeout_ms: DEFAULT_FAN_OUT_RESPONSE_TIMEOUT_MS,
            capture_lines: DEFAULT_CAPTURE_LINES,
            log_home: None,
        }
    }
}

impl HubSettings {
    /// Idle threshold
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Reaper period
    #[must_use]
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_millis(self.reaper_interval_ms)
    }

    /// Response poll cadence
    #[must_use]
    pub fn response_poll(&self) -> Duration {
        Duration::from_millis(self.response_poll_ms)
    }

    /// Fan-out ready budget
    #[must_use]
    pub fn fan_out_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.fan_out_ready_timeout_ms)
    }

    /// Fan-out response budget
    #[must_use]
    pub fn fan_out_response_timeout(&self) -> Duration {
        Duration::from_millis(self.fan_out_response_timeout_ms)
    }
}

// ============================================================================
// Built-in agents
// ============================================================================

/// Codex CLI at the given reasoning effort (`codex_<effort>`)
#[must_use]
pub fn codex(effort: &str) -> AgentConfig {
    AgentConfig::builder(
        format!("codex_{effort}"),
        vec![
            "codex".to_string(),
            "--dangerously-bypass-approvals-and-sandbox".to_string(),
            "-c".to_string(),
            format!("model_reasoning_effort=\"{effort}\""),
        ],
    )
    .ready_patterns(vec!["? for shortcuts", "context left", "How can I help"])
    .structured_log(LogLocation::CodexSessions)
    .injection(InjectionStrategy::BulkPaste)
    .build()
}

/// Gemini CLI in YOLO mode (`gemini_<flash|pro|model>`)
#[must_use]
pub fn gemini(model: &str) -> AgentConfig {
    let short = if model.contains("flash") {
        "flash"
    } else if model.contains("pro") {
        "pro"
    } else {
        model
    };

    AgentConfig::builder(
        format!("gemini_{short}"),
        vec!["gemini", "-m", model, "-y"],
    )
    .ready_patterns(vec!["YOLO mode", "Type your message", "Model:"])
    .structured_log(LogLocation::GeminiChats)
    .injection(InjectionStrategy::BulkPaste)
    .safe_prefix("Soru: ")
    .pre_submit_keys(vec![Key::Escape])
    .build()
}

/// Claude Code; typed in chunks because large pastes turn Enter into a newline
#[must_use]
pub fn claude() -> AgentConfig {
    AgentConfig::builder("claude", vec!["claude"])
        .ready_patterns(vec!["? for shortcuts", "Try \""])
        .dismiss_prompts(vec!["Do you trust the files in this folder?"])
        .structured_log(LogLocation::ClaudeProjects)
        .injection(InjectionStrategy::ChunkedTyping)
        .collapse_newlines(true)
        .build()
}

/// Every built-in descriptor
#[must_use]
pub fn builtin_agents() -> Vec<AgentConfig> {
    vec![
        codex("xhigh"),
        codex("medium"),
        gemini(GEMINI_FLASH_MODEL),
        gemini(GEMINI_PRO_MODEL),
        claude(),
    ]
}
