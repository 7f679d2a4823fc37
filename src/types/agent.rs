//! Agent descriptor types
//!
//! An [`AgentConfig`] describes how to launch one kind of interactive agent
//! inside a terminal session, how to tell when it is ready, how to type into
//! it, and where its answers can be found.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::terminal::{InjectionStrategy, Key};

use super::identifiers::AgentId;

/// Default response budget (60 minutes)
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 60 * 60 * 1000;

/// Default ready budget (30 seconds)
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// Response detection
// ============================================================================

/// Shape of the records an agent writes to its own log files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Claude Code project transcripts (`assistant` records with text parts)
    ClaudeJsonl,
    /// Codex rollout files (`event_msg` / `agent_message` records)
    CodexJsonl,
    /// Gemini chat documents (single JSON object with a `messages` array)
    GeminiJson,
}

impl LogFormat {
    /// File extension of log files in this format
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::ClaudeJsonl | Self::CodexJsonl => "jsonl",
            Self::GeminiJson => "json",
        }
    }
}

/// Where an agent's structured logs live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogLocation {
    /// `~/.claude/projects/<encoded work dir>/`
    ClaudeProjects,
    /// `~/.codex/sessions/YYYY/MM/DD/`
    CodexSessions,
    /// `~/.gemini/tmp/<sha256 of work dir>/chats/`
    GeminiChats,
    /// Explicit directory with a known record format
    Directory {
        /// Directory holding the log files
        path: PathBuf,
        /// Record format of the files
        format: LogFormat,
        /// Only file names starting with this are scanned
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name_prefix: Option<String>,
        /// File names containing this are skipped
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude: Option<String>,
    },
}

/// How the answer to a prompt is detected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ResponseDetection {
    /// Scan the rendered screen for an end-of-turn literal
    Marker {
        /// Literal the agent's UI prints when a turn is complete
        completion_marker: String,
        /// Literals marking the line that starts a response
        #[serde(default)]
        boundary_patterns: Vec<String>,
    },
    /// Scan the agent's own structured log files
    StructuredLog {
        /// Log directory hint
        location: LogLocation,
    },
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Immutable descriptor of one agent kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Logical agent identity, also used in session names
    pub name: AgentId,
    /// Launch command, submitted as the session's first input line
    pub command: Vec<String>,
    /// Screen literals indicating the agent finished starting up
    pub ready_patterns: Vec<String>,
    /// Screen literals of first-run dialogs dismissed with Enter while waiting for ready
    #[serde(default)]
    pub dismiss_prompts: Vec<String>,
    /// Answer detection mode
    pub detection: ResponseDetection,
    /// How prompts are typed into the terminal
    pub injection: InjectionStrategy,
    /// Prefix placed before the raw prompt text
    #[serde(default)]
    pub safe_prefix: Option<String>,
    /// Collapse prompt newlines to spaces before delivery
    #[serde(default)]
    pub collapse_newlines: bool,
    /// Keys sent before each prompt
    #[serde(default)]
    pub pre_submit_keys: Vec<Key>,
    /// Ready budget in milliseconds
    pub ready_timeout_ms: u64,
    /// Response budget in milliseconds
    pub timeout_ms: u64,
}

impl AgentConfig {
    /// Create a new builder for an agent
    pub fn builder(name: impl Into<AgentId>, command: Vec<impl Into<String>>) -> AgentConfigBuilder {
        AgentConfigBuilder::new(name, command)
    }

    /// Ready budget
    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Response budget
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check the descriptor is usable
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an empty command, no ready patterns, or a zero budget
    pub fn validate(&self) -> Result<()> {
        if self.command.is_empty() || self.command.iter().all(|c| c.trim().is_empty()) {
            return Err(BridgeError::invalid_config(format!(
                "agent {} has an empty launch command",
                self.name
            )));
        }
        if self.ready_patterns.is_empty() {
            return Err(BridgeError::invalid_config(format!(
                "agent {} has no ready patterns",
                self.name
            )));
        }
        if self.timeout_ms == 0 || self.ready_timeout_ms == 0 {
            return Err(BridgeError::invalid_config(format!(
                "agent {} has a zero timeout",
                self.name
            )));
        }
        if let ResponseDetection::Marker {
            completion_marker, ..
        } = &self.detection
            && completion_marker.is_empty()
        {
            return Err(BridgeError::invalid_config(format!(
                "agent {} has an empty completion marker",
                self.name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Builder for AgentConfig
// ============================================================================

/// Builder for `AgentConfig`
#[derive(Debug)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    fn new(name: impl Into<AgentId>, command: Vec<impl Into<String>>) -> Self {
        Self {
            config: AgentConfig {
                name: name.into(),
                command: command.into_iter().map(Into::into).collect(),
                ready_patterns: Vec::new(),
                dismiss_prompts: Vec::new(),
                detection: ResponseDetection::Marker {
                    completion_marker: String::new(),
                    boundary_patterns: Vec::new(),
                },
                injection: InjectionStrategy::BulkPaste,
                safe_prefix: None,
                collapse_newlines: false,
                pre_submit_keys: Vec::new(),
                ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
                timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            },
        }
    }

    /// Set ready patterns
    #[must_use]
    pub fn ready_patterns(mut self, patterns: Vec<impl Into<String>>) -> Self {
        self.config.ready_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set dialogs to auto-dismiss during the ready wait
    #[must_use]
    pub fn dismiss_prompts(mut self, prompts: Vec<impl Into<String>>) -> Self {
        self.config.dismiss_prompts = prompts.into_iter().map(Into::into).collect();
        self
    }

    /// Detect answers on screen via an end-of-turn literal
    #[must_use]
    pub fn screen_marker(
        mut self,
        completion_marker: impl Into<String>,
        boundary_patterns: Vec<impl Into<String>>,
    ) -> Self {
        self.config.detection = ResponseDetection::Marker {
            completion_marker: completion_marker.into(),
            boundary_patterns: boundary_patterns.into_iter().map(Into::into).collect(),
        };
        self
    }

    /// Detect answers in structured log files
    #[must_use]
    pub fn structured_log(mut self, location: LogLocation) -> Self {
        self.config.detection = ResponseDetection::StructuredLog { location };
        self
    }

    /// Set injection strategy
    #[must_use]
    pub const fn injection(mut self, strategy: InjectionStrategy) -> Self {
        self.config.injection = strategy;
        self
    }

    /// Set the safe prefix
    #[must_use]
    pub fn safe_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.safe_prefix = Some(prefix.into());
        self
    }

    /// Collapse newlines in prompts
    #[must_use]
    pub const fn collapse_newlines(mut self, collapse: bool) -> Self {
        self.config.collapse_newlines = collapse;
        self
    }

    /// Keys sent before each prompt
    #[must_use]
    pub fn pre_submit_keys(mut self, keys: Vec<Key>) -> Self {
        self.config.pre_submit_keys = keys;
        self
    }

    /// Set ready budget
    #[must_use]
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.config.ready_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set response budget
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> AgentConfig {
        self.config
    }
}
