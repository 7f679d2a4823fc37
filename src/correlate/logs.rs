//! Structured log scanning
//!
//! Agents write their transcripts to conventional directories. Files are
//! read in full on every scan and never written. Unparsable lines or
//! documents are skipped; a missing directory just means no candidates.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Days, Local, NaiveDate};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{BridgeError, Result};
use crate::types::{LogFormat, LogLocation, RequestToken};

use super::prompt::strip_markers;
use super::source::ResponseSource;

/// Slack subtracted from the request start to absorb coarse mtimes
pub const MTIME_SLACK: Duration = Duration::from_secs(2);

/// Newest rollout files considered per Codex scan
pub const MAX_CODEX_FILES: usize = 30;

/// End-of-turn glyph Gemini leaves in its answers
pub const GEMINI_END_GLYPH: &str = "◆END◆";

/// Days scanned back from today for date-partitioned directories
const DATED_LOOKBACK_DAYS: u64 = 1;

// ============================================================================
// Record shapes
// ============================================================================

#[derive(Deserialize)]
struct ClaudeRecord {
    #[serde(rename = "type")]
    kind: String,
    message: Option<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeMessage {
    role: Option<String>,
    #[serde(default)]
    content: ClaudeContent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClaudeContent {
    Text(String),
    Blocks(Vec<ClaudeBlock>),
}

impl Default for ClaudeContent {
    fn default() -> Self {
        Self::Blocks(Vec::new())
    }
}

#[derive(Deserialize)]
struct ClaudeBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct CodexRecord {
    #[serde(rename = "type")]
    kind: String,
    payload: Option<CodexPayload>,
}

#[derive(Deserialize)]
struct CodexPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct GeminiChat {
    #[serde(default)]
    messages: Vec<GeminiMessage>,
}

#[derive(Deserialize)]
struct GeminiMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: serde_json::Value,
}

fn claude_text(line: &str) -> Option<String> {
    let record: ClaudeRecord = serde_json::from_str(line).ok()?;
    if record.kind != "assistant" {
        return None;
    }
    let message = record.message?;
    if message.role.as_deref().is_some_and(|r| r != "assistant") {
        return None;
    }
    match message.content {
        ClaudeContent::Text(text) => Some(text),
        ClaudeContent::Blocks(blocks) => {
            let parts: Vec<String> = blocks
                .into_iter()
                .filter(|b| b.kind == "text")
                .filter_map(|b| b.text)
                .filter(|t| !t.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("\n"))
        }
    }
}

fn codex_text(line: &str) -> Option<String> {
    let record: CodexRecord = serde_json::from_str(line).ok()?;
    if record.kind != "event_msg" {
        return None;
    }
    let payload = record.payload?;
    if payload.kind.as_deref() != Some("agent_message") {
        return None;
    }
    payload.message
}

/// Find the newest record in `content` carrying the token's answer marker
///
/// Returns the record's text with markers removed and trimmed.
#[must_use]
pub fn extract_answer(format: LogFormat, content: &str, token: &RequestToken) -> Option<String> {
    let marker = token.answer_marker();

    let found = match format {
        LogFormat::ClaudeJsonl | LogFormat::CodexJsonl => {
            let parse = if format == LogFormat::ClaudeJsonl {
                claude_text
            } else {
                codex_text
            };
            content
                .lines()
                .rev()
                .filter(|line| line.contains(marker.as_str()))
                .filter_map(parse)
                .find(|text| text.contains(marker.as_str()))
        }
        LogFormat::GeminiJson => {
            let chat: GeminiChat = serde_json::from_str(content).ok()?;
            chat.messages
                .into_iter()
                .rev()
                .filter(|m| m.kind == "gemini")
                .filter_map(|m| m.content.as_str().map(str::to_string))
                .find(|text| text.contains(marker.as_str()))
                .map(|text| text.replace(GEMINI_END_GLYPH, ""))
        }
    }?;

    Some(strip_markers(&found, token))
}

// ============================================================================
// Directory conventions
// ============================================================================

/// `~/.claude/projects/<work dir with '/' and '.' replaced by '-'>`
#[must_use]
pub fn claude_project_dir(home: &Path, work_dir: &Path) -> PathBuf {
    let encoded: String = work_dir
        .to_string_lossy()
        .chars()
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect();
    home.join(".claude").join("projects").join(encoded)
}

/// `~/.gemini/tmp/<sha256 hex of work dir>/chats`
#[must_use]
pub fn gemini_chat_dir(home: &Path, work_dir: &Path) -> PathBuf {
    let digest = Sha256::digest(work_dir.to_string_lossy().as_bytes());
    let hash: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    home.join(".gemini").join("tmp").join(hash).join("chats")
}

/// `<root>/YYYY/MM/DD` for a local date
#[must_use]
pub fn dated_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(date.format("%Y").to_string())
        .join(date.format("%m").to_string())
        .join(date.format("%d").to_string())
}

#[derive(Debug, Clone)]
enum LogDir {
    Fixed(PathBuf),
    /// Date-partitioned below a root, resolved at scan time
    Dated(PathBuf),
}

/// Log-directory response source
#[derive(Debug, Clone)]
pub struct LogDirSource {
    dir: LogDir,
    format: LogFormat,
    name_prefix: Option<String>,
    exclude: Option<String>,
    max_files: Option<usize>,
}

impl LogDirSource {
    /// Scan one fixed directory
    pub fn new(dir: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            dir: LogDir::Fixed(dir.into()),
            format,
            name_prefix: None,
            exclude: None,
            max_files: None,
        }
    }

    /// Scan the `YYYY/MM/DD` directories under `root` covering the request
    pub fn dated(root: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            dir: LogDir::Dated(root.into()),
            ..Self::new(PathBuf::new(), format)
        }
    }

    /// Only consider file names starting with `prefix`
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Skip file names containing `fragment`
    #[must_use]
    pub fn excluding(mut self, fragment: impl Into<String>) -> Self {
        self.exclude = Some(fragment.into());
        self
    }

    /// Consider at most the `max` newest files
    #[must_use]
    pub fn with_max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }

    /// Resolve a location hint against the user's home directory
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the home directory cannot be determined
    pub fn from_location(location: &LogLocation, work_dir: &Path) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| BridgeError::invalid_config("cannot determine home directory"))?;
        Ok(Self::from_location_in_home(location, work_dir, &home))
    }

    /// Resolve a location hint against an explicit home directory
    #[must_use]
    pub fn from_location_in_home(location: &LogLocation, work_dir: &Path, home: &Path) -> Self {
        match location {
            LogLocation::ClaudeProjects => {
                Self::new(claude_project_dir(home, work_dir), LogFormat::ClaudeJsonl)
                    .excluding("subagent")
            }
            LogLocation::CodexSessions => {
                Self::dated(home.join(".codex").join("sessions"), LogFormat::CodexJsonl)
                    .with_name_prefix("rollout-")
                    .with_max_files(MAX_CODEX_FILES)
            }
            LogLocation::GeminiChats => {
                Self::new(gemini_chat_dir(home, work_dir), LogFormat::GeminiJson)
                    .with_name_prefix("session-")
            }
            LogLocation::Directory {
                path,
                format,
                name_prefix,
                exclude,
            } => Self {
                name_prefix: name_prefix.clone(),
                exclude: exclude.clone(),
                ..Self::new(path.clone(), *format)
            },
        }
    }

    /// Record format of scanned files
    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Directories a scan for a request started at `since` looks in
    #[must_use]
    pub fn directories(&self, since: SystemTime) -> Vec<PathBuf> {
        match &self.dir {
            LogDir::Fixed(path) => vec![path.clone()],
            LogDir::Dated(root) => {
                let today = Local::now().date_naive();
                let oldest = today
                    .checked_sub_days(Days::new(DATED_LOOKBACK_DAYS))
                    .unwrap_or(today);
                let start = DateTime::<Local>::from(since).date_naive().clamp(oldest, today);

                let mut dirs = Vec::new();
                let mut day = today;
                while day >= start {
                    dirs.push(dated_dir(root, day));
                    match day.pred_opt() {
                        Some(prev) => day = prev,
                        None => break,
                    }
                }
                dirs
            }
        }
    }

    fn accepts(&self, file_name: &str) -> bool {
        let extension = format!(".{}", self.format.extension());
        file_name.ends_with(&extension)
            && self
                .name_prefix
                .as_deref()
                .is_none_or(|p| file_name.starts_with(p))
            && self.exclude.as_deref().is_none_or(|x| !file_name.contains(x))
    }

    /// Files modified since `since` (minus slack), newest first
    #[must_use]
    pub fn candidate_files(&self, since: SystemTime) -> Vec<PathBuf> {
        let cutoff = since.checked_sub(MTIME_SLACK).unwrap_or(since);

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for dir in self.directories(since) {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let name = entry.file_name();
                if !self.accepts(&name.to_string_lossy()) {
                    continue;
                }
                let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                    continue;
                };
                if modified >= cutoff {
                    files.push((modified, entry.path()));
                }
            }
        }

        files.sort_by(|a, b| b.0.cmp(&a.0));
        if let Some(max) = self.max_files {
            files.truncate(max);
        }
        files.into_iter().map(|(_, path)| path).collect()
    }

    /// Scan candidate files synchronously
    ///
    /// Blocks on file I/O; async callers go through [`ResponseSource::scan_for_token`].
    #[must_use]
    pub fn scan(&self, token: &RequestToken, since: SystemTime) -> Option<String> {
        self.candidate_files(since).into_iter().find_map(|path| {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::debug!("Skipping unreadable log {}: {e}", path.display());
                    return None;
                }
            };
            let found = extract_answer(self.format, &String::from_utf8_lossy(&bytes), token);
            if found.is_some() {
                log::debug!("Answer for {token} found in {}", path.display());
            }
            found
        })
    }
}

impl ResponseSource for LogDirSource {
    /// Runs [`LogDirSource::scan`] on the blocking pool
    async fn scan_for_token(&self, token: &RequestToken, since: SystemTime) -> Result<Option<String>> {
        let source = self.clone();
        let token = token.clone();
        tokio::task::spawn_blocking(move || source.scan(&token, since))
            .await
            .map_err(|e| BridgeError::Io(std::io::Error::other(format!("log scan task failed: {e}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_dir_replaces_slashes_and_dots() {
        let dir = claude_project_dir(Path::new("/home/u"), Path::new("/home/u/.config/app"));
        assert_eq!(dir, Path::new("/home/u/.claude/projects/-home-u--config-app"));
    }

    #[test]
    fn gemini_dir_uses_sha256_hex() {
        let dir = gemini_chat_dir(Path::new("/h"), Path::new("/work"));
        let hash = dir
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn codex_skips_non_message_events() {
        let token = RequestToken::new("feedbeef");
        let content = concat!(
            r#"{"type":"response_item","payload":{"type":"message","message":"[ANS-feedbeef] echo"}}"#,
            "\n",
            r#"{"type":"event_msg","payload":{"type":"agent_message","message":"Real answer [ANS-feedbeef]"}}"#,
            "\n",
        );
        assert_eq!(
            extract_answer(LogFormat::CodexJsonl, content, &token).as_deref(),
            Some("Real answer")
        );
    }

    #[test]
    fn gemini_strips_end_glyph() {
        let token = RequestToken::new("0badf00d");
        let content = r#"{"messages":[
            {"type":"user","content":"[RQ-0badf00d] q End your response with \"[ANS-0badf00d]\""},
            {"type":"gemini","content":"Answer ◆END◆ [ANS-0badf00d]"}
        ]}"#;
        assert_eq!(
            extract_answer(LogFormat::GeminiJson, content, &token).as_deref(),
            Some("Answer")
        );
    }
}
