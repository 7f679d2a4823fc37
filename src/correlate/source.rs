//! Where answers are looked for

use std::future::Future;
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;
use crate::manager::SessionManager;
use crate::terminal::TerminalBackend;
use crate::types::{AgentConfig, RequestToken, ResponseDetection, SessionName};

use super::logs::LogDirSource;
use super::prompt::{answer_instruction, strip_markers};

/// Screen lines returned when no prompt boundary precedes the marker
pub const SCREEN_FALLBACK_LINES: usize = 50;

/// Something that can be searched for a token's answer
pub trait ResponseSource: Send + Sync {
    /// Look once for the answer to `token`, for a request started at `since`
    ///
    /// # Errors
    /// Returns error if the source itself is unreachable (e.g. the session is gone)
    fn scan_for_token(
        &self,
        token: &RequestToken,
        since: SystemTime,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

// ============================================================================
// Screen fallback
// ============================================================================

/// Pull the answer out of captured screen text
///
/// Only text below the last visible echo of the request is considered, up to
/// the first completion marker, so the echoed prompt (which mentions the
/// answer marker) and later turns are never mistaken for the answer. When
/// that echo has scrolled away the answer marker itself must be on screen.
#[must_use]
pub fn extract_from_screen(
    screen: &str,
    token: &RequestToken,
    completion_marker: &str,
    boundary_patterns: &[String],
) -> Option<String> {
    if completion_marker.is_empty() {
        return None;
    }

    let lines: Vec<&str> = screen.lines().collect();
    let request_marker = token.request_marker();
    let instruction = answer_instruction(token);
    let answer_marker = token.answer_marker();

    let echo_end = lines
        .iter()
        .rposition(|l| l.contains(request_marker.as_str()) || l.contains(instruction.as_str()));
    let region = match echo_end {
        Some(idx) => &lines[idx + 1..],
        None => &lines[..],
    };

    // The turn answering this request ends at the first marker below its echo
    let marker_line = match echo_end {
        Some(_) => region.iter().position(|l| l.contains(completion_marker))?,
        None => {
            let answer_at = region.iter().rposition(|l| l.contains(answer_marker.as_str()))?;
            answer_at
                + region[answer_at..]
                    .iter()
                    .position(|l| l.contains(completion_marker))?
        }
    };
    let mut above: Vec<&str> = region[..marker_line].to_vec();
    if let Some(before) = region[marker_line].split(completion_marker).next()
        && !before.trim().is_empty()
    {
        above.push(before);
    }

    let start = above
        .iter()
        .rposition(|l| boundary_patterns.iter().any(|p| !p.is_empty() && l.contains(p.as_str())))
        .map(|idx| idx + 1)
        .filter(|&idx| idx < above.len())
        .unwrap_or_else(|| above.len().saturating_sub(SCREEN_FALLBACK_LINES));

    let text = above[start..].join("\n");
    if echo_end.is_none() && !text.contains(answer_marker.as_str()) {
        return None;
    }

    let cleaned = strip_markers(&text, token);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Screen-scanning response source
pub struct ScreenSource<'a, B> {
    manager: &'a SessionManager<B>,
    session: SessionName,
    completion_marker: String,
    boundary_patterns: Vec<String>,
}

impl<'a, B: TerminalBackend> ScreenSource<'a, B> {
    /// Scan `session` for `completion_marker`
    pub fn new(
        manager: &'a SessionManager<B>,
        session: SessionName,
        completion_marker: impl Into<String>,
        boundary_patterns: Vec<String>,
    ) -> Self {
        Self {
            manager,
            session,
            completion_marker: completion_marker.into(),
            boundary_patterns,
        }
    }
}

impl<B: TerminalBackend> ResponseSource for ScreenSource<'_, B> {
    async fn scan_for_token(&self, token: &RequestToken, _since: SystemTime) -> Result<Option<String>> {
        let screen = self.manager.capture_screen(&self.session).await?;
        Ok(extract_from_screen(
            &screen,
            token,
            &self.completion_marker,
            &self.boundary_patterns,
        ))
    }
}

// ============================================================================
// Per-agent selection
// ============================================================================

/// Response source chosen from an agent's detection mode
pub enum AgentSource<'a, B> {
    /// Structured log files
    Log(LogDirSource),
    /// Rendered screen
    Screen(ScreenSource<'a, B>),
}

impl<'a, B: TerminalBackend> AgentSource<'a, B> {
    /// Source for `config`
    ///
    /// Log locations resolve against `work_dir` (the directory the session
    /// runs in) and `log_home`, or the user's home directory when `None`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if a log location cannot be resolved
    pub fn for_agent(
        config: &AgentConfig,
        manager: &'a SessionManager<B>,
        session: &SessionName,
        work_dir: &Path,
        log_home: Option<&Path>,
    ) -> Result<Self> {
        match &config.detection {
            ResponseDetection::StructuredLog { location } => {
                let source = match log_home {
                    Some(home) => LogDirSource::from_location_in_home(location, work_dir, home),
                    None => LogDirSource::from_location(location, work_dir)?,
                };
                Ok(Self::Log(source))
            }
            ResponseDetection::Marker {
                completion_marker,
                boundary_patterns,
            } => Ok(Self::Screen(ScreenSource::new(
                manager,
                session.clone(),
                completion_marker.clone(),
                boundary_patterns.clone(),
            ))),
        }
    }
}

impl<B: TerminalBackend> ResponseSource for AgentSource<'_, B> {
    async fn scan_for_token(&self, token: &RequestToken, since: SystemTime) -> Result<Option<String>> {
        match self {
            Self::Log(source) => source.scan_for_token(token, since).await,
            Self::Screen(source) => source.scan_for_token(token, since).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundaries() -> Vec<String> {
        vec!["Soru:".to_string(), ">>>".to_string()]
    }

    #[test]
    fn screen_answer_follows_request_echo() {
        let token = RequestToken::new("1234abcd");
        let screen = "old answer\n◆END◆\n[RQ-1234abcd] Soru: what?\n\nEnd your response with \"[ANS-1234abcd]\"\nIt is 42. [ANS-1234abcd]\n◆END◆\n> ";
        assert_eq!(
            extract_from_screen(screen, &token, "◆END◆", &boundaries()).as_deref(),
            Some("It is 42.")
        );
    }

    #[test]
    fn stale_marker_is_ignored_while_answer_pending() {
        let token = RequestToken::new("1234abcd");
        let screen = "old answer\n◆END◆\n[RQ-1234abcd] Soru: what?\nEnd your response with \"[ANS-1234abcd]\"\nthinking";
        assert_eq!(extract_from_screen(screen, &token, "◆END◆", &boundaries()), None);
    }

    #[test]
    fn scrolled_echo_requires_answer_marker() {
        let token = RequestToken::new("1234abcd");
        assert_eq!(extract_from_screen(">>> q\nanswer\n◆END◆", &token, "◆END◆", &boundaries()), None);
        assert_eq!(
            extract_from_screen(">>> q\nanswer [ANS-1234abcd]\n◆END◆", &token, "◆END◆", &boundaries())
                .as_deref(),
            Some("answer")
        );
    }

    #[test]
    fn later_turns_do_not_leak_into_answer() {
        let token = RequestToken::new("1234abcd");
        let screen = "[RQ-1234abcd] first\nEnd your response with \"[ANS-1234abcd]\"\nOne. [ANS-1234abcd]\n◆END◆\n[RQ-99990000] second\nTwo. [ANS-99990000]\n◆END◆";
        assert_eq!(
            extract_from_screen(screen, &token, "◆END◆", &boundaries()).as_deref(),
            Some("One.")
        );
    }
}
