//! Outgoing prompt wrapping and answer cleanup

use crate::types::{AgentConfig, RequestToken};

/// Sentence appended when the agent must not touch the working tree
pub const FILE_EDIT_CONSTRAINT: &str =
    "IMPORTANT: Do NOT create, modify, or delete any files. Only analyze and respond.";

/// Options applied while wrapping a prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptConstraints {
    /// Omit the file-edit constraint sentence
    pub allow_file_edits: bool,
    /// Replace every run of newlines with one space
    pub collapse_newlines: bool,
    /// Text placed before the raw prompt
    pub safe_prefix: Option<String>,
}

impl PromptConstraints {
    /// Constraints an agent descriptor asks for
    #[must_use]
    pub fn for_agent(config: &AgentConfig, allow_file_edits: bool) -> Self {
        Self {
            allow_file_edits,
            collapse_newlines: config.collapse_newlines,
            safe_prefix: config.safe_prefix.clone(),
        }
    }
}

/// Instruction asking the agent to end its answer with the token's marker
#[must_use]
pub fn answer_instruction(token: &RequestToken) -> String {
    format!("End your response with \"{}\"", token.answer_marker())
}

/// Wrap `raw` as `[RQ-<token>] <prompt> [<constraint>] <instruction>`
#[must_use]
pub fn build_prompt(raw: &str, token: &RequestToken, constraints: &PromptConstraints) -> String {
    let body = match &constraints.safe_prefix {
        Some(prefix) => format!("{prefix}{raw}"),
        None => raw.to_string(),
    };
    let body = if constraints.collapse_newlines {
        collapse_newlines(&body)
    } else {
        body.trim().to_string()
    };

    let mut parts = vec![format!("{} {body}", token.request_marker())];
    if !constraints.allow_file_edits {
        parts.push(FILE_EDIT_CONSTRAINT.to_string());
    }
    parts.push(answer_instruction(token));

    let separator = if constraints.collapse_newlines { " " } else { "\n\n" };
    parts.join(separator)
}

/// Replace every run of line breaks with a single space
#[must_use]
pub fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out.trim().to_string()
}

/// Remove the token's markers from an answer and trim it
#[must_use]
pub fn strip_markers(text: &str, token: &RequestToken) -> String {
    let markers = [token.answer_marker(), token.request_marker()];
    let mut out = text.to_string();
    while let Some(marker) = markers.iter().find(|m| out.contains(m.as_str())) {
        out = out.replace(marker.as_str(), "");
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_turns_runs_into_single_spaces() {
        assert_eq!(collapse_newlines("a\n\n\nb\r\nc\n"), "a b c");
    }

    #[test]
    fn strip_handles_nested_markers() {
        let token = RequestToken::new("abcd1234");
        assert_eq!(strip_markers("x [ANS-[ANS-abcd1234]abcd1234]", &token), "x");
    }
}
