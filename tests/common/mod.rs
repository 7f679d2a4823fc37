//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::time::Duration;

use tmux_agent_bridge::{
    AgentConfig, InjectionStrategy, MemoryBackend, Reaction, RequestToken, SessionName,
};

/// Launch command of the scripted agent
pub const ECHO_AGENT: &str = "echo-agent";

/// End-of-turn glyph printed by the scripted agent
pub const END_GLYPH: &str = "◆END◆";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Token of the `[RQ-...]` marker in a submitted line
pub fn token_in(line: &str) -> Option<RequestToken> {
    let start = line.find("[RQ-")? + 4;
    let token = line.get(start..start + 8)?;
    Some(RequestToken::new(token))
}

/// Screen-detected agent launched with [`ECHO_AGENT`]
pub fn screen_agent(name: &str) -> AgentConfig {
    AgentConfig::builder(name, vec![ECHO_AGENT])
        .ready_patterns(vec!["READY"])
        .screen_marker(END_GLYPH, vec![">>>"])
        .injection(InjectionStrategy::BulkPaste)
        .ready_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()
}

/// Reaction of a well-behaved scripted agent
///
/// Prints `READY` at launch, answers every correlated prompt, exits on
/// prompts containing `CRASH` and stays silent on prompts containing `HANG`.
pub fn echo_reaction(_session: &SessionName, line: &str) -> Reaction {
    if line.trim() == ECHO_AGENT {
        return Reaction::Print("READY\n>>> ".to_string());
    }
    if line.contains("CRASH") {
        return Reaction::Exit;
    }
    if line.contains("HANG") {
        return Reaction::Nothing;
    }
    match token_in(line) {
        Some(token) => Reaction::Print(format!(
            "Answer to {token}\n{}\n{END_GLYPH}",
            token.answer_marker()
        )),
        None => Reaction::Nothing,
    }
}

/// Backend running [`echo_reaction`] in every session
pub fn echo_backend() -> MemoryBackend {
    MemoryBackend::with_responder(echo_reaction)
}
