//! Tests for parallel fan-out over dedicated sessions

mod common;

use std::path::Path;

use tmux_agent_bridge::{
    AgentHub, AgentId, AgentRegistry, BridgeError, HubSettings, SessionNaming,
};

fn hub_with(settings: HubSettings) -> AgentHub<tmux_agent_bridge::MemoryBackend> {
    let mut registry = AgentRegistry::new();
    registry.register(common::screen_agent("alpha")).unwrap();
    registry.register(common::screen_agent("beta")).unwrap();
    AgentHub::new(common::echo_backend(), registry, settings)
        .with_naming(SessionNaming::with_tag("fan1"))
}

fn kinds() -> Vec<AgentId> {
    vec![AgentId::new("alpha"), AgentId::new("beta")]
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_isolated_and_sessions_are_cleaned_up() {
    common::init_logging();
    let hub = hub_with(HubSettings::default());
    let queries = vec![
        "What is 2+2?".to_string(),
        "CRASH now".to_string(),
        "Name a prime".to_string(),
    ];

    let report = hub.fan_out(Path::new("/work"), queries, &kinds()).await.unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.dropped, 0);

    let agents: Vec<&str> = report.entries.iter().map(|e| e.agent.as_str()).collect();
    assert_eq!(agents, vec!["alpha", "alpha", "beta"]);

    let crashed = &report.entries[1];
    assert!(!crashed.is_success());
    assert!(
        crashed
            .error
            .as_deref()
            .is_some_and(|e| e.contains("terminated by user"))
    );
    for entry in report.entries.iter().filter(|e| e.is_success()) {
        assert!(entry.response.as_deref().is_some_and(|r| r.starts_with("Answer to ")));
    }

    let names: Vec<&str> = report.entries.iter().map(|e| e.session_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "agents_fan1_parallel_alpha_0",
            "agents_fan1_parallel_alpha_1",
            "agents_fan1_parallel_beta_0",
        ]
    );

    assert!(hub.manager().backend().live_sessions().is_empty());
    assert!(hub.manager().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_batch_is_capped() {
    let hub = hub_with(HubSettings::default());
    let queries: Vec<String> = (0..6).map(|i| format!("Question {i}")).collect();

    let report = hub.fan_out(Path::new("/work"), queries, &kinds()).await.unwrap();

    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.succeeded(), 4);
    let queries: Vec<&str> = report.entries.iter().map(|e| e.query.as_str()).collect();
    assert_eq!(queries, vec!["Question 0", "Question 1", "Question 2", "Question 3"]);
    assert!(hub.manager().backend().live_sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unready_slot_fails_alone() {
    let mut settings = HubSettings::default();
    settings.fan_out_ready_timeout_ms = 2_000;

    let mut registry = AgentRegistry::new();
    registry.register(common::screen_agent("alpha")).unwrap();
    let mut mute = common::screen_agent("mute");
    mute.command = vec!["mute-agent".to_string()];
    registry.register(mute).unwrap();
    let hub = AgentHub::new(common::echo_backend(), registry, settings);

    let report = hub
        .fan_out(
            Path::new("/work"),
            vec!["one".to_string(), "two".to_string()],
            &[AgentId::new("alpha"), AgentId::new("mute")],
        )
        .await
        .unwrap();

    assert!(report.entries[0].is_success());
    assert!(
        report.entries[1]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("ready timeout"))
    );
    assert!(hub.manager().backend().live_sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rendered_report() {
    let hub = hub_with(HubSettings::default());
    let report = hub
        .fan_out(
            Path::new("/work"),
            vec!["first".to_string(), "CRASH".to_string()],
            &kinds(),
        )
        .await
        .unwrap();

    let rendered = report.render();
    assert!(rendered.starts_with("2 queries (1 alpha + 1 beta) | 1 succeeded | 1 failed"));
    assert!(rendered.contains("## Query 1 [alpha]: first\n\nAnswer to "));
    assert!(rendered.contains("## Query 2 [beta]: CRASH\n\nError: "));
}

#[tokio::test]
async fn test_invalid_fan_out_requests() {
    let hub = hub_with(HubSettings::default());

    let err = hub
        .fan_out(Path::new("/work"), vec!["q".to_string()], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfig(_)));

    let err = hub
        .fan_out(Path::new("/work"), vec!["q".to_string()], &[AgentId::new("nobody")])
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnknownAgent(_)));
}
