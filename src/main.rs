// Command-line driver: ask agents, fan out batches, inspect and stop sessions.
//
// Sessions are named after the instance tag; pass the same --instance-tag to
// later invocations to reuse or stop sessions left alive with --keep.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tmux_agent_bridge::{
    AgentConfig, AgentHub, AgentId, AgentRegistry, HubSettings, PromptRequest, SessionNaming,
    TmuxBackend,
};

#[derive(Parser, Debug)]
#[command(name = "tmux-agent-bridge", version, about)]
struct Cli {
    /// Instance tag used in session names (random when omitted)
    #[arg(long, global = true, env = "TMUX_AGENT_BRIDGE_INSTANCE_TAG")]
    instance_tag: Option<String>,

    /// JSON file with hub settings
    #[arg(long, global = true, env = "TMUX_AGENT_BRIDGE_SETTINGS")]
    settings: Option<PathBuf>,

    /// JSON file with extra agent descriptors (an array)
    #[arg(long, global = true, env = "TMUX_AGENT_BRIDGE_AGENTS")]
    agents: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask one or more agents the same question
    Ask {
        /// Agent identity (repeatable)
        #[arg(long = "agent", short = 'a', required = true)]
        agents: Vec<String>,

        /// Working directory the agent session is bound to
        #[arg(long, env = "TMUX_AGENT_BRIDGE_WORK_DIR")]
        work_dir: Option<PathBuf>,

        /// Allow the agent to create, modify and delete files
        #[arg(long)]
        allow_file_edits: bool,

        /// Leave the sessions running afterwards
        #[arg(long)]
        keep: bool,

        /// Prompt text
        prompt: String,
    },
    /// Run independent queries over dedicated sessions in parallel
    FanOut {
        /// Agent kinds to spread queries over (repeatable)
        #[arg(long = "kind", short = 'k', default_values_t = [String::from("gemini_flash"), String::from("codex_medium")])]
        kinds: Vec<String>,

        /// Working directory for every dedicated session
        #[arg(long, env = "TMUX_AGENT_BRIDGE_WORK_DIR")]
        work_dir: Option<PathBuf>,

        /// Queries
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Show the status of every registered agent
    Status,
    /// List registered agents
    Agents,
    /// Stop an agent's session
    Stop {
        /// Agent identity
        #[arg(long = "agent", short = 'a')]
        agent: String,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<HubSettings> {
    let Some(path) = path else {
        return Ok(HubSettings::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing settings in {}", path.display()))
}

fn load_registry(path: Option<&PathBuf>) -> Result<AgentRegistry> {
    let mut registry = AgentRegistry::builtin();
    if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading agents from {}", path.display()))?;
        let configs: Vec<AgentConfig> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing agents in {}", path.display()))?;
        for config in configs {
            registry.register(config)?;
        }
    }
    Ok(registry)
}

fn resolve_work_dir(work_dir: Option<PathBuf>) -> Result<PathBuf> {
    match work_dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("resolving current directory"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;
    let registry = load_registry(cli.agents.as_ref())?;
    let naming = match &cli.instance_tag {
        Some(tag) => SessionNaming::with_tag(tag.clone()),
        None => SessionNaming::random(),
    };

    let hub = AgentHub::new(TmuxBackend::new()?, registry, settings).with_naming(naming);

    match cli.command {
        Command::Ask {
            agents,
            work_dir,
            allow_file_edits,
            keep,
            prompt,
        } => {
            let request =
                PromptRequest::new(resolve_work_dir(work_dir)?, prompt).allow_file_edits(allow_file_edits);
            let agents: Vec<AgentId> = agents.into_iter().map(AgentId::from).collect();

            let outcomes = hub.ask_many(&agents, &request).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                for outcome in &outcomes {
                    let mark = if outcome.success { "ok" } else { "failed" };
                    println!(
                        "## {} ({mark}, {}s)\n\n{}\n",
                        outcome.agent,
                        outcome.duration_ms / 1000,
                        outcome.text()
                    );
                }
            }

            if !keep {
                hub.shutdown().await;
            }
        }
        Command::FanOut {
            kinds,
            work_dir,
            queries,
        } => {
            let kinds: Vec<AgentId> = kinds.into_iter().map(AgentId::from).collect();
            let report = hub
                .fan_out(&resolve_work_dir(work_dir)?, queries, &kinds)
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
            }
        }
        Command::Status => {
            let statuses = hub.statuses().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                for status in statuses {
                    let state = if status.connected { "connected" } else { "not running" };
                    println!("{:<16} {state:<12} {}", status.agent, status.session_name);
                }
            }
        }
        Command::Agents => {
            for id in hub.registry().ids() {
                let config = hub.registry().get(&id)?;
                println!("{:<16} {}", id, config.command.join(" "));
            }
        }
        Command::Stop { agent } => {
            let agent = AgentId::from(agent);
            let stopped = hub.stop(&agent).await?;
            let name = hub.session_name(&agent);
            if stopped {
                println!("Stopped {name}");
            } else {
                println!("{name} was not running");
            }
        }
    }

    Ok(())
}
