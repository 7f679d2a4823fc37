//! Agent registry
//!
//! Maps logical agent identities to their descriptors.

use std::collections::HashMap;

use crate::config::builtin_agents;
use crate::error::{BridgeError, Result};
use crate::types::{AgentConfig, AgentId};

/// Known agents by identity
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, AgentConfig>,
}

impl AgentRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in Codex, Gemini and Claude descriptors
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for config in builtin_agents() {
            registry.agents.insert(config.name.clone(), config);
        }
        registry
    }

    /// Add or replace a descriptor
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the descriptor fails validation
    pub fn register(&mut self, config: AgentConfig) -> Result<()> {
        config.validate()?;
        let name = config.name.clone();
        if self.agents.insert(name.clone(), config).is_some() {
            log::debug!("Replaced descriptor for {name}");
        }
        Ok(())
    }

    /// Descriptor of `agent`
    ///
    /// # Errors
    /// Returns `UnknownAgent` if nothing is registered under that identity
    pub fn get(&self, agent: &AgentId) -> Result<&AgentConfig> {
        self.agents
            .get(agent)
            .ok_or_else(|| BridgeError::unknown_agent(agent.as_str()))
    }

    /// Registered identities, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// TRUE if no agent is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
