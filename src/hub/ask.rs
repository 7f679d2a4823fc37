//! Session setup, correlated prompts, and stop

use std::path::Path;
use std::time::Instant;

use futures::future::join_all;

use crate::correlate::{AgentSource, Correlator};
use crate::detect::ReadinessProbe;
use crate::error::Result;
use crate::terminal::TerminalBackend;
use crate::types::{
    AgentConfig, AgentId, PendingEvent, PromptOutcome, PromptRequest, RequestToken, SessionName,
};

use super::core::AgentHub;

impl<B: TerminalBackend + 'static> AgentHub<B> {
    /// Make sure `config`'s session is alive and ready, creating it if needed
    ///
    /// A session that never becomes ready is destroyed again.
    ///
    /// # Errors
    /// Returns `ReadyTimeout` or a session manager error
    pub async fn ensure_session(&self, config: &AgentConfig, work_dir: &Path) -> Result<SessionName> {
        let name = self.session_name(&config.name);
        if self.manager.exists(&name).await {
            return Ok(name);
        }

        self.manager.create(&name, work_dir, &config.command).await?;
        let ready = ReadinessProbe::for_agent(config)
            .wait(&*self.manager, &name, config.ready_timeout())
            .await;

        if let Err(e) = ready {
            if let Err(destroy_err) = self.manager.destroy(&name).await {
                log::warn!("[{name}] Failed to clean up unready session: {destroy_err}");
            }
            return Err(e);
        }
        Ok(name)
    }

    /// Ask `agent` one correlated question
    ///
    /// Never fails: every error ends up in the returned outcome and as an
    /// `error` event on the agent's queue.
    pub async fn ask(&self, agent: &AgentId, request: &PromptRequest) -> PromptOutcome {
        let started = Instant::now();
        let session_name = self.session_name(agent);
        let mut token: Option<RequestToken> = None;

        let result = self.ask_inner(agent, request, &session_name, &mut token).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let request_id = token.map(|t| t.as_str().to_string());

        match result {
            Ok(answer) => {
                self.manager.touch(&session_name);
                self.events.push(agent, PendingEvent::message_complete(answer.clone()));
                log::info!("[{session_name}] Answer received in {duration_ms}ms");
                PromptOutcome {
                    agent: agent.clone(),
                    session_name,
                    success: true,
                    response: Some(answer),
                    error: None,
                    request_id,
                    duration_ms,
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.events.push(agent, PendingEvent::error(message.clone()));
                log::error!("[{session_name}] Request failed: {message}");
                PromptOutcome {
                    agent: agent.clone(),
                    session_name,
                    success: false,
                    response: None,
                    error: Some(message),
                    request_id,
                    duration_ms,
                }
            }
        }
    }

    async fn ask_inner(
        &self,
        agent: &AgentId,
        request: &PromptRequest,
        session_name: &SessionName,
        token: &mut Option<RequestToken>,
    ) -> Result<String> {
        let config = self.registry.get(agent)?;
        let correlator =
            Correlator::new(&*self.manager).with_interval(self.settings.response_poll());

        let (submission, session_dir) = {
            let gate = self.submit_gate(session_name);
            let _turn = gate.lock().await;
            self.ensure_session(config, &request.work_dir).await?;

            // A reused session keeps the directory it was opened in, and so do its logs
            let session_dir = match self.manager.get(session_name) {
                Some(session) => session.work_dir,
                None => request.work_dir.clone(),
            };
            if session_dir != request.work_dir {
                log::debug!(
                    "[{session_name}] Reusing session opened in {}, not {}",
                    session_dir.display(),
                    request.work_dir.display()
                );
            }

            let submission = correlator
                .submit(session_name, config, &request.prompt, request.allow_file_edits)
                .await?;
            (submission, session_dir)
        };
        *token = Some(submission.token.clone());

        let source = AgentSource::for_agent(
            config,
            &*self.manager,
            session_name,
            &session_dir,
            self.settings.log_home.as_deref(),
        )?;
        correlator
            .await_response(
                session_name,
                &submission.token,
                submission.since,
                &source,
                config.timeout(),
            )
            .await
    }

    /// Ask several agents the same question concurrently
    pub async fn ask_many(&self, agents: &[AgentId], request: &PromptRequest) -> Vec<PromptOutcome> {
        join_all(agents.iter().map(|agent| self.ask(agent, request))).await
    }

    /// Destroy `agent`'s session and drop its queued events
    ///
    /// Returns TRUE if a live session was torn down.
    ///
    /// # Errors
    /// Returns `Backend` if the live session cannot be killed
    pub async fn stop(&self, agent: &AgentId) -> Result<bool> {
        let name = self.session_name(agent);
        let alive = self.manager.exists(&name).await;
        self.manager.destroy(&name).await?;
        self.events.clear(agent);
        self.submit_gates.lock().remove(&name);
        Ok(alive)
    }
}
