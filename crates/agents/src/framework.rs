// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent contract and the pieces every agent shares.

use crate::dispatch::Dispatcher;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Job, Message};
use stratus_provider::{Gateway, GatewayError, ProviderConfig};
use stratus_store::Store;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum AgentError {
    /// No matching provider, template, or catalogue entry. The job is
    /// dropped for this tick and retried later.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("payload: {0}")]
    Payload(#[from] stratus_provider::payload::PayloadError),

    #[error("reply was not XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// An element the flow needs was absent from the reply.
    #[error("element not found: {0}")]
    Semantic(&'static str),

    #[error("ingress I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("job for {1} carries no {0}")]
    MissingResource(&'static str, uuid::Uuid),
}

/// One configured provider: its settings and the gateway to reach it.
pub struct ProviderEntry {
    pub config: ProviderConfig,
    pub gateway: Arc<dyn Gateway>,
}

/// Everything the agents know about the outside world, keyed by the
/// provider name subscriptions reference.
#[derive(Default)]
pub struct ProviderDirectory {
    entries: HashMap<String, ProviderEntry>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, config: ProviderConfig, gateway: Arc<dyn Gateway>) {
        self.entries.insert(config.name().to_string(), ProviderEntry { config, gateway });
    }

    pub fn get(&self, provider: &str) -> Result<&ProviderEntry, AgentError> {
        self.entries
            .get(provider)
            .ok_or_else(|| AgentError::ConfigMissing(format!("provider {provider:?}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// A named worker bound to one trigger state.
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Pure query: artifacts currently in this agent's trigger state,
    /// each wrapped as a Job with its token and snapshot.
    fn jobs(&self, store: &Store) -> Vec<Job>;

    /// Register this agent's message handlers at boot.
    fn callbacks(&self, dispatcher: &mut Dispatcher);

    /// Act on one job. `Ok(None)` means nothing to report this tick.
    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError>;

    /// Long-lived worker: blocks on the work channel until the scheduler
    /// closes it. A failed job is logged and abandoned for this tick; the
    /// scheduler's pending deadline re-offers it.
    async fn run(&self, mut work: mpsc::Receiver<Job>, out: mpsc::Sender<Message>) {
        tracing::info!(agent = self.name(), "activated");
        while let Some(job) = work.recv().await {
            let uuid = job.uuid;
            match self.process(job).await {
                Ok(Some(msg)) => {
                    tracing::debug!(agent = self.name(), %uuid, message = msg.name(), "emitting");
                    if out.send(msg).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(agent = self.name(), %uuid, error = %e, "job failed");
                }
            }
        }
        tracing::info!(agent = self.name(), "work channel closed");
    }
}

/// Shared `jobs()` body: artifacts whose latest Touch is `state`, with
/// the token-currency rule applied. A missing token is a warning, not a
/// stop: the agent proceeds without credentials.
pub(crate) fn appliance_jobs(store: &Store, state: ApplianceState) -> Vec<Job> {
    jobs_in_state(store, state.into())
}

pub(crate) fn jobs_in_state(store: &Store, state: stratus_core::State) -> Vec<Job> {
    store
        .artifacts_in_state(state)
        .into_iter()
        .filter_map(|artifact| {
            let snapshot = store.snapshot_with_pool(artifact.uuid)?;
            let token = store.token_for(artifact.uuid);
            if token.is_none() {
                tracing::warn!(uuid = %artifact.uuid, "no provider token; proceeding without credentials");
            }
            Some(Job { uuid: artifact.uuid, token, artifact: snapshot })
        })
        .collect()
}

/// Provider a job belongs to: the subscription's provider when the
/// snapshot carries one, else the provider of the newest Node resource.
pub(crate) fn job_provider(job: &Job) -> Result<String, AgentError> {
    if let Some(sub) = &job.artifact.subscription {
        return Ok(sub.provider.clone());
    }
    job.artifact
        .node()
        .map(|(provider, _)| provider.to_string())
        .ok_or(AgentError::MissingResource("provider", job.uuid))
}

#[cfg(test)]
#[path = "framework_tests.rs"]
mod tests;
