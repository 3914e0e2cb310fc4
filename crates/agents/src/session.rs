// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token ingress: named-pipe records in, bearer headers out.
//!
//! The web front-end drops `(registration, provider, user, pass)` records
//! onto a per-provider pipe. This agent performs the session POST and
//! emits the resulting header as a `TokenReceived` message; it never
//! receives jobs from the scheduler.

use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::fsm::RegistrationState;
use stratus_core::{Clock, Job, Message, MessageKind, Resource, Touch};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use uuid::Uuid;

const POLL: Duration = Duration::from_secs(1);

/// One line on the pipe, JSON-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub registration: Uuid,
    pub provider: String,
    pub user: String,
    pub pass: String,
}

pub struct SessionAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    pipe: PathBuf,
    clock: C,
}

impl<C: Clock> SessionAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, pipe: PathBuf, clock: C) -> Self {
        Self { providers, pipe, clock }
    }

    /// Read records past the ones already consumed, acquire a session for
    /// each, and emit the tokens.
    async fn drain_pipe(
        &self,
        consumed: &mut usize,
        out: &mpsc::Sender<Message>,
    ) -> Result<(), AgentError> {
        let file = tokio::fs::File::open(&self.pipe).await?;
        let mut lines = tokio::io::BufReader::new(file).lines();
        let mut seen = 0usize;
        while let Some(line) = lines.next_line().await? {
            seen += 1;
            if seen <= *consumed || line.trim().is_empty() {
                continue;
            }
            *consumed = seen;
            let record: TokenRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable token record");
                    continue;
                }
            };
            let entry = match self.providers.get(&record.provider) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::error!(error = %e, "token record for unconfigured provider");
                    continue;
                }
            };
            match entry.gateway.session(&record.user, &record.pass).await {
                Ok((key, value)) => {
                    let msg = Message::TokenReceived {
                        uuid: record.registration,
                        ts: self.clock.now(),
                        provider: record.provider,
                        key,
                        value,
                    };
                    if out.send(msg).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(uuid = %record.registration, error = %e, "session failed");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> Agent for SessionAgent<C> {
    fn name(&self) -> &'static str {
        "session"
    }

    /// The ingress has no trigger state.
    fn jobs(&self, _store: &stratus_store::Store) -> Vec<Job> {
        Vec::new()
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::TokenReceived, touch_token_received());
    }

    async fn process(&self, _job: Job) -> Result<Option<Message>, AgentError> {
        Ok(None)
    }

    async fn run(&self, mut work: mpsc::Receiver<Job>, out: mpsc::Sender<Message>) {
        tracing::info!(agent = self.name(), pipe = %self.pipe.display(), "activated");
        let mut consumed = 0usize;
        loop {
            if let Err(e) = self.drain_pipe(&mut consumed, &out).await {
                tracing::debug!(error = %e, pipe = %self.pipe.display(), "pipe not readable");
            }
            // Closure of the work channel is the shutdown signal.
            tokio::select! {
                job = work.recv() => {
                    if job.is_none() {
                        break;
                    }
                }
                () = tokio::time::sleep(POLL) => {}
            }
        }
        tracing::info!(agent = self.name(), "work channel closed");
    }
}

/// Attach the credential and mark the registration active.
///
/// The Touch is appended as the registration's own first actor, not the
/// controller: the token-currency rule finds a user's newest credential
/// by Touch actor.
fn touch_token_received() -> Handler {
    Box::new(|msg, store| {
        let Message::TokenReceived { uuid, ts, provider, key, value } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        let actor = store
            .first_actor(*uuid)
            .ok_or(DispatchError::UnknownTarget { name: msg.name(), uuid: *uuid })?
            .to_string();
        let touch = Touch::new(*uuid, actor, RegistrationState::Active, *ts).with(
            Resource::ProviderToken {
                key: key.clone(),
                value: value.clone(),
                provider: provider.clone(),
            },
        );
        Ok(store.append(touch)?)
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
