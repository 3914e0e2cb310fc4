// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tear the vApp down.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind};

pub struct PreDeleteAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    clock: C,
}

impl<C: Clock> PreDeleteAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, clock: C) -> Self {
        Self { providers, clock }
    }
}

#[async_trait]
impl<C: Clock> Agent for PreDeleteAgent<C> {
    fn name(&self) -> &'static str {
        "predelete"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        appliance_jobs(store, ApplianceState::PreDelete)
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::Deleted, touch_to_deleted());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        let (provider, uri) = job
            .artifact
            .node()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .ok_or(AgentError::MissingResource("node", job.uuid))?;
        let entry = self.providers.get(&provider)?;

        entry.gateway.delete(&uri, job.token.as_ref()).await?;

        Ok(Some(Message::Deleted { uuid: job.uuid, ts: self.clock.now(), provider }))
    }
}

/// `pre_delete → deleted`: the audit trail freezes here.
fn touch_to_deleted() -> Handler {
    Box::new(|msg, store| {
        let Message::Deleted { uuid, ts, .. } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(store, *uuid, ApplianceState::Deleted, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "pre_delete_tests.rs"]
mod tests;
