// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deploy with power-on.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind};
use stratus_provider::xml::mime;

const DEPLOY_BODY: &str =
    r#"<DeployVAppParams xmlns="http://www.vmware.com/vcloud/v1.5" powerOn="true"/>"#;

pub struct PreStartAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    clock: C,
}

impl<C: Clock> PreStartAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, clock: C) -> Self {
        Self { providers, clock }
    }
}

#[async_trait]
impl<C: Clock> Agent for PreStartAgent<C> {
    fn name(&self) -> &'static str {
        "prestart"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        appliance_jobs(store, ApplianceState::PreStart)
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::Running, touch_to_running());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        let (provider, uri) = job
            .artifact
            .node()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .ok_or(AgentError::MissingResource("node", job.uuid))?;
        let entry = self.providers.get(&provider)?;

        entry
            .gateway
            .post(
                &format!("{uri}/action/deploy"),
                job.token.as_ref(),
                mime::DEPLOY_PARAMS,
                DEPLOY_BODY.to_string(),
            )
            .await?;

        Ok(Some(Message::Running { uuid: job.uuid, ts: self.clock.now(), provider }))
    }
}

/// `pre_start → running`.
fn touch_to_running() -> Handler {
    Box::new(|msg, store| {
        let Message::Running { uuid, ts, .. } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(store, *uuid, ApplianceState::Running, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "pre_start_tests.rs"]
mod tests;
