// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Undeploy with power-off.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind};
use stratus_provider::xml::mime;

const UNDEPLOY_BODY: &str = r#"<UndeployVAppParams xmlns="http://www.vmware.com/vcloud/v1.5">
  <UndeployPowerAction>powerOff</UndeployPowerAction>
</UndeployVAppParams>"#;

pub struct PreStopAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    clock: C,
}

impl<C: Clock> PreStopAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, clock: C) -> Self {
        Self { providers, clock }
    }
}

#[async_trait]
impl<C: Clock> Agent for PreStopAgent<C> {
    fn name(&self) -> &'static str {
        "prestop"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        appliance_jobs(store, ApplianceState::PreStop)
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::Stopped, touch_to_stopped());
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
                &format!("{uri}/action/undeploy"),
                job.token.as_ref(),
                mime::UNDEPLOY_PARAMS,
                UNDEPLOY_BODY.to_string(),
            )
            .await?;

        Ok(Some(Message::Stopped { uuid: job.uuid, ts: self.clock.now(), provider }))
    }
}

/// `pre_stop → stopped`.
fn touch_to_stopped() -> Handler {
    Box::new(|msg, store| {
        let Message::Stopped { uuid, ts, .. } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(store, *uuid, ApplianceState::Stopped, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "pre_stop_tests.rs"]
mod tests;
