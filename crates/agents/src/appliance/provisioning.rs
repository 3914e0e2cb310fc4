// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Give the customisation script time to land, then schedule a check.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, Agent, AgentError};
use async_trait::async_trait;
use chrono::Duration;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind};

/// Seconds an appliance must sit in `provisioning` before it is checked.
const GRACE_SECS: i64 = 20;

pub struct ProvisioningAgent<C: Clock> {
    clock: C,
}

impl<C: Clock> ProvisioningAgent<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl<C: Clock> Agent for ProvisioningAgent<C> {
    fn name(&self) -> &'static str {
        "provisioning"
    }

    /// Appliances in `provisioning` whose last Touch is at least the
    /// grace period old.
    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        let then = self.clock.now() - Duration::seconds(GRACE_SECS);
        appliance_jobs(store, ApplianceState::Provisioning)
            .into_iter()
            .filter(|job| job.artifact.last_at().is_some_and(|at| at < then))
            .collect()
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::CheckRequired, touch_to_precheck());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        Ok(Some(Message::CheckRequired { uuid: job.uuid, ts: self.clock.now() }))
    }
}

/// `provisioning → pre_check`, plain audit entry.
fn touch_to_precheck() -> Handler {
    Box::new(|msg, store| {
        let Message::CheckRequired { uuid, ts } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(store, *uuid, ApplianceState::PreCheck, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "provisioning_tests.rs"]
mod tests;
