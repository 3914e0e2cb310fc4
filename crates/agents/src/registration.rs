// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activate registrations that have a usable credential.

use crate::appliance::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{jobs_in_state, Agent, AgentError};
use async_trait::async_trait;
use stratus_core::fsm::RegistrationState;
use stratus_core::{Clock, Job, Message, MessageKind};

/// Watches registrations in `valid`. One that already carries a current
/// token is activated; one without is left for the ingress to feed.
pub struct ValidAgent<C: Clock> {
    clock: C,
}

impl<C: Clock> ValidAgent<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl<C: Clock> Agent for ValidAgent<C> {
    fn name(&self) -> &'static str {
        "registration"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        jobs_in_state(store, RegistrationState::Valid.into())
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::RegistrationActivated, touch_to_active());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        match &job.token {
            Some(token) => Ok(Some(Message::RegistrationActivated {
                uuid: job.uuid,
                ts: self.clock.now(),
                provider: token.provider.clone(),
            })),
            None => {
                tracing::info!(uuid = %job.uuid, "registration has no token yet");
                Ok(None)
            }
        }
    }
}

/// `valid → active`, plain audit entry.
fn touch_to_active() -> Handler {
    Box::new(|msg, store| {
        let Message::RegistrationActivated { uuid, ts, .. } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(store, *uuid, RegistrationState::Active, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
