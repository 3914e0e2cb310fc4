// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire NAT and firewall for routed appliances; pass the rest through.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, job_provider, Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind, Resource};
use stratus_provider::payload::{FirewallParams, NatParams, Payloads};
use stratus_provider::xml::mime;

pub struct PreOperationalAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    payloads: Payloads,
    clock: C,
}

impl<C: Clock> PreOperationalAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, clock: C) -> Result<Self, AgentError> {
        Ok(Self { providers, payloads: Payloads::new()?, clock })
    }
}

#[async_trait]
impl<C: Clock> Agent for PreOperationalAgent<C> {
    fn name(&self) -> &'static str {
        "preoperational"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        appliance_jobs(store, ApplianceState::PreOperational)
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::Operational, touch_to_operational());
        dispatcher.register(MessageKind::ResourceConstrained, touch_to_prestop());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        let provider = job_provider(&job)?;
        let ts = self.clock.now();
        let natrouted = job.artifact.catalogue_choice().map(|(_, n)| n).unwrap_or(false);

        if !natrouted {
            // Nothing to wire; the appliance is reachable as it is.
            return Ok(Some(Message::Operational {
                uuid: job.uuid,
                ts,
                provider,
                ip_int: None,
                ip_ext: None,
            }));
        }

        let sub = job
            .artifact
            .subscription
            .as_ref()
            .ok_or(AgentError::MissingResource("subscription", job.uuid))?;
        let Some(ip_ext) = sub.free().first().map(|s| s.to_string()) else {
            tracing::warn!(uuid = %job.uuid, %provider, "public IP pool exhausted");
            return Ok(Some(Message::ResourceConstrained { uuid: job.uuid, ts, provider }));
        };
        let ip_int = job
            .artifact
            .ip_address()
            .map(str::to_string)
            .ok_or(AgentError::MissingResource("private address", job.uuid))?;

        let entry = self.providers.get(&provider)?;
        let config = &entry.config;
        let interface = config.gateway.interface.as_deref().ok_or_else(|| {
            AgentError::ConfigMissing(format!("gateway interface for {provider:?}"))
        })?;

        let configure_url = format!(
            "{}/api/admin/edgeGateway/{}/action/configureServices",
            entry.gateway.base_url(),
            config.gateway.name,
        );
        let token = job.token.as_ref();

        let nat = self
            .payloads
            .nat_rules(&NatParams { interface, rx: &ip_ext, tx: &ip_int })?;
        entry
            .gateway
            .post(&configure_url, token, mime::EDGE_GATEWAY_CONFIG, nat)
            .await?;

        let description = format!("stratus appliance {ip_ext}");
        let firewall = self
            .payloads
            .firewall_rule(&FirewallParams { description: &description, ip: &ip_ext })?;
        entry
            .gateway
            .post(&configure_url, token, mime::EDGE_GATEWAY_CONFIG, firewall)
            .await?;

        Ok(Some(Message::Operational {
            uuid: job.uuid,
            ts,
            provider,
            ip_int: Some(ip_int),
            ip_ext: Some(ip_ext),
        }))
    }
}

/// `pre_operational → operational`; the routing is persisted in the same
/// transaction as the Touch, so a racing allocation loses at commit.
fn touch_to_operational() -> Handler {
    Box::new(|msg, store| {
        let Message::Operational { uuid, ts, provider, ip_int, ip_ext } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        let resources = match (ip_int, ip_ext) {
            (Some(ip_int), Some(ip_ext)) => vec![Resource::NatRouting {
                ip_int: ip_int.clone(),
                ip_ext: ip_ext.clone(),
                provider: provider.clone(),
            }],
            _ => vec![],
        };
        append_as_controller(store, *uuid, ApplianceState::Operational, *ts, resources)
    })
}

/// `pre_operational → pre_stop`: the exhaustion is visible in-band.
fn touch_to_prestop() -> Handler {
    Box::new(|msg, store| {
        let Message::ResourceConstrained { uuid, ts, .. } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(store, *uuid, ApplianceState::PreStop, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "pre_operational_tests.rs"]
mod tests;
