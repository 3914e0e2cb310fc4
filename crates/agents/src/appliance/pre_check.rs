// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetch the vApp description and decide what the appliance really is.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind, Resource};
use stratus_provider::xml::{self, mime};

/// A customisation script longer than this many lines is taken as fully
/// installed.
const SCRIPT_LINES_INSTALLED: usize = 5;

pub struct PreCheckAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    clock: C,
}

impl<C: Clock> PreCheckAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, clock: C) -> Self {
        Self { providers, clock }
    }
}

/// What one vApp description boils down to.
struct Verdict {
    creation: Option<String>,
    ip: Option<String>,
    installed: bool,
}

/// The decision rule, pure over the reply body so it can be tested
/// without a gateway.
///
/// 1. `creation` starts `"unknown"`.
/// 2. No customisation script element → still provisioning, null IP.
/// 3. No network connection → `creation = "undeployed"`; otherwise the
///    IP is the text of its `IpAddress` child.
/// 4. A script of more than five lines (after unescaping) means the
///    customisation is in place.
/// 5. `deployed="true"` on the vApp overrides `creation` to
///    `"deployed"`.
fn examine(doc: &roxmltree::Document<'_>) -> Option<Verdict> {
    let mut creation = "unknown".to_string();

    let section = xml::first_by_type(doc, mime::GUEST_CUSTOMIZATION, &[])
        .or_else(|| xml::first_tag(doc, "GuestCustomizationSection"))?;
    let script = xml::child_text(section, "CustomizationScript").unwrap_or("");

    let ip = match xml::first_tag(doc, "NetworkConnection") {
        None => {
            creation = "undeployed".to_string();
            None
        }
        Some(conn) => xml::child_text(conn, "IpAddress").map(str::to_string),
    };

    let installed = xml::unescape_script(script).lines().count() > SCRIPT_LINES_INSTALLED;

    if xml::first_tag(doc, "VApp")
        .and_then(|v| v.attribute("deployed"))
        .is_some_and(|d| d == "true")
    {
        creation = "deployed".to_string();
    }

    Some(Verdict { creation: Some(creation), ip, installed })
}

#[async_trait]
impl<C: Clock> Agent for PreCheckAgent<C> {
    fn name(&self) -> &'static str {
        "precheck"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        appliance_jobs(store, ApplianceState::PreCheck)
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::CheckedAsOperational, touch_to_operational());
        dispatcher.register(MessageKind::CheckedAsPreOperational, touch_to_preoperational());
        dispatcher.register(MessageKind::CheckedAsProvisioning, touch_to_provisioning());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        let (provider, uri) = job
            .artifact
            .node()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .ok_or(AgentError::MissingResource("node", job.uuid))?;
        let entry = self.providers.get(&provider)?;

        let body = entry.gateway.get(&uri, job.token.as_ref()).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let ts = self.clock.now();

        let Some(verdict) = examine(&doc) else {
            // Script element absent: the appliance is still provisioning.
            return Ok(Some(Message::CheckedAsProvisioning {
                uuid: job.uuid,
                ts,
                provider,
                ip: None,
                creation: Some("unknown".to_string()),
                power: None,
                health: None,
            }));
        };

        let msg = if !verdict.installed {
            Message::CheckedAsProvisioning {
                uuid: job.uuid,
                ts,
                provider,
                ip: verdict.ip,
                creation: verdict.creation,
                power: None,
                health: None,
            }
        } else if job.artifact.was_operational() {
            Message::CheckedAsOperational {
                uuid: job.uuid,
                ts,
                provider,
                ip: verdict.ip,
                creation: verdict.creation,
                power: None,
                health: None,
            }
        } else {
            Message::CheckedAsPreOperational {
                uuid: job.uuid,
                ts,
                provider,
                ip: verdict.ip,
                creation: verdict.creation,
                power: None,
                health: None,
            }
        };
        Ok(Some(msg))
    }
}

fn report_resources(
    provider: &str,
    ip: &Option<String>,
    creation: &Option<String>,
    power: &Option<String>,
    health: &Option<String>,
) -> Vec<Resource> {
    let mut resources = vec![Resource::ProviderReport {
        creation: creation.clone(),
        power: power.clone(),
        health: health.clone(),
        provider: provider.to_string(),
    }];
    if let Some(ip) = ip {
        resources.push(Resource::IpAddress {
            value: ip.clone(),
            provider: provider.to_string(),
        });
    }
    resources
}

/// `pre_check → operational`, with the report (and IP, when seen).
fn touch_to_operational() -> Handler {
    Box::new(|msg, store| {
        let Message::CheckedAsOperational { uuid, ts, provider, ip, creation, power, health } =
            msg
        else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(
            store,
            *uuid,
            ApplianceState::Operational,
            *ts,
            report_resources(provider, ip, creation, power, health),
        )
    })
}

/// `pre_check → pre_operational`.
fn touch_to_preoperational() -> Handler {
    Box::new(|msg, store| {
        let Message::CheckedAsPreOperational { uuid, ts, provider, ip, creation, power, health } =
            msg
        else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(
            store,
            *uuid,
            ApplianceState::PreOperational,
            *ts,
            report_resources(provider, ip, creation, power, health),
        )
    })
}

/// `pre_check → provisioning`: the check found work still in progress.
fn touch_to_provisioning() -> Handler {
    Box::new(|msg, store| {
        let Message::CheckedAsProvisioning { uuid, ts, provider, ip, creation, power, health } =
            msg
        else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(
            store,
            *uuid,
            ApplianceState::Provisioning,
            *ts,
            report_resources(provider, ip, creation, power, health),
        )
    })
}

#[cfg(test)]
#[path = "pre_check_tests.rs"]
mod tests;
