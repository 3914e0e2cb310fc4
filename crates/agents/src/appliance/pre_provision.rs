// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compose a vApp from the chosen template in the configured VDC network.

use super::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{appliance_jobs, job_provider, Agent, AgentError, ProviderDirectory};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::fsm::ApplianceState;
use stratus_core::{Clock, Job, Message, MessageKind, Resource};
use stratus_provider::payload::{ComposeParams, NameDescription, NameHref, Payloads};
use stratus_provider::xml::{self, mime};

pub struct PreProvisionAgent<C: Clock> {
    providers: Arc<ProviderDirectory>,
    payloads: Payloads,
    clock: C,
}

impl<C: Clock> PreProvisionAgent<C> {
    pub fn new(providers: Arc<ProviderDirectory>, clock: C) -> Result<Self, AgentError> {
        Ok(Self { providers, payloads: Payloads::new()?, clock })
    }
}

#[async_trait]
impl<C: Clock> Agent for PreProvisionAgent<C> {
    fn name(&self) -> &'static str {
        "preprovision"
    }

    fn jobs(&self, store: &stratus_store::Store) -> Vec<Job> {
        appliance_jobs(store, ApplianceState::PreProvision)
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::Provisioning, touch_to_provisioning());
    }

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        let provider = job_provider(&job)?;
        let entry = self.providers.get(&provider)?;
        let config = &entry.config;
        let gateway = &entry.gateway;
        let token = job.token.as_ref();

        let (label_name, label_description) = job
            .artifact
            .label()
            .ok_or(AgentError::MissingResource("label", job.uuid))?;
        let (image, _natrouted) = job
            .artifact
            .catalogue_choice()
            .ok_or(AgentError::MissingResource("catalogue choice", job.uuid))?;

        // Walk the link graph: org list → org → (vdc, catalogue).
        let body = gateway.get(&format!("{}/api/org", gateway.base_url()), token).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let org_filter = [("name", config.vdc.org.as_str())];
        let org_href = xml::first_by_type(&doc, mime::ORG, &org_filter)
            .and_then(|n| n.attribute("href"))
            .ok_or(AgentError::Semantic("org"))?
            .to_string();

        let body = gateway.get(&org_href, token).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let vdc_href = xml::first_by_type(&doc, mime::VDC, &[])
            .and_then(|n| n.attribute("href"))
            .ok_or(AgentError::Semantic("vdc"))?
            .to_string();
        let cat_filter = [("name", config.catalogue.name.as_str())];
        let catalogue_href = xml::first_by_type(&doc, mime::CATALOGUE, &cat_filter)
            .and_then(|n| n.attribute("href"))
            .ok_or(AgentError::Semantic("catalogue"))?
            .to_string();

        // Catalogue item named by the user's choice, then its template.
        let body = gateway.get(&catalogue_href, token).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let item_filter = [("name", image)];
        let item_href = xml::first_by_type(&doc, mime::CATALOGUE_ITEM, &item_filter)
            .and_then(|n| n.attribute("href"))
            .ok_or_else(|| AgentError::ConfigMissing(format!("catalogue item {image:?}")))?
            .to_string();

        let body = gateway.get(&item_href, token).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let template = xml::first_by_type(&doc, mime::VAPP_TEMPLATE, &[])
            .ok_or(AgentError::Semantic("vApp template"))?;
        let template_name = template.attribute("name").unwrap_or(image).to_string();
        let template_href = template
            .attribute("href")
            .ok_or(AgentError::Semantic("template href"))?
            .to_string();

        // Network details via query against the VDC.
        let body = gateway.get(&vdc_href, token).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let net_filter = [("rel", "orgVdcNetworks")];
        let records_href = xml::first_by_type(&doc, mime::QUERY_RECORDS, &net_filter)
            .and_then(|n| n.attribute("href"))
            .ok_or(AgentError::Semantic("network records"))?
            .to_string();

        let body = gateway.get(&records_href, token).await?;
        let doc = roxmltree::Document::parse(&body)?;
        let network_href = xml::first_with_attr(&doc, "name", &config.vdc.network)
            .and_then(|n| n.attribute("href"))
            .ok_or_else(|| AgentError::ConfigMissing(format!("network {:?}", config.vdc.network)))?
            .to_string();

        let payload = self.payloads.compose_vapp(&ComposeParams {
            appliance: NameDescription { name: label_name, description: label_description },
            network: NameHref { name: &config.vdc.network, href: &network_href },
            template: NameHref { name: &template_name, href: &template_href },
        })?;

        let reply = gateway
            .post(
                &format!("{vdc_href}/action/instantiateVAppTemplate"),
                token,
                mime::COMPOSE_PARAMS,
                payload,
            )
            .await?;
        let doc = roxmltree::Document::parse(&reply)?;
        let vapp_href = xml::first_with_attr(&doc, "name", label_name)
            .and_then(|n| n.attribute("href"))
            .ok_or(AgentError::Semantic("composed vApp"))?
            .to_string();

        Ok(Some(Message::Provisioning {
            uuid: job.uuid,
            ts: self.clock.now(),
            provider,
            uri: vapp_href,
        }))
    }
}

/// `pre_provision → provisioning`, recording the new Node.
fn touch_to_provisioning() -> Handler {
    Box::new(|msg, store| {
        let Message::Provisioning { uuid, ts, provider, uri } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        append_as_controller(
            store,
            *uuid,
            ApplianceState::Provisioning,
            *ts,
            vec![Resource::Node {
                name: String::new(),
                provider: provider.clone(),
                uri: uri.clone(),
            }],
        )
    })
}

#[cfg(test)]
#[path = "pre_provision_tests.rs"]
mod tests;
