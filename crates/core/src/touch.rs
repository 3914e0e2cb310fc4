// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Touches (audit entries) and the resources they carry.

use crate::fsm::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A side-effect recorded against one Touch. Owned by the Touch; to find
/// an artifact's current resources, walk its Touches in time order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    /// An allocated provider VM.
    Node { name: String, provider: String, uri: String },

    /// A private or public address.
    IpAddress { value: String, provider: String },

    /// A bound (internal, external) IP pair, evidence that a gateway
    /// NAT rule has been written.
    NatRouting { ip_int: String, ip_ext: String, provider: String },

    /// A credential for a provider: header key and value.
    ProviderToken { key: String, value: String, provider: String },

    /// A creation/power/health snapshot reported by the provider.
    ProviderReport {
        creation: Option<String>,
        power: Option<String>,
        health: Option<String>,
        provider: String,
    },

    /// Human-chosen name and description.
    Label { name: String, description: String },

    /// Selected image and options for an appliance.
    CatalogueChoice {
        name: String,
        description: String,
        natrouted: bool,
        provider: Option<String>,
    },
}

impl Resource {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Resource::Node { .. } => "node",
            Resource::IpAddress { .. } => "ip_address",
            Resource::NatRouting { .. } => "nat_routing",
            Resource::ProviderToken { .. } => "provider_token",
            Resource::ProviderReport { .. } => "provider_report",
            Resource::Label { .. } => "label",
            Resource::CatalogueChoice { .. } => "catalogue_choice",
        }
    }
}

/// One audit entry: who put which artifact into which state, when, and
/// what resources came with it. Append-only; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touch {
    pub artifact: Uuid,
    /// Handle of the user or component that acted.
    pub actor: String,
    pub state: State,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl Touch {
    pub fn new(
        artifact: Uuid,
        actor: impl Into<String>,
        state: impl Into<State>,
        at: DateTime<Utc>,
    ) -> Self {
        Self { artifact, actor: actor.into(), state: state.into(), at, resources: Vec::new() }
    }

    /// Attach a resource, builder-style.
    pub fn with(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }
}

#[cfg(test)]
#[path = "touch_tests.rs"]
mod tests;
