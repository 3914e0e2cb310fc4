// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unit of work an agent consumes.

use crate::artifact::ArtifactKind;
use crate::touch::{Resource, Touch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user provider credential carried into a job: the provider it is
/// good for, the header to send it under, and the header value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub provider: String,
    pub key: String,
    pub value: String,
}

/// Public-IP accounting for the organisation's subscription, captured at
/// job-creation time. `pool` is the subscription's addresses; `taken` is
/// every NAT external already bound under the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub provider: String,
    pub pool: Vec<String>,
    pub taken: Vec<String>,
}

impl SubscriptionView {
    /// Addresses still available, in pool order.
    pub fn free(&self) -> Vec<&str> {
        self.pool
            .iter()
            .filter(|ip| !self.taken.contains(ip))
            .map(String::as_str)
            .collect()
    }
}

/// Eager copy of an artifact and its audit trail, taken when the job is
/// created. Agents navigate this instead of querying the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSnapshot {
    pub uuid: Uuid,
    pub organisation: String,
    pub kind: ArtifactKind,
    /// Touches in time order, oldest first.
    pub touches: Vec<Touch>,
    /// Filled only for jobs that allocate from the public-IP pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionView>,
}

impl ArtifactSnapshot {
    /// Resources in reverse time order (most recent Touch first), each
    /// paired with the state its Touch recorded.
    pub fn resources_newest_first(&self) -> impl Iterator<Item = (&Touch, &Resource)> {
        self.touches.iter().rev().flat_map(|t| t.resources.iter().map(move |r| (t, r)))
    }

    /// Most recent Node resource, if any.
    pub fn node(&self) -> Option<(&str, &str)> {
        self.resources_newest_first().find_map(|(_, r)| match r {
            Resource::Node { provider, uri, .. } => Some((provider.as_str(), uri.as_str())),
            _ => None,
        })
    }

    /// Most recent Label resource, if any.
    pub fn label(&self) -> Option<(&str, &str)> {
        self.resources_newest_first().find_map(|(_, r)| match r {
            Resource::Label { name, description } => {
                Some((name.as_str(), description.as_str()))
            }
            _ => None,
        })
    }

    /// Most recent CatalogueChoice resource, if any.
    pub fn catalogue_choice(&self) -> Option<(&str, bool)> {
        self.resources_newest_first().find_map(|(_, r)| match r {
            Resource::CatalogueChoice { name, natrouted, .. } => {
                Some((name.as_str(), *natrouted))
            }
            _ => None,
        })
    }

    /// Most recent private address recorded for the artifact.
    pub fn ip_address(&self) -> Option<&str> {
        self.resources_newest_first().find_map(|(_, r)| match r {
            Resource::IpAddress { value, .. } => Some(value.as_str()),
            _ => None,
        })
    }

    /// Any prior resource was attached under an `operational` Touch.
    pub fn was_operational(&self) -> bool {
        self.touches
            .iter()
            .any(|t| t.state.state_name() == "operational" && !t.resources.is_empty())
    }

    /// Actor of the first Touch: the original requester.
    pub fn first_actor(&self) -> Option<&str> {
        self.touches.first().map(|t| t.actor.as_str())
    }

    /// Timestamp of the latest Touch.
    pub fn last_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.touches.last().map(|t| t.at)
    }
}

/// What the scheduler hands an agent: the artifact's uuid, the caller's
/// provider token when one exists, and the artifact snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub uuid: Uuid,
    pub token: Option<AccessToken>,
    pub artifact: ArtifactSnapshot,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
