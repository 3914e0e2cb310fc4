// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::artifact::{Artifact, ArtifactKind};
use crate::fsm::{ApplianceState, State};
use crate::job::{ArtifactSnapshot, Job, SubscriptionView};
use crate::touch::{Resource, Touch};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

pub const TEST_PROVIDER: &str = "cloudhands.jasmin.vcloud.phase04.cfg";
pub const TEST_ORG: &str = "TestOrg";

pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

pub fn test_appliance() -> Artifact {
    Artifact::new(TEST_ORG, ArtifactKind::Appliance)
}

/// An appliance audit trail walked through the given states, one second
/// apart, with `resources` attached to the final Touch.
pub fn appliance_trail(
    uuid: Uuid,
    actor: &str,
    states: &[ApplianceState],
    resources: Vec<Resource>,
) -> Vec<Touch> {
    let mut touches: Vec<Touch> = states
        .iter()
        .enumerate()
        .map(|(i, s)| Touch::new(uuid, actor, *s, epoch() + Duration::seconds(i as i64)))
        .collect();
    if let Some(last) = touches.last_mut() {
        last.resources = resources;
    }
    touches
}

/// Snapshot of an appliance in `state` carrying `resources` on its final
/// Touch. The trail runs requested → … → `state` along the happy path.
pub fn appliance_snapshot(
    uuid: Uuid,
    state: ApplianceState,
    resources: Vec<Resource>,
) -> ArtifactSnapshot {
    use ApplianceState::*;
    // Legal trails only: the delete arm branches from `stopped`, so it
    // cannot share a prefix array with the start/run arm.
    let path: Vec<ApplianceState> = match state {
        PreDelete | Deleted => vec![
            Requested,
            Configuring,
            PreProvision,
            Provisioning,
            PreCheck,
            PreOperational,
            Operational,
            PreStop,
            Stopped,
            PreDelete,
            Deleted,
        ],
        _ => vec![
            Requested,
            Configuring,
            PreProvision,
            Provisioning,
            PreCheck,
            PreOperational,
            Operational,
            PreStop,
            Stopped,
            PreStart,
            Running,
        ],
    };
    let upto = path.iter().position(|s| *s == state).unwrap_or(0);
    let touches = appliance_trail(uuid, "testuser", &path[..=upto], resources);
    ArtifactSnapshot {
        uuid,
        organisation: TEST_ORG.to_string(),
        kind: ArtifactKind::Appliance,
        touches,
        subscription: None,
    }
}

pub fn test_job(state: ApplianceState, resources: Vec<Resource>) -> Job {
    let uuid = Uuid::new_v4();
    Job { uuid, token: None, artifact: appliance_snapshot(uuid, state, resources) }
}

pub fn with_subscription(mut job: Job, pool: &[&str], taken: &[&str]) -> Job {
    job.artifact.subscription = Some(SubscriptionView {
        provider: TEST_PROVIDER.to_string(),
        pool: pool.iter().map(|s| s.to_string()).collect(),
        taken: taken.iter().map(|s| s.to_string()).collect(),
    });
    job
}

pub fn node_resource(uri: &str) -> Resource {
    Resource::Node {
        name: "test_server01".to_string(),
        provider: TEST_PROVIDER.to_string(),
        uri: uri.to_string(),
    }
}

pub fn label_resource() -> Resource {
    Resource::Label {
        name: "test_server01".to_string(),
        description: "This is just for kicking tyres".to_string(),
    }
}

pub fn choice_resource(name: &str, natrouted: bool) -> Resource {
    Resource::CatalogueChoice {
        name: name.to_string(),
        description: String::new(),
        natrouted,
        provider: None,
    }
}

pub fn touch_at(uuid: Uuid, state: impl Into<State>, at: DateTime<Utc>) -> Touch {
    Touch::new(uuid, "testuser", state, at)
}
