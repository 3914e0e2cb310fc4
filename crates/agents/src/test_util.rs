// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store and provider fixtures shared by the agent tests.

use crate::framework::ProviderDirectory;
use chrono::Duration;
use std::sync::Arc;
use stratus_core::fsm::{ApplianceState, SubscriptionState};
use stratus_core::test_support::{epoch, TEST_ORG, TEST_PROVIDER};
use stratus_core::{Artifact, ArtifactKind, Organisation, ProviderRecord, Resource, Touch, User};
use stratus_provider::config::{
    Catalogue, EdgeGateway, Host, Metadata, ProviderConfig, Vdc,
};
use stratus_provider::FakeGateway;
use stratus_store::Store;
use uuid::Uuid;

pub(crate) fn test_config() -> ProviderConfig {
    ProviderConfig {
        metadata: Metadata { path: TEST_PROVIDER.to_string() },
        host: Host {
            name: "vcloud.example".to_string(),
            port: 443,
            api_version: "5.5".to_string(),
            verify_ssl_cert: false,
        },
        vdc: Vdc {
            org: "un-managed_tenancy_test_org".to_string(),
            name: "un-managed_tenancy_test_org-std-compute-PAYG".to_string(),
            network: "un-managed-external-network".to_string(),
        },
        catalogue: Catalogue { name: "Public catalog".to_string() },
        gateway: EdgeGateway {
            name: "test-edge".to_string(),
            interface: Some(
                "https://vcloud.example/api/admin/network/eb8a1806".to_string(),
            ),
        },
        libcloud: Default::default(),
        pipe: Default::default(),
    }
}

pub(crate) fn directory(gateway: Arc<FakeGateway>) -> Arc<ProviderDirectory> {
    let mut providers = ProviderDirectory::new();
    providers.insert(test_config(), gateway);
    Arc::new(providers)
}

/// Store seeded with the reference data every scenario needs, plus a
/// subscription granting `pool`.
pub(crate) fn store_with_pool(pool: &[&str]) -> Store {
    let mut store = Store::in_memory();
    store
        .register_organisation(Organisation { name: TEST_ORG.to_string() })
        .unwrap();
    store
        .register_provider(ProviderRecord { name: TEST_PROVIDER.to_string() })
        .unwrap();
    store
        .register_user(User { handle: "testuser".to_string(), uuid: Uuid::new_v4() })
        .unwrap();

    let sub = Artifact::new(
        TEST_ORG,
        ArtifactKind::Subscription { provider: TEST_PROVIDER.to_string() },
    );
    let sub_uuid = sub.uuid;
    store.create_artifact(sub, "testuser", epoch()).unwrap();
    let mut touch = Touch::new(
        sub_uuid,
        "testuser",
        SubscriptionState::Active,
        epoch() + Duration::seconds(1),
    );
    for ip in pool {
        touch = touch.with(Resource::IpAddress {
            value: ip.to_string(),
            provider: TEST_PROVIDER.to_string(),
        });
    }
    store.append(touch).unwrap();
    store
}

/// Walk a fresh appliance along the happy path to `states.last()`,
/// attaching `resources` to the final Touch.
pub(crate) fn appliance_in(
    store: &mut Store,
    states: &[ApplianceState],
    resources: Vec<Resource>,
) -> Uuid {
    let artifact = Artifact::new(TEST_ORG, ArtifactKind::Appliance);
    let uuid = artifact.uuid;
    store.create_artifact(artifact, "testuser", epoch()).unwrap();
    for (i, state) in states.iter().enumerate() {
        let mut touch =
            Touch::new(uuid, "testuser", *state, epoch() + Duration::seconds(1 + i as i64));
        if i + 1 == states.len() {
            touch.resources = resources.clone();
        }
        store.append(touch).unwrap();
    }
    uuid
}

pub(crate) const TO_PRE_PROVISION: &[ApplianceState] =
    &[ApplianceState::Configuring, ApplianceState::PreProvision];

pub(crate) const TO_PRE_CHECK: &[ApplianceState] = &[
    ApplianceState::Configuring,
    ApplianceState::PreProvision,
    ApplianceState::Provisioning,
    ApplianceState::PreCheck,
];

pub(crate) const TO_PRE_OPERATIONAL: &[ApplianceState] = &[
    ApplianceState::Configuring,
    ApplianceState::PreProvision,
    ApplianceState::Provisioning,
    ApplianceState::PreCheck,
    ApplianceState::PreOperational,
];

pub(crate) fn node(uri: &str) -> Resource {
    Resource::Node {
        name: "test_server01".to_string(),
        provider: TEST_PROVIDER.to_string(),
        uri: uri.to_string(),
    }
}

pub(crate) fn label() -> Resource {
    Resource::Label {
        name: "test_server01".to_string(),
        description: "This is just for kicking tyres".to_string(),
    }
}

pub(crate) fn choice(natrouted: bool) -> Resource {
    Resource::CatalogueChoice {
        name: "Web Server".to_string(),
        description: String::new(),
        natrouted,
        provider: None,
    }
}
