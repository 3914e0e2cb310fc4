// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_util::{
    appliance_in, choice, directory, label, store_with_pool, TO_PRE_PROVISION,
};
use std::sync::Arc;
use stratus_core::test_support::TEST_PROVIDER;
use stratus_core::FakeClock;
use stratus_provider::FakeGateway;

const ORG_LIST: &str = r#"<OrgList xmlns="http://www.vmware.com/vcloud/v1.5">
  <Org type="application/vnd.vmware.vcloud.org+xml" name="un-managed_tenancy_test_org" href="https://vcloud.example/api/org/6483"/>
</OrgList>"#;

const ORG_DOC: &str = r#"<Org xmlns="http://www.vmware.com/vcloud/v1.5">
  <Link rel="down" type="application/vnd.vmware.vcloud.vdc+xml" name="un-managed_tenancy_test_org-std-compute-PAYG" href="https://vcloud.example/api/vdc/77"/>
  <Link rel="down" type="application/vnd.vmware.vcloud.catalog+xml" name="Public catalog" href="https://vcloud.example/api/catalog/55"/>
</Org>"#;

const CATALOGUE_DOC: &str = r#"<Catalog xmlns="http://www.vmware.com/vcloud/v1.5">
  <CatalogItem type="application/vnd.vmware.vcloud.catalogItem+xml" name="Web Server" href="https://vcloud.example/api/catalogItem/9"/>
</Catalog>"#;

const ITEM_DOC: &str = r#"<CatalogItem xmlns="http://www.vmware.com/vcloud/v1.5">
  <Entity type="application/vnd.vmware.vcloud.vAppTemplate+xml" name="centos6-stemcell" href="https://vcloud.example/api/vAppTemplate/vappTemplate-1"/>
</CatalogItem>"#;

const VDC_DOC: &str = r#"<Vdc xmlns="http://www.vmware.com/vcloud/v1.5">
  <Link rel="orgVdcNetworks" type="application/vnd.vmware.vcloud.query.records+xml" href="https://vcloud.example/api/query?type=orgVdcNetwork"/>
</Vdc>"#;

const RECORDS_DOC: &str = r#"<QueryResultRecords xmlns="http://www.vmware.com/vcloud/v1.5">
  <OrgVdcNetworkRecord name="un-managed-external-network" href="https://vcloud.example/api/admin/network/eb8a1806"/>
</QueryResultRecords>"#;

const COMPOSE_REPLY: &str = r#"<VApp xmlns="http://www.vmware.com/vcloud/v1.5" name="test_server01" href="https://vcloud.example/api/vApp/vapp-X" status="0"/>"#;

fn scripted() -> Arc<FakeGateway> {
    Arc::new(
        FakeGateway::new(TEST_PROVIDER)
            .reply(ORG_LIST)
            .reply(ORG_DOC)
            .reply(CATALOGUE_DOC)
            .reply(ITEM_DOC)
            .reply(VDC_DOC)
            .reply(RECORDS_DOC)
            .reply(COMPOSE_REPLY),
    )
}

#[tokio::test]
async fn composes_and_reports_the_vapp_uri() {
    let mut store = store_with_pool(&[]);
    let uuid = appliance_in(&mut store, TO_PRE_PROVISION, vec![label(), choice(true)]);

    let gateway = scripted();
    let agent =
        PreProvisionAgent::new(directory(gateway.clone()), FakeClock::new()).unwrap();
    let jobs = agent.jobs(&store);
    assert_eq!(jobs.len(), 1);

    let msg = agent.process(jobs[0].clone()).await.unwrap().expect("message");
    match &msg {
        Message::Provisioning { uuid: got, provider, uri, .. } => {
            assert_eq!(*got, uuid);
            assert_eq!(provider, TEST_PROVIDER);
            assert_eq!(uri, "https://vcloud.example/api/vApp/vapp-X");
        }
        other => panic!("unexpected message {other:?}"),
    }

    let calls = gateway.calls();
    assert_eq!(calls.len(), 7);
    let compose = calls.last().expect("compose call");
    assert_eq!(compose.method, "POST");
    assert_eq!(
        compose.url,
        "https://vcloud.example/api/vdc/77/action/instantiateVAppTemplate"
    );
    assert_eq!(compose.content_type.as_deref(), Some(mime::COMPOSE_PARAMS));
    let body = compose.body.as_deref().expect("body");
    assert!(body.contains(r#"name="test_server01""#));
    assert!(body.contains("centos6-stemcell"));
}

#[tokio::test]
async fn unknown_catalogue_item_is_config_missing() {
    let mut store = store_with_pool(&[]);
    // The chosen image is not in the catalogue reply.
    let uuid = appliance_in(
        &mut store,
        TO_PRE_PROVISION,
        vec![
            label(),
            Resource::CatalogueChoice {
                name: "No Such Image".to_string(),
                description: String::new(),
                natrouted: false,
                provider: None,
            },
        ],
    );

    let gateway = Arc::new(
        FakeGateway::new(TEST_PROVIDER).reply(ORG_LIST).reply(ORG_DOC).reply(CATALOGUE_DOC),
    );
    let agent =
        PreProvisionAgent::new(directory(gateway.clone()), FakeClock::new()).unwrap();
    let jobs = agent.jobs(&store);

    let err = agent.process(jobs[0].clone()).await.unwrap_err();
    assert!(matches!(err, AgentError::ConfigMissing(_)));
    // No compose was attempted, and the store never heard about it.
    assert_eq!(gateway.calls().len(), 3);
    assert_eq!(store.latest_state(uuid), Some(ApplianceState::PreProvision.into()));
}

#[tokio::test]
async fn missing_label_is_reported_before_any_request() {
    let mut store = store_with_pool(&[]);
    let _uuid = appliance_in(&mut store, TO_PRE_PROVISION, vec![choice(true)]);

    let gateway = scripted();
    let agent =
        PreProvisionAgent::new(directory(gateway.clone()), FakeClock::new()).unwrap();
    let jobs = agent.jobs(&store);

    let err = agent.process(jobs[0].clone()).await.unwrap_err();
    assert!(matches!(err, AgentError::MissingResource("label", _)));
    assert!(gateway.calls().is_empty());
}

#[test]
fn handler_moves_to_provisioning_with_node() {
    let mut store = store_with_pool(&[]);
    let uuid = appliance_in(&mut store, TO_PRE_PROVISION, vec![label(), choice(true)]);

    let mut dispatcher = Dispatcher::new();
    let agent = PreProvisionAgent::new(
        directory(Arc::new(FakeGateway::new(TEST_PROVIDER))),
        FakeClock::new(),
    )
    .unwrap();
    agent.callbacks(&mut dispatcher);

    let msg = Message::Provisioning {
        uuid,
        ts: stratus_core::test_support::epoch(),
        provider: TEST_PROVIDER.to_string(),
        uri: "https://vcloud.example/api/vApp/vapp-X".to_string(),
    };
    dispatcher.dispatch(&msg, &mut store).expect("handled").expect("touch");

    assert_eq!(store.latest_state(uuid), Some(ApplianceState::Provisioning.into()));
    let node = store
        .resources(uuid)
        .find_map(|(_, r)| match r {
            Resource::Node { uri, .. } => Some(uri.clone()),
            _ => None,
        })
        .expect("node resource");
    assert_eq!(node, "https://vcloud.example/api/vApp/vapp-X");
}
