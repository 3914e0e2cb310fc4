// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_util::{appliance_in, store_with_pool};
use stratus_core::fsm::ApplianceState;
use stratus_core::test_support::epoch;
use stratus_core::FakeClock;

const TO_PROVISIONING: &[ApplianceState] = &[
    ApplianceState::Configuring,
    ApplianceState::PreProvision,
    ApplianceState::Provisioning,
];

#[test]
fn fresh_appliances_are_not_checked_yet() {
    let mut store = store_with_pool(&[]);
    let _uuid = appliance_in(&mut store, TO_PROVISIONING, vec![]);

    // The trail's last touch is seconds after epoch; stay inside the grace.
    let clock = FakeClock::new();
    clock.set(epoch() + Duration::seconds(10));
    let agent = ProvisioningAgent::new(clock);

    assert!(agent.jobs(&store).is_empty());
}

#[test]
fn appliances_past_the_grace_are_offered() {
    let mut store = store_with_pool(&[]);
    let uuid = appliance_in(&mut store, TO_PROVISIONING, vec![]);

    let clock = FakeClock::new();
    clock.set(epoch() + Duration::seconds(60));
    let agent = ProvisioningAgent::new(clock);

    let jobs = agent.jobs(&store);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].uuid, uuid);
}

#[tokio::test]
async fn process_requests_a_check() {
    let mut store = store_with_pool(&[]);
    let uuid = appliance_in(&mut store, TO_PROVISIONING, vec![]);

    let clock = FakeClock::new();
    clock.set(epoch() + Duration::seconds(60));
    let agent = ProvisioningAgent::new(clock);
    let jobs = agent.jobs(&store);

    let msg = agent.process(jobs[0].clone()).await.unwrap().expect("message");
    assert!(matches!(msg, Message::CheckRequired { uuid: got, .. } if got == uuid));
}

#[test]
fn handler_moves_to_pre_check() {
    let mut store = store_with_pool(&[]);
    let uuid = appliance_in(&mut store, TO_PROVISIONING, vec![]);

    let mut dispatcher = Dispatcher::new();
    ProvisioningAgent::new(FakeClock::new()).callbacks(&mut dispatcher);

    let msg = Message::CheckRequired { uuid, ts: epoch() + Duration::seconds(120) };
    dispatcher.dispatch(&msg, &mut store).expect("handled").expect("touch");
    assert_eq!(store.latest_state(uuid), Some(ApplianceState::PreCheck.into()));
}
