// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fsm::{ApplianceState, MembershipState};

#[test]
fn entry_state_matches_kind() {
    let app = Artifact::new("TestOrg", ArtifactKind::Appliance);
    assert_eq!(app.kind.entry_state(), ApplianceState::Requested.into());

    let mship =
        Artifact::new("TestOrg", ArtifactKind::Membership { role: MembershipRole::Admin });
    assert_eq!(mship.kind.entry_state(), MembershipState::Invite.into());
}

#[test]
fn owns_state_checks_fsm() {
    let kind = ArtifactKind::Appliance;
    assert!(kind.owns_state(&ApplianceState::PreCheck.into()));
    assert!(!kind.owns_state(&MembershipState::Active.into()));
}

#[test]
fn subscription_carries_provider() {
    let sub = Artifact::new(
        "TestOrg",
        ArtifactKind::Subscription { provider: "vcloud.example".to_string() },
    );
    match &sub.kind {
        ArtifactKind::Subscription { provider } => assert_eq!(provider, "vcloud.example"),
        other => panic!("unexpected kind {other}"),
    }
}

#[test]
fn artifact_serde_round_trip() {
    let app = Artifact::new("TestOrg", ArtifactKind::Appliance);
    let json = serde_json::to_string(&app).unwrap();
    let back: Artifact = serde_json::from_str(&json).unwrap();
    assert_eq!(back, app);
}
