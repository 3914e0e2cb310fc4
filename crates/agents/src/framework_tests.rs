// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatch::Dispatcher;
use crate::test_util::{appliance_in, node, store_with_pool, TO_PRE_CHECK};
use chrono::Duration as ChronoDuration;
use stratus_core::fsm::RegistrationState;
use stratus_core::test_support::{epoch, TEST_PROVIDER};
use stratus_core::{Artifact, ArtifactKind, Message, Resource, Touch};

#[test]
fn jobs_in_state_picks_only_trigger_state() {
    let mut store = store_with_pool(&[]);
    let waiting = appliance_in(&mut store, TO_PRE_CHECK, vec![]);
    let _idle = appliance_in(&mut store, &[], vec![]);

    let jobs = appliance_jobs(&store, ApplianceState::PreCheck);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].uuid, waiting);
    assert!(jobs[0].token.is_none());
}

#[test]
fn jobs_carry_newest_token_for_original_actor() {
    let mut store = store_with_pool(&[]);

    let reg = Artifact::new("TestOrg", ArtifactKind::Registration);
    let reg_uuid = reg.uuid;
    store.create_artifact(reg, "testuser", epoch()).unwrap();
    let token = |value: &str, offset: i64| {
        Touch::new(
            reg_uuid,
            "testuser",
            RegistrationState::Valid,
            epoch() + ChronoDuration::seconds(offset),
        )
        .with(Resource::ProviderToken {
            key: "x-vcloud-authorization".to_string(),
            value: value.to_string(),
            provider: TEST_PROVIDER.to_string(),
        })
    };
    store.append(token("expiredexpiredexpiredexpired", 1)).unwrap();
    // valid → valid re-assertion carrying the fresh credential.
    store.append(token("validvalidvalidvalidvalidval", 2)).unwrap();

    let _app = appliance_in(&mut store, TO_PRE_CHECK, vec![]);
    let jobs = appliance_jobs(&store, ApplianceState::PreCheck);
    let carried = jobs[0].token.as_ref().expect("token");
    assert_eq!(carried.value, "validvalidvalidvalidvalidval");
    assert_eq!(carried.provider, TEST_PROVIDER);
}

#[test]
fn job_provider_prefers_subscription_then_node() {
    let mut store = store_with_pool(&[]);
    let with_sub = appliance_in(&mut store, TO_PRE_CHECK, vec![]);
    let jobs = appliance_jobs(&store, ApplianceState::PreCheck);
    let job = jobs.into_iter().find(|j| j.uuid == with_sub).expect("job");
    assert_eq!(job_provider(&job).unwrap(), TEST_PROVIDER);

    // Strip the subscription: the node resource decides.
    let mut job = job;
    job.artifact.subscription = None;
    assert!(job_provider(&job).is_err());
    job.artifact.touches.last_mut().expect("touch").resources =
        vec![node("https://vcloud.example/api/vApp/vapp-X")];
    assert_eq!(job_provider(&job).unwrap(), TEST_PROVIDER);
}

struct EchoAgent;

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn jobs(&self, _store: &Store) -> Vec<Job> {
        Vec::new()
    }

    fn callbacks(&self, _dispatcher: &mut Dispatcher) {}

    async fn process(&self, job: Job) -> Result<Option<Message>, AgentError> {
        Ok(Some(Message::CheckRequired { uuid: job.uuid, ts: epoch() }))
    }
}

#[tokio::test]
async fn run_consumes_jobs_until_channel_closes() {
    let mut store = store_with_pool(&[]);
    let uuid = appliance_in(&mut store, TO_PRE_CHECK, vec![]);
    let jobs = appliance_jobs(&store, ApplianceState::PreCheck);

    let (work_tx, work_rx) = mpsc::channel(8);
    let (out_tx, mut out_rx) = mpsc::channel(8);
    let handle = tokio::spawn(async move { EchoAgent.run(work_rx, out_tx).await });

    work_tx.send(jobs[0].clone()).await.unwrap();
    let msg = out_rx.recv().await.expect("message");
    assert_eq!(msg.uuid(), uuid);

    drop(work_tx);
    handle.await.unwrap();
    assert!(out_rx.recv().await.is_none());
}

struct FailingAgent;

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn jobs(&self, _store: &Store) -> Vec<Job> {
        Vec::new()
    }

    fn callbacks(&self, _dispatcher: &mut Dispatcher) {}

    async fn process(&self, _job: Job) -> Result<Option<Message>, AgentError> {
        Err(AgentError::Semantic("always"))
    }
}

#[tokio::test]
async fn run_survives_job_failures() {
    let mut store = store_with_pool(&[]);
    let _uuid = appliance_in(&mut store, TO_PRE_CHECK, vec![]);
    let jobs = appliance_jobs(&store, ApplianceState::PreCheck);

    let (work_tx, work_rx) = mpsc::channel(8);
    let (out_tx, mut out_rx) = mpsc::channel(8);
    let handle = tokio::spawn(async move { FailingAgent.run(work_rx, out_tx).await });

    work_tx.send(jobs[0].clone()).await.unwrap();
    work_tx.send(jobs[0].clone()).await.unwrap();
    drop(work_tx);
    handle.await.unwrap();

    // Failures emit nothing; the loop still drains to the close.
    assert!(out_rx.recv().await.is_none());
}

#[test]
fn provider_directory_misses_are_config_errors() {
    let providers = ProviderDirectory::new();
    assert!(matches!(providers.get("nowhere"), Err(AgentError::ConfigMissing(_))));
}
