// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use stratus_core::test_support::{epoch, TEST_ORG};
use stratus_core::{Artifact, ArtifactKind, Touch};
use stratus_core::fsm::ApplianceState;
use tempfile::tempdir;

fn test_records() -> (Artifact, Touch) {
    let artifact = Artifact::new(TEST_ORG, ArtifactKind::Appliance);
    let touch = Touch::new(artifact.uuid, "testuser", ApplianceState::Requested, epoch());
    (artifact, touch)
}

#[test]
fn open_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");

    let (_, records) = TouchLog::open(&path).unwrap();

    assert!(path.exists());
    assert!(records.is_empty());
}

#[test]
fn open_creates_missing_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("audit.log");

    TouchLog::open(&path).unwrap();

    assert!(path.exists());
}

#[test]
fn append_then_reopen_replays() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let (artifact, touch) = test_records();

    {
        let (mut log, _) = TouchLog::open(&path).unwrap();
        log.append(&LogRecord::Artifact(artifact.clone())).unwrap();
        log.append(&LogRecord::Touch(touch.clone())).unwrap();
    }

    let (_, records) = TouchLog::open(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], LogRecord::Artifact(artifact));
    assert_eq!(records[1], LogRecord::Touch(touch));
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let (artifact, _) = test_records();

    {
        let (mut log, _) = TouchLog::open(&path).unwrap();
        log.append(&LogRecord::Artifact(artifact)).unwrap();
    }
    std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, b"\n\n"))
        .unwrap();

    let (_, records) = TouchLog::open(&path).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn corrupt_line_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    std::fs::write(&path, "not json\n").unwrap();

    assert!(TouchLog::open(&path).is_err());
}
