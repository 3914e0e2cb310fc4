// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only record log, one JSON record per line.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use stratus_core::{Artifact, Organisation, ProviderRecord, Touch, User};

/// One durable record. Reference data and artifacts are logged once at
/// creation; everything after that is Touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum LogRecord {
    Organisation(Organisation),
    User(User),
    Provider(ProviderRecord),
    Artifact(Artifact),
    Touch(Touch),
}

/// The audit log file. Records are flushed as they are appended: the log
/// is the source of truth on restart, and audit entries are low-rate.
pub struct TouchLog {
    writer: BufWriter<File>,
}

impl TouchLog {
    /// Open (creating if absent) and replay existing records.
    pub fn open(path: &Path) -> Result<(Self, Vec<LogRecord>), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut records = Vec::new();
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                records.push(serde_json::from_str(&line)?);
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!(path = %path.display(), replayed = records.len(), "opened audit log");
        Ok((Self { writer: BufWriter::new(file) }, records))
    }

    pub fn append(&mut self, record: &LogRecord) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
