// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-provider configuration, one TOML file per provider.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("parsing {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("no provider configuration found in {0}")]
    Empty(PathBuf),
}

/// One provider, as configured by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    pub metadata: Metadata,
    pub host: Host,
    pub vdc: Vdc,
    pub catalogue: Catalogue,
    pub gateway: EdgeGateway,
    #[serde(default)]
    pub libcloud: Libcloud,
    #[serde(default)]
    pub pipe: Pipe,
}

/// The provider's identity within the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    /// Provider name, as referenced by subscriptions and resources.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Host {
    pub name: String,
    pub port: u16,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_true")]
    pub verify_ssl_cert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Vdc {
    /// Organisation name on the provider side.
    pub org: String,
    pub name: String,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalogue {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EdgeGateway {
    pub name: String,
    #[serde(default)]
    pub interface: Option<String>,
}

/// Driver identifier kept for parity with operator tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Libcloud {
    #[serde(default)]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pipe {
    /// Path of the named pipe the token ingress reads for this provider.
    #[serde(default)]
    pub tokens: Option<PathBuf>,
}

fn default_api_version() -> String {
    "5.5".to_string()
}

fn default_true() -> bool {
    true
}

impl ProviderConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(path, &text)
    }

    /// Load every `*.toml` in the directory, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, ConfigError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut configs = Vec::with_capacity(paths.len());
        for path in paths {
            configs.push(Self::load(&path)?);
        }
        if configs.is_empty() {
            return Err(ConfigError::Empty(dir.to_path_buf()));
        }
        Ok(configs)
    }

    /// Provider name as recorded in the store.
    pub fn name(&self) -> &str {
        &self.metadata.path
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host.name, self.host.port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
