// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP gateway to one configured provider endpoint.

use crate::config::ProviderConfig;
use async_trait::async_trait;
use std::time::Duration;
use stratus_core::AccessToken;
use thiserror::Error;

/// Accept header every provider request carries.
pub const ACCEPT: &str = "application/*+xml;version=5.5";

/// Header the session endpoint answers with.
pub const AUTH_HEADER: &str = "x-vcloud-authorization";

/// Ambient per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("reply from {url} missing header {header}")]
    MissingHeader { url: String, header: &'static str },

    #[error("building client: {0}")]
    Build(String),
}

/// An async request/response sink whose replies are XML text.
///
/// Agents depend on this trait only; the scheduler wires in the real
/// client, tests wire in a scripted fake.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Provider name this gateway serves.
    fn provider(&self) -> &str;

    /// Base URL, e.g. `https://host:port`.
    fn base_url(&self) -> String;

    async fn get(&self, url: &str, token: Option<&AccessToken>)
        -> Result<String, GatewayError>;

    async fn post(
        &self,
        url: &str,
        token: Option<&AccessToken>,
        content_type: &str,
        body: String,
    ) -> Result<String, GatewayError>;

    async fn delete(
        &self,
        url: &str,
        token: Option<&AccessToken>,
    ) -> Result<String, GatewayError>;

    /// POST `api/sessions` with basic auth; returns the bearer header as
    /// a (key, value) pair.
    async fn session(&self, user: &str, pass: &str)
        -> Result<(String, String), GatewayError>;
}

/// The real thing, over reqwest.
pub struct VcloudGateway {
    provider: String,
    base: String,
    client: reqwest::Client,
}

impl VcloudGateway {
    pub fn new(config: &ProviderConfig) -> Result<Self, GatewayError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!config.host.verify_ssl_cert)
            .build()
            .map_err(|e| GatewayError::Build(e.to_string()))?;
        Ok(Self {
            provider: config.name().to_string(),
            base: config.base_url(),
            client,
        })
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        token: Option<&AccessToken>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url).header("Accept", ACCEPT);
        if let Some(token) = token {
            builder = builder.header(&token.key, &token.value);
        }
        builder
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<String, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Gateway for VcloudGateway {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn base_url(&self) -> String {
        self.base.clone()
    }

    async fn get(
        &self,
        url: &str,
        token: Option<&AccessToken>,
    ) -> Result<String, GatewayError> {
        tracing::debug!(%url, "GET");
        let response = self.request(reqwest::Method::GET, url, token).send().await?;
        Self::read(url, response).await
    }

    async fn post(
        &self,
        url: &str,
        token: Option<&AccessToken>,
        content_type: &str,
        body: String,
    ) -> Result<String, GatewayError> {
        tracing::debug!(%url, %content_type, "POST");
        let response = self
            .request(reqwest::Method::POST, url, token)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await?;
        Self::read(url, response).await
    }

    async fn delete(
        &self,
        url: &str,
        token: Option<&AccessToken>,
    ) -> Result<String, GatewayError> {
        tracing::debug!(%url, "DELETE");
        let response = self.request(reqwest::Method::DELETE, url, token).send().await?;
        Self::read(url, response).await
    }

    async fn session(
        &self,
        user: &str,
        pass: &str,
    ) -> Result<(String, String), GatewayError> {
        let url = format!("{}/api/sessions", self.base);
        tracing::debug!(%url, "POST (session)");
        let response = self
            .client
            .post(&url)
            .header("Accept", ACCEPT)
            .basic_auth(user, Some(pass))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), url });
        }
        let value = response
            .headers()
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(GatewayError::MissingHeader { url, header: AUTH_HEADER })?
            .to_string();
        Ok((AUTH_HEADER.to_string(), value))
    }
}
