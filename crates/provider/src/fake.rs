// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted gateway for tests.
//!
//! Responses are served in FIFO order regardless of URL; every request is
//! recorded so tests can assert on what the agent actually sent. An empty
//! script answers every request with an empty body, which suits the
//! deploy/undeploy/delete agents that ignore reply content.

use crate::gateway::{Gateway, GatewayError, AUTH_HEADER};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use stratus_core::AccessToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    pub method: &'static str,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(u16),
}

#[derive(Default)]
pub struct FakeGateway {
    provider: String,
    base: String,
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeGateway {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            base: "https://vcloud.example:443".to_string(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue the next reply body.
    pub fn reply(self, body: &str) -> Self {
        self.script.lock().push_back(Scripted::Reply(body.to_string()));
        self
    }

    /// Queue a failing status for the next request.
    pub fn fail(self, status: u16) -> Self {
        self.script.lock().push_back(Scripted::Fail(status));
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().clone()
    }

    fn serve(&self, call: FakeCall) -> Result<String, GatewayError> {
        let url = call.url.clone();
        self.calls.lock().push(call);
        match self.script.lock().pop_front() {
            Some(Scripted::Reply(body)) => Ok(body),
            Some(Scripted::Fail(status)) => Err(GatewayError::Status { status, url }),
            None => Ok(String::new()),
        }
    }
}

#[async_trait]
impl Gateway for FakeGateway {
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
        self.serve(FakeCall {
            method: "GET",
            url: url.to_string(),
            content_type: None,
            body: None,
            token: token.map(|t| t.value.clone()),
        })
    }

    async fn post(
        &self,
        url: &str,
        token: Option<&AccessToken>,
        content_type: &str,
        body: String,
    ) -> Result<String, GatewayError> {
        self.serve(FakeCall {
            method: "POST",
            url: url.to_string(),
            content_type: Some(content_type.to_string()),
            body: Some(body),
            token: token.map(|t| t.value.clone()),
        })
    }

    async fn delete(
        &self,
        url: &str,
        token: Option<&AccessToken>,
    ) -> Result<String, GatewayError> {
        self.serve(FakeCall {
            method: "DELETE",
            url: url.to_string(),
            content_type: None,
            body: None,
            token: token.map(|t| t.value.clone()),
        })
    }

    async fn session(
        &self,
        user: &str,
        _pass: &str,
    ) -> Result<(String, String), GatewayError> {
        let url = format!("{}/api/sessions", self.base);
        self.serve(FakeCall {
            method: "POST",
            url,
            content_type: None,
            body: None,
            token: None,
        })
        .map(|body| {
            let value = if body.is_empty() {
                format!("session-{user}")
            } else {
                body
            };
            (AUTH_HEADER.to_string(), value)
        })
    }
}
