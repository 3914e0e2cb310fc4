// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stratus-provider: the outbound seam to the IaaS.
//!
//! Agents never hold an HTTP client; they talk through the [`Gateway`]
//! trait and navigate the XML replies with the [`xml`] module.

pub mod config;
pub mod gateway;
pub mod payload;
pub mod xml;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use config::{ConfigError, ProviderConfig};
pub use gateway::{Gateway, GatewayError, VcloudGateway};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGateway;
