//! Async client for the IBM Cloud IAM, account, and resource-controller APIs: passcode and
//! API-key logins, token refresh, and typed listings of accounts, instances, and service keys.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{CloudClient, ReqwestCloudClient},
		config::ServiceEndpoints,
		http::ReqwestHttpClient,
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Points every service endpoint at the same mock server base URL.
	pub fn mock_endpoints(base: &str) -> ServiceEndpoints {
		let base = Url::parse(base).expect("Mock server base URL should parse.");

		ServiceEndpoints::builder()
			.identity(base.clone())
			.accounts(base.clone())
			.resource_controller(base)
			.build()
			.expect("Mock service endpoints should be valid.")
	}

	/// Constructs a [`CloudClient`] that sends every request to the provided mock server.
	pub fn build_reqwest_test_client(base: &str) -> ReqwestCloudClient {
		CloudClient::with_http_client(mock_endpoints(base), test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
