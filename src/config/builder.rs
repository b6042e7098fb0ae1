// self
use crate::{_prelude::*, config::ServiceEndpoints, error::ConfigError};

/// Builder for [`ServiceEndpoints`] values.
#[derive(Debug, Default)]
pub struct ServiceEndpointsBuilder {
	/// Optional IAM root override.
	pub identity: Option<Url>,
	/// Optional account service root override.
	pub accounts: Option<Url>,
	/// Optional resource controller root override.
	pub resource_controller: Option<Url>,
}
impl ServiceEndpointsBuilder {
	/// Creates a builder that falls back to the public endpoints.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the IAM root.
	pub fn identity(mut self, url: Url) -> Self {
		self.identity = Some(url);

		self
	}

	/// Overrides the account service root.
	pub fn accounts(mut self, url: Url) -> Self {
		self.accounts = Some(url);

		self
	}

	/// Overrides the resource controller root.
	pub fn resource_controller(mut self, url: Url) -> Self {
		self.resource_controller = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting endpoint set.
	pub fn build(self) -> Result<ServiceEndpoints, ConfigError> {
		let defaults = ServiceEndpoints::default();
		let endpoints = ServiceEndpoints {
			identity: self.identity.unwrap_or(defaults.identity),
			accounts: self.accounts.unwrap_or(defaults.accounts),
			resource_controller: self.resource_controller.unwrap_or(defaults.resource_controller),
		};

		endpoints.validate()?;

		Ok(endpoints)
	}
}

impl ServiceEndpoints {
	/// Validates that every root is an absolute HTTP(S) URL.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("identity", &self.identity)?;
		validate_endpoint("accounts", &self.accounts)?;
		validate_endpoint("resource controller", &self.resource_controller)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let scheme_ok = matches!(url.scheme(), "https" | "http");

	if scheme_ok && url.host_str().is_some() {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedEndpoint { endpoint: name, url: url.to_string() })
	}
}
