//! Service endpoint configuration (data) and IAM client credentials.
//!
//! [`ServiceEndpoints`] names the three API roots the client talks to: IAM for identity
//! discovery and token grants, the account service, and the resource controller. The
//! defaults target the public `cloud.ibm.com` hosts; the builder lets callers point
//! individual roots at staging regions, proxies, or a local mock server.

/// Builder API for assembling endpoint sets.
pub mod builder;

pub use builder::*;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, error::ConfigError};

/// Public IAM root.
pub const IAM_ROOT: &str = "https://iam.cloud.ibm.com";
/// Public account service root.
pub const ACCOUNTS_ROOT: &str = "https://accounts.cloud.ibm.com";
/// Public resource controller root.
pub const RESOURCE_CONTROLLER_ROOT: &str = "https://resource-controller.cloud.ibm.com";

const DISCOVERY_PATH: &str = "/identity/.well-known/openid-configuration";
const ACCOUNTS_PATH: &str = "/coe/v2/accounts";
const RESOURCE_INSTANCES_PATH: &str = "/v2/resource_instances";
const RESOURCE_KEYS_PATH: &str = "/v2/resource_keys";

/// Validated API roots consumed by [`CloudClient`](crate::client::CloudClient).
///
/// Deserialization runs [`ServiceEndpoints::validate`], so a config file cannot smuggle in a
/// non-HTTP root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedEndpoints")]
pub struct ServiceEndpoints {
	/// IAM root serving the OpenID configuration document.
	pub identity: Url,
	/// Account service root.
	pub accounts: Url,
	/// Resource controller root.
	pub resource_controller: Url,
}
impl ServiceEndpoints {
	/// Creates a new builder seeded with the public endpoints.
	pub fn builder() -> ServiceEndpointsBuilder {
		ServiceEndpointsBuilder::new()
	}

	/// OpenID configuration document listing the IAM OAuth endpoints.
	pub fn discovery_url(&self) -> Result<Url, ConfigError> {
		join(&self.identity, DISCOVERY_PATH)
	}

	/// First page of the account listing.
	pub fn accounts_url(&self) -> Result<Url, ConfigError> {
		join(&self.accounts, ACCOUNTS_PATH)
	}

	/// Follow-up page of the account listing; `next` is appended verbatim to the listing URL.
	pub fn accounts_page_url(&self, next: &str) -> Result<Url, ConfigError> {
		join(&self.accounts, &format!("{ACCOUNTS_PATH}{next}"))
	}

	/// Resource instance listing root.
	pub fn resource_instances_url(&self) -> Result<Url, ConfigError> {
		join(&self.resource_controller, RESOURCE_INSTANCES_PATH)
	}

	/// Resource key listing and creation root.
	pub fn resource_keys_url(&self) -> Result<Url, ConfigError> {
		join(&self.resource_controller, RESOURCE_KEYS_PATH)
	}

	/// Resolves a resource-controller `next_url`, which is relative to the controller root.
	pub fn resource_controller_page_url(&self, next: &str) -> Result<Url, ConfigError> {
		join(&self.resource_controller, next)
	}
}
impl TryFrom<UncheckedEndpoints> for ServiceEndpoints {
	type Error = ConfigError;

	fn try_from(value: UncheckedEndpoints) -> Result<Self, Self::Error> {
		let endpoints = Self {
			identity: value.identity,
			accounts: value.accounts,
			resource_controller: value.resource_controller,
		};

		endpoints.validate()?;

		Ok(endpoints)
	}
}
impl Default for ServiceEndpoints {
	fn default() -> Self {
		Self {
			identity: Url::parse(IAM_ROOT).expect("IAM root constant is a valid URL."),
			accounts: Url::parse(ACCOUNTS_ROOT).expect("Accounts root constant is a valid URL."),
			resource_controller: Url::parse(RESOURCE_CONTROLLER_ROOT)
				.expect("Resource controller root constant is a valid URL."),
		}
	}
}

#[derive(Deserialize)]
struct UncheckedEndpoints {
	identity: Url,
	accounts: Url,
	resource_controller: Url,
}

/// OAuth client identity presented to the IAM token endpoint via HTTP Basic.
///
/// IAM accepts the public `bx`/`bx` client for CLI-style logins.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamClientCredentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
}
impl IamClientCredentials {
	/// Creates credentials for a custom IAM client.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Base64 payload for the `Authorization: Basic` header.
	pub fn basic_credentials(&self) -> String {
		STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
	}
}
impl Default for IamClientCredentials {
	fn default() -> Self {
		Self::new("bx", "bx")
	}
}
impl Debug for IamClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IamClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}

fn join(root: &Url, path: &str) -> Result<Url, ConfigError> {
	let base = root.as_str().trim_end_matches('/');

	Ok(Url::parse(&format!("{base}{path}"))?)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_endpoints_target_public_hosts() {
		let endpoints = ServiceEndpoints::default();

		assert_eq!(
			endpoints.discovery_url().expect("Discovery URL should build.").as_str(),
			"https://iam.cloud.ibm.com/identity/.well-known/openid-configuration",
		);
		assert_eq!(
			endpoints.accounts_url().expect("Accounts URL should build.").as_str(),
			"https://accounts.cloud.ibm.com/coe/v2/accounts",
		);
		assert_eq!(
			endpoints.resource_keys_url().expect("Resource keys URL should build.").as_str(),
			"https://resource-controller.cloud.ibm.com/v2/resource_keys",
		);
	}

	#[test]
	fn page_urls_follow_provider_conventions() {
		let endpoints = ServiceEndpoints::default();

		assert_eq!(
			endpoints
				.accounts_page_url("?next_docid=abc")
				.expect("Accounts page URL should build.")
				.as_str(),
			"https://accounts.cloud.ibm.com/coe/v2/accounts?next_docid=abc",
		);
		assert_eq!(
			endpoints
				.resource_controller_page_url("/v2/resource_instances?start=xyz&limit=100")
				.expect("Resource controller page URL should build.")
				.as_str(),
			"https://resource-controller.cloud.ibm.com/v2/resource_instances?start=xyz&limit=100",
		);
	}

	#[test]
	fn join_preserves_root_path_prefix() {
		let root = Url::parse("https://proxy.example.com/ibm/").expect("Root should parse.");

		assert_eq!(
			join(&root, RESOURCE_INSTANCES_PATH).expect("Joined URL should build.").as_str(),
			"https://proxy.example.com/ibm/v2/resource_instances",
		);
	}

	#[test]
	fn deserialization_validates_roots() {
		let endpoints: ServiceEndpoints = serde_json::from_str(
			r#"{"identity":"https://iam.test.cloud.ibm.com","accounts":"https://accounts.test.cloud.ibm.com","resource_controller":"http://localhost:8080"}"#,
		)
		.expect("HTTP(S) roots should deserialize.");

		assert_eq!(endpoints.resource_controller.as_str(), "http://localhost:8080/");

		let err = serde_json::from_str::<ServiceEndpoints>(
			r#"{"identity":"https://iam.cloud.ibm.com","accounts":"ftp://accounts.example.com","resource_controller":"https://resource-controller.cloud.ibm.com"}"#,
		)
		.expect_err("Non-HTTP roots must be rejected during deserialization.");

		assert!(err.to_string().contains("accounts"));
	}

	#[test]
	fn default_client_uses_bx_credentials() {
		let creds = IamClientCredentials::default();

		assert_eq!(creds.basic_credentials(), "Yng6Yng=");
		assert!(format!("{creds:?}").contains("client_secret: \"<redacted>\""));
	}
}
