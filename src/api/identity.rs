//! OpenID configuration discovery for the IAM OAuth endpoints.

// self
use crate::{
	_prelude::*,
	client::CloudClient,
	http::{ApiHttpClient, Authorization},
	obs::{self, ApiOperation},
};

/// Subset of the IAM OpenID configuration document used by the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEndpoints {
	/// Issuer identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub issuer: Option<Url>,
	/// Browser authorization endpoint.
	pub authorization_endpoint: Url,
	/// Token endpoint accepting every IAM grant.
	pub token_endpoint: Url,
	/// Page that hands out one-time passcodes after a browser login.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub passcode_endpoint: Option<Url>,
	/// OpenID userinfo endpoint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub userinfo_endpoint: Option<Url>,
	/// Signing key set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jwks_uri: Option<Url>,
	/// Grant types advertised by IAM.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub grant_types_supported: Vec<String>,
}

impl<C> CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Fetches the IAM OpenID configuration (unauthenticated).
	pub async fn identity_endpoints(&self) -> Result<IdentityEndpoints> {
		obs::observe(ApiOperation::IdentityDiscovery, "identity_endpoints", async move {
			let url = self.endpoints.discovery_url()?;

			self.fetch(url, &Authorization::None).await
		})
		.await
	}
}
