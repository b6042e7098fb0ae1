//! Resource keys (service credentials): lookup by name + source CRN, and creation.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Crn, TokenSecret},
	client::CloudClient,
	http::{ApiHttpClient, Authorization},
	obs::{self, ApiOperation},
};

/// Query for [`CloudClient::resource_keys`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetCredentialsParams {
	/// Resource key name.
	pub name: String,
	/// CRN of the instance the key belongs to.
	pub crn: Crn,
}
impl GetCredentialsParams {
	/// Creates a lookup for the key `name` on instance `crn`.
	pub fn new(name: impl Into<String>, crn: Crn) -> Self {
		Self { name: name.into(), crn }
	}
}

/// Body for [`CloudClient::create_resource_key`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateCredentialParams {
	/// Resource key name.
	pub name: String,
	/// CRN of the instance the key is created for.
	pub source: Crn,
	/// IAM role (name or CRN) granted to the key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	/// Service-specific creation parameters.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parameters: Option<CredentialParameters>,
}
impl CreateCredentialParams {
	/// Creates a key request for `source` named `name`.
	pub fn new(name: impl Into<String>, source: Crn) -> Self {
		Self { name: name.into(), source, role: None, parameters: None }
	}

	/// Sets the IAM role granted to the key.
	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.role = Some(role.into());

		self
	}

	/// Requests Cloud Object Storage HMAC keys alongside the API key.
	pub fn with_hmac(mut self) -> Self {
		self.parameters.get_or_insert_with(CredentialParameters::default).hmac = Some(true);

		self
	}

	/// Adds an arbitrary service-specific parameter.
	pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.parameters
			.get_or_insert_with(CredentialParameters::default)
			.extra
			.insert(key.into(), value.into());

		self
	}
}

/// Service-specific parameters attached to a key creation request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialParameters {
	/// Cloud Object Storage HMAC key flag.
	#[serde(default, rename = "HMAC", skip_serializing_if = "Option::is_none")]
	pub hmac: Option<bool>,
	/// Remaining parameters.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// One page of resource keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
	/// Number of rows on this page.
	#[serde(default)]
	pub rows_count: u64,
	/// Controller-relative path of the next page.
	#[serde(default)]
	pub next_url: Option<String>,
	/// Keys on this page.
	#[serde(default)]
	pub resources: Vec<Credential>,
}

/// Resource key record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
	/// Key identifier (the key's CRN).
	#[serde(default)]
	pub id: String,
	/// Key GUID.
	#[serde(default)]
	pub guid: String,
	/// Key CRN.
	#[serde(default)]
	pub crn: String,
	/// Controller-relative self link.
	#[serde(default)]
	pub url: String,
	/// Key name.
	#[serde(default)]
	pub name: String,
	/// Owning account.
	#[serde(default)]
	pub account_id: String,
	/// Owning resource group.
	#[serde(default)]
	pub resource_group_id: String,
	/// CRN of the instance the key belongs to.
	#[serde(default)]
	pub source_crn: String,
	/// Lifecycle state.
	#[serde(default)]
	pub state: String,
	/// IAM role granted to the key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	/// Creation timestamp as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
	/// Secret material issued for the key.
	#[serde(default)]
	pub credentials: CredentialDetails,
}

/// Secret payload of a [`Credential`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialDetails {
	/// Service API key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub apikey: Option<TokenSecret>,
	/// Service endpoint catalog URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoints: Option<String>,
	/// Description of the generated API key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iam_apikey_description: Option<String>,
	/// Name of the generated API key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iam_apikey_name: Option<String>,
	/// CRN of the granted role.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iam_role_crn: Option<String>,
	/// CRN of the service ID backing the key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iam_serviceid_crn: Option<String>,
	/// Instance the key belongs to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_instance_id: Option<String>,
	/// HMAC key pair, present when requested with [`CreateCredentialParams::with_hmac`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cos_hmac_keys: Option<HmacKeys>,
	/// Remaining service-specific fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// S3-compatible HMAC key pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacKeys {
	/// Access key identifier.
	pub access_key_id: String,
	/// Secret access key.
	pub secret_access_key: TokenSecret,
}

impl<C> CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Looks up resource keys named `params.name` on instance `params.crn`.
	pub async fn resource_keys(
		&self,
		access_token: &str,
		params: &GetCredentialsParams,
	) -> Result<Credentials> {
		obs::observe(ApiOperation::ListResourceKeys, "resource_keys", async move {
			let mut url = self.endpoints.resource_keys_url()?;

			url.query_pairs_mut()
				.append_pair("name", &params.name)
				.append_pair("source_crn", &params.crn);

			self.fetch(url, &Authorization::Bearer(access_token.to_owned())).await
		})
		.await
	}

	/// Creates a resource key.
	pub async fn create_resource_key(
		&self,
		access_token: &str,
		params: &CreateCredentialParams,
	) -> Result<Credential> {
		obs::observe(ApiOperation::CreateResourceKey, "create_resource_key", async move {
			let url = self.endpoints.resource_keys_url()?;

			self.post_json(url, &Authorization::Bearer(access_token.to_owned()), params).await
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn crn() -> Crn {
		Crn::new("crn:v1:bluemix:public:cloud-object-storage:global:a/acc:guid-1::")
			.expect("CRN fixture should be valid.")
	}

	#[test]
	fn create_params_serialize_hmac_flag() {
		let params = CreateCredentialParams::new("cacli-key", crn()).with_role("Writer").with_hmac();
		let payload = serde_json::to_value(&params).expect("Params should serialize.");

		assert_eq!(
			payload,
			serde_json::json!({
				"name": "cacli-key",
				"source": "crn:v1:bluemix:public:cloud-object-storage:global:a/acc:guid-1::",
				"role": "Writer",
				"parameters": {"HMAC": true}
			})
		);
	}

	#[test]
	fn create_params_omit_empty_optionals() {
		let params = CreateCredentialParams::new("plain", crn()).with_parameter("service-endpoints", "private");
		let payload = serde_json::to_value(&params).expect("Params should serialize.");

		assert!(payload.get("role").is_none());
		assert_eq!(payload["parameters"], serde_json::json!({"service-endpoints": "private"}));
	}

	#[test]
	fn credential_payload_decodes_hmac_keys() {
		let credential: Credential = serde_json::from_str(
			r#"{
				"guid": "key-1",
				"name": "cacli-key",
				"source_crn": "crn:v1:bluemix:public:cloud-object-storage:global:a/acc:guid-1::",
				"state": "active",
				"credentials": {
					"apikey": "service-api-key",
					"cos_hmac_keys": {"access_key_id": "AKID", "secret_access_key": "SECRET"},
					"iam_apikey_name": "auto-generated",
					"custom": 1
				}
			}"#,
		)
		.expect("Credential payload should decode.");
		let hmac = credential.credentials.cos_hmac_keys.as_ref().expect("HMAC keys should decode.");

		assert_eq!(hmac.access_key_id, "AKID");
		assert_eq!(hmac.secret_access_key.expose(), "SECRET");
		assert!(!format!("{credential:?}").contains("service-api-key"));
		assert_eq!(credential.credentials.extra.get("custom"), Some(&Value::from(1)));
	}
}
