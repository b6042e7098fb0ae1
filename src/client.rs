//! Shared request layer: auth header injection, JSON decode on 2xx, and error-envelope
//! decode on everything else.
//!
//! [`CloudClient`] owns the transport, endpoint set, and IAM client credentials. Endpoint
//! calls in [`crate::api`] are implemented as further `impl CloudClient` blocks on top of the
//! four helpers defined here ([`CloudClient::fetch`], [`CloudClient::post_form`],
//! [`CloudClient::post_json`], [`CloudClient::put_body`]).

// crates.io
use serde::de::DeserializeOwned;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	config::{IamClientCredentials, ServiceEndpoints},
	error::{ApiError, ConfigError, DecodeError, ErrorMessage},
	http::{ApiHttpClient, ApiRequest, ApiResponse, Authorization, HttpMethod},
	obs::{self, ApiOperation},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestCloudClient = CloudClient<ReqwestHttpClient>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Entry point for every IAM, account, and resource-controller call.
pub struct CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// API roots the client talks to.
	pub endpoints: ServiceEndpoints,
	/// OAuth client presented to the IAM token endpoint.
	pub iam_client: IamClientCredentials,
}
impl<C> CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(endpoints: ServiceEndpoints, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			endpoints,
			iam_client: IamClientCredentials::default(),
		}
	}

	/// Replaces the IAM client credentials (defaults to the public `bx` client).
	pub fn with_iam_client(mut self, iam_client: IamClientCredentials) -> Self {
		self.iam_client = iam_client;

		self
	}

	/// Issues a GET and decodes the JSON response.
	pub async fn fetch<T>(&self, url: Url, auth: &Authorization) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(ApiRequest::new(HttpMethod::Get, url).authorization(auth)).await
	}

	/// POSTs a form-encoded body and decodes the JSON response.
	pub async fn post_form<T>(&self, url: Url, auth: &Authorization, form: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let body = form_urlencoded::Serializer::new(String::new())
			.extend_pairs(form.iter().copied())
			.finish();
		let request = ApiRequest::new(HttpMethod::Post, url)
			.authorization(auth)
			.body(FORM_CONTENT_TYPE, body.into_bytes());

		self.send(request).await
	}

	/// POSTs a JSON body and decodes the JSON response.
	pub async fn post_json<T, B>(&self, url: Url, auth: &Authorization, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::SerializeBody)?;
		let request = ApiRequest::new(HttpMethod::Post, url)
			.authorization(auth)
			.body(JSON_CONTENT_TYPE, body);

		self.send(request).await
	}

	/// PUTs a raw body (file upload) and decodes the JSON response.
	pub async fn put_body<T>(
		&self,
		url: Url,
		auth: &Authorization,
		content_type: &str,
		body: Vec<u8>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request =
			ApiRequest::new(HttpMethod::Put, url).authorization(auth).body(content_type, body);

		self.send(request).await
	}

	/// Uploads a raw body with a bearer token, recording the call under [`ApiOperation::Upload`].
	pub async fn upload<T>(
		&self,
		url: Url,
		access_token: &str,
		content_type: &str,
		body: Vec<u8>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		obs::observe(ApiOperation::Upload, "upload", async move {
			let auth = Authorization::Bearer(access_token.to_owned());

			self.put_body(url, &auth, content_type, body).await
		})
		.await
	}

	pub(crate) fn basic_auth(&self) -> Authorization {
		Authorization::Basic(self.iam_client.basic_credentials())
	}

	async fn send<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.http_client.execute(request).await?;

		decode_response(response)
	}
}
#[cfg(feature = "reqwest")]
impl CloudClient<ReqwestHttpClient> {
	/// Creates a client for the public IBM Cloud endpoints backed by a default reqwest client.
	pub fn new() -> Self {
		Self::with_http_client(ServiceEndpoints::default(), ReqwestHttpClient::default())
	}
}
#[cfg(feature = "reqwest")]
impl Default for CloudClient<ReqwestHttpClient> {
	fn default() -> Self {
		Self::new()
	}
}
impl<C> Clone for CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			endpoints: self.endpoints.clone(),
			iam_client: self.iam_client.clone(),
		}
	}
}
impl<C> Debug for CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CloudClient")
			.field("endpoints", &self.endpoints)
			.field("iam_client", &self.iam_client)
			.finish()
	}
}

/// Decodes a 2xx body into `T`, or the provider's error envelope into an [`ApiError`].
pub fn decode_response<T>(response: ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	if response.is_success() {
		return Ok(decode_json(response.status, &response.body)?);
	}

	let meta = response.metadata();
	let envelope: ErrorMessage = decode_json(response.status, &response.body)?;
	let (code, message) = envelope.into_parts();

	Err(ApiError { status: response.status, message, code, retry_after: meta.retry_after }.into())
}

fn decode_json<T>(status: u16, body: &[u8]) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError { status, source })
}
