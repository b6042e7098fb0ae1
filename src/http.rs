//! Transport primitives for IAM, account, and resource-controller calls.
//!
//! The module exposes [`ApiHttpClient`] alongside the owned [`ApiRequest`] /
//! [`ApiResponse`] pair so downstream crates can plug in a custom HTTP stack (a proxy-aware
//! client, a recording transport for tests) without touching the endpoint layer.
//! [`ReqwestHttpClient`] is the default implementation.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing a single API request.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared behind an `Arc`
/// by [`CloudClient`](crate::client::CloudClient) and the futures they return must be
/// `Send`. Transport failures should be reported as
/// [`TransportError`](crate::error::TransportError) values; any response that reached the
/// client, successful or not, must be returned as an [`ApiResponse`] so the request layer
/// can decode the provider's error envelope.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the full response body.
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_>;
}

/// HTTP methods used by the API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
}
impl HttpMethod {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// `Authorization` header variants injected by the request layer.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
	/// No header.
	None,
	/// `Authorization: Bearer <token>`.
	Bearer(String),
	/// `Authorization: Basic <base64 credentials>`.
	Basic(String),
}
impl Authorization {
	/// Returns the header value, or `None` for [`Authorization::None`].
	pub fn header_value(&self) -> Option<String> {
		match self {
			Self::None => None,
			Self::Bearer(token) => Some(format!("Bearer {token}")),
			Self::Basic(credentials) => Some(format!("Basic {credentials}")),
		}
	}
}
impl Debug for Authorization {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::None => f.write_str("None"),
			Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
			Self::Basic(_) => f.write_str("Basic(<redacted>)"),
		}
	}
}

/// Owned request handed to an [`ApiHttpClient`].
#[derive(Clone)]
pub struct ApiRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Fully resolved request URL, query included.
	pub url: Url,
	/// Header pairs, applied in order.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a bodiless request with an `Accept: application/json` header.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: vec![("accept".into(), "application/json".into())], body: None }
	}

	/// Appends a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Injects the `Authorization` header, if any.
	pub fn authorization(self, auth: &Authorization) -> Self {
		match auth.header_value() {
			Some(value) => self.header("authorization", value),
			None => self,
		}
	}

	/// Attaches a body together with its content type.
	pub fn body(self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
		let mut request = self.header("content-type", content_type);

		request.body = Some(body);

		request
	}

	/// Looks up the first header with the provided (case-insensitive) name.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers = self
			.headers
			.iter()
			.map(|(name, value)| {
				let shown = if name.eq_ignore_ascii_case("authorization") {
					"<redacted>"
				} else {
					value.as_str()
				};

				(name.as_str(), shown)
			})
			.collect::<Vec<_>>();

		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Buffered response returned by an [`ApiHttpClient`].
#[derive(Clone, Debug, Default)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for any 2xx status.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Looks up a header by lowercase name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}

	/// Extracts the metadata used for error reporting.
	pub fn metadata(&self) -> ResponseMetadata {
		ResponseMetadata {
			status: Some(self.status),
			retry_after: self.header("retry-after").and_then(parse_retry_after),
		}
	}
}

/// Captures metadata from a response for downstream error mapping.
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client has no overall timeout, matching the provider's long-running
/// resource-controller listings. Wrap a configured [`ReqwestClient`] with
/// [`ReqwestHttpClient::with_client`] to impose one.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let ApiRequest { method, url, headers, body } = request;
			let method = match method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
				HttpMethod::Put => reqwest::Method::PUT,
			};
			let mut builder = self.0.request(method, url.clone());

			for (name, value) in headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(|err| map_reqwest_error(&url, err))?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body =
				response.bytes().await.map_err(|err| map_reqwest_error(&url, err))?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(url: &Url, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::http_request(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { url: url.to_string() }.into();
	}

	TransportError::network(url, err).into()
}

fn parse_retry_after(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url() -> Url {
		Url::parse("https://iam.example.com/identity/token").expect("Fixture URL should parse.")
	}

	#[test]
	fn authorization_header_values() {
		assert_eq!(Authorization::None.header_value(), None);
		assert_eq!(
			Authorization::Bearer("abc".into()).header_value().as_deref(),
			Some("Bearer abc")
		);
		assert_eq!(
			Authorization::Basic("Yng6Yng=".into()).header_value().as_deref(),
			Some("Basic Yng6Yng=")
		);
	}

	#[test]
	fn request_debug_redacts_authorization() {
		let request = ApiRequest::new(HttpMethod::Post, url())
			.authorization(&Authorization::Bearer("top-secret".into()))
			.body("application/json", b"{}".to_vec());
		let debug = format!("{request:?}");

		assert!(!debug.contains("top-secret"));
		assert_eq!(request.header_value("Content-Type"), Some("application/json"));
		assert_eq!(request.header_value("authorization"), Some("Bearer top-secret"));
	}

	#[test]
	fn metadata_parses_retry_after_seconds() {
		let response = ApiResponse {
			status: 429,
			headers: BTreeMap::from_iter([("retry-after".into(), " 12 ".into())]),
			body: Vec::new(),
		};
		let meta = response.metadata();

		assert!(!response.is_success());
		assert_eq!(meta.status, Some(429));
		assert_eq!(meta.retry_after, Some(Duration::seconds(12)));
	}

	#[test]
	fn retry_after_ignores_past_dates_and_garbage() {
		assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
		assert_eq!(parse_retry_after("soon"), None);
	}

	#[test]
	fn retry_after_accepts_future_http_dates() {
		let moment = OffsetDateTime::now_utc() + Duration::hours(1);
		let header = moment
			.format(&Rfc2822)
			.expect("Future instant should format as an RFC 2822 date.")
			.replace("+0000", "GMT");
		let delay = parse_retry_after(&header).expect("Future HTTP-date should yield a delay.");

		assert!(delay.is_positive());
		assert!(delay <= Duration::hours(1));
		assert!(delay > Duration::minutes(58));
	}
}
