//! Client-level error types shared across the request layer, endpoint calls, and stores.

// self
use crate::{_prelude::*, auth::IdentifierError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Response body did not match the expected JSON shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
impl Error {
	/// Returns the HTTP status attached to the failure, if the provider answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(e) => Some(e.status),
			Self::Decode(e) => Some(e.status),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised before a request leaves the process.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request could not be assembled from the supplied parts.
	#[error("HTTP request could not be built.")]
	HttpRequest {
		/// Underlying request builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint URL uses a scheme other than HTTP(S) or lacks a host.
	#[error("The {endpoint} endpoint must be an absolute HTTP(S) URL: {url}.")]
	UnsupportedEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	SerializeBody(#[source] serde_json::Error),
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Stored token cannot be refreshed.
	#[error("Token is missing a refresh token.")]
	MissingRefreshToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a request builder failure inside [`ConfigError`].
	pub fn http_request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpRequest { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete within the client's timeout.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Request URL.
		url: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Non-success response decoded from the provider's error envelope.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Request failed with HTTP {status}: {message}.")]
pub struct ApiError {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// First message found in the error envelope, or `unknown`.
	pub message: String,
	/// Provider error code accompanying the message, when present.
	pub code: Option<String>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}
impl ApiError {
	/// Returns `true` when the provider rejected the credentials (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Returns `true` when the provider asked the caller to slow down (HTTP 429).
	pub fn is_rate_limited(&self) -> bool {
		self.status == 429
	}

	/// Returns `true` for 5xx responses.
	pub fn is_server_error(&self) -> bool {
		(500..600).contains(&self.status)
	}
}

/// JSON decode failure with the path to the offending field.
#[derive(Debug, ThisError)]
#[error("Response body from HTTP {status} could not be decoded.")]
pub struct DecodeError {
	/// HTTP status code of the response being decoded.
	pub status: u16,
	/// Structured parsing failure.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}
impl DecodeError {
	/// Dotted path of the field that failed to decode (`.` for the root).
	pub fn path(&self) -> String {
		self.source.path().to_string()
	}
}

/// Error envelope returned by IBM Cloud services on non-success responses.
///
/// The account service answers with `error[]`, the resource controller with `errors[]`,
/// and IAM with flat `errorCode`/`errorMessage` fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
	/// Account-service style error list.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<Vec<ErrorDetail>>,
	/// Resource-controller style error list.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<ErrorDetail>>,
	/// IAM error code.
	#[serde(default, rename = "errorCode", skip_serializing_if = "Option::is_none")]
	pub error_code: Option<String>,
	/// IAM error message.
	#[serde(default, rename = "errorMessage", skip_serializing_if = "Option::is_none")]
	pub error_message: Option<String>,
}
impl ErrorMessage {
	const UNKNOWN: &'static str = "unknown";

	/// Splits the envelope into `(code, message)` using the first populated shape.
	pub fn into_parts(self) -> (Option<String>, String) {
		let first = |list: Option<Vec<ErrorDetail>>| list.and_then(|l| l.into_iter().next());

		if let Some(detail) = first(self.error) {
			return (detail.code, detail.message);
		}
		if let Some(detail) = first(self.errors) {
			return (detail.code, detail.message);
		}
		if let Some(message) = self.error_message {
			return (self.error_code, message);
		}

		(None, Self::UNKNOWN.into())
	}
}

/// Single entry of an [`ErrorMessage`] list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
	/// Provider error code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Human-readable message.
	#[serde(default)]
	pub message: String,
}
