//! Bearer token issued by the IAM token endpoint, plus lifecycle helpers.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Current lifecycle status for a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token reached its expiration instant.
	Expired,
	/// Response carried no usable expiration; treat as expired.
	Unknown,
}

/// Token response returned by every IAM grant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if IAM issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Token type, normally `Bearer`.
	#[serde(default)]
	pub token_type: String,
	/// Lifetime in seconds relative to issuance.
	#[serde(default)]
	pub expires_in: i64,
	/// Absolute expiry as a Unix timestamp.
	#[serde(default)]
	pub expiration: i64,
	/// Space-delimited scopes granted to the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}
impl Token {
	/// Absolute expiry instant, when `expiration` is a valid timestamp.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		if self.expiration <= 0 {
			return None;
		}

		OffsetDateTime::from_unix_timestamp(self.expiration).ok()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		match self.expires_at() {
			Some(expires_at) if instant < expires_at => TokenStatus::Active,
			Some(_) => TokenStatus::Expired,
			None => TokenStatus::Unknown,
		}
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token is active at `instant` and stays active for at least `window`.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, window: Duration) -> bool {
		match self.expires_at() {
			Some(expires_at) => expires_at - instant > window,
			None => false,
		}
	}

	/// Returns `true` when a non-empty refresh token is available.
	pub fn can_refresh(&self) -> bool {
		self.refresh_token.as_ref().is_some_and(|secret| !secret.is_empty())
	}

	/// Formats the `Authorization` header value for this token.
	pub fn authorization_header(&self) -> String {
		let kind = if self.token_type.is_empty() { "Bearer" } else { self.token_type.as_str() };

		format!("{kind} {}", self.access_token.expose())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("expiration", &self.expiration)
			.field("scope", &self.scope)
			.finish()
	}
}
