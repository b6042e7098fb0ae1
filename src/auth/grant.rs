//! IAM grant types accepted by the token endpoint.

// self
use crate::_prelude::*;

/// Grant types the IAM token endpoint accepts from this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// One-time passcode obtained from an interactive browser login.
	Passcode,
	/// Long-lived API key for non-interactive logins.
	ApiKey,
	/// Refresh token grant, optionally re-scoped to a billing account.
	RefreshToken,
}
impl GrantType {
	/// Returns the `grant_type` form value IAM expects.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::Passcode => "urn:ibm:params:oauth:grant-type:passcode",
			GrantType::ApiKey => "urn:ibm:params:oauth:grant-type:apikey",
			GrantType::RefreshToken => "refresh_token",
		}
	}

	/// Name of the form field carrying the grant's credential.
	pub const fn credential_field(self) -> &'static str {
		match self {
			GrantType::Passcode => "passcode",
			GrantType::ApiKey => "apikey",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_values_match_iam_urns() {
		assert_eq!(GrantType::Passcode.as_str(), "urn:ibm:params:oauth:grant-type:passcode");
		assert_eq!(GrantType::ApiKey.credential_field(), "apikey");
		assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
	}
}
