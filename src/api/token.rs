//! IAM token grants: passcode, API key, and refresh (optionally bound to an account).
//!
//! Every grant is a form-encoded POST to the discovered token endpoint, authenticated with
//! the IAM client credentials over HTTP Basic.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, GrantType, Token},
	client::CloudClient,
	http::ApiHttpClient,
	obs::{self, ApiOperation},
};

const BSS_ACCOUNT_FIELD: &str = "bss_account";

impl<C> CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Exchanges a one-time passcode for a token.
	pub async fn token_from_passcode(&self, token_endpoint: &Url, passcode: &str) -> Result<Token> {
		obs::observe(
			ApiOperation::PasscodeGrant,
			"token_from_passcode",
			self.request_token(token_endpoint, GrantType::Passcode, passcode, None),
		)
		.await
	}

	/// Exchanges an API key for a token.
	pub async fn token_from_api_key(&self, token_endpoint: &Url, api_key: &str) -> Result<Token> {
		obs::observe(
			ApiOperation::ApiKeyGrant,
			"token_from_api_key",
			self.request_token(token_endpoint, GrantType::ApiKey, api_key, None),
		)
		.await
	}

	/// Refreshes a token, binding the new one to `account` when provided.
	pub async fn upgrade_token(
		&self,
		token_endpoint: &Url,
		refresh_token: &str,
		account: Option<&AccountId>,
	) -> Result<Token> {
		obs::observe(
			ApiOperation::RefreshGrant,
			"upgrade_token",
			self.request_token(token_endpoint, GrantType::RefreshToken, refresh_token, account),
		)
		.await
	}

	async fn request_token(
		&self,
		token_endpoint: &Url,
		grant: GrantType,
		credential: &str,
		account: Option<&AccountId>,
	) -> Result<Token> {
		let mut form = vec![("grant_type", grant.as_str()), (grant.credential_field(), credential)];

		if let Some(account) = account {
			form.push((BSS_ACCOUNT_FIELD, account.as_ref()));
		}

		self.post_form(token_endpoint.clone(), &self.basic_auth(), &form).await
	}
}
