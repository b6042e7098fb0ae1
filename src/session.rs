//! Token lifecycle on top of [`CloudClient`]: login, persistence, and preemptive refresh.
//!
//! A [`Session`] owns one [`StoredToken`] for a profile. [`Session::access_token`] hands
//! out the current access token and refreshes it through the IAM refresh grant once the
//! token is about to expire. Concurrent callers wait on a single in-flight refresh instead
//! of issuing their own. Every new token is written through to the configured
//! [`TokenStore`] so the next process can [`Session::restore`] it.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, ProfileId, Token, TokenSecret},
	client::CloudClient,
	error::ConfigError,
	http::ApiHttpClient,
	store::{StoredToken, TokenStore},
};

/// Logged-in IAM session bound to a store profile.
pub struct Session<C>
where
	C: ?Sized + ApiHttpClient,
{
	client: CloudClient<C>,
	store: Arc<dyn TokenStore>,
	state: RwLock<StoredToken>,
	refresh_guard: AsyncMutex<()>,
	refresh_window: Duration,
	refresh_metrics: RefreshMetrics,
}
impl<C> Session<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Tokens expiring sooner than this are refreshed before being handed out.
	pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::seconds(60);

	/// Discovers the token endpoint, exchanges `api_key` for a token, and persists it.
	pub async fn login_with_api_key(
		client: CloudClient<C>,
		store: Arc<dyn TokenStore>,
		profile: ProfileId,
		api_key: &str,
	) -> Result<Self> {
		let token_endpoint = client.identity_endpoints().await?.token_endpoint;
		let token = client.token_from_api_key(&token_endpoint, api_key).await?;

		Self::establish(client, store, StoredToken::new(profile, token_endpoint, None, token))
			.await
	}

	/// Discovers the token endpoint, exchanges a one-time `passcode` for a token, and persists it.
	pub async fn login_with_passcode(
		client: CloudClient<C>,
		store: Arc<dyn TokenStore>,
		profile: ProfileId,
		passcode: &str,
	) -> Result<Self> {
		let token_endpoint = client.identity_endpoints().await?.token_endpoint;
		let token = client.token_from_passcode(&token_endpoint, passcode).await?;

		Self::establish(client, store, StoredToken::new(profile, token_endpoint, None, token))
			.await
	}

	/// Rebuilds a session from the record stored under `profile`.
	///
	/// Returns `Ok(None)` when the store has nothing for that profile. The restored token is
	/// not validated here; the next [`Session::access_token`] call refreshes it if needed.
	pub async fn restore(
		client: CloudClient<C>,
		store: Arc<dyn TokenStore>,
		profile: &ProfileId,
	) -> Result<Option<Self>> {
		let Some(record) = store.fetch(profile).await? else {
			return Ok(None);
		};

		Ok(Some(Self::from_record(client, store, record)))
	}

	/// Overrides how close to expiry a token may get before it is refreshed.
	pub fn with_refresh_window(mut self, window: Duration) -> Self {
		self.refresh_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Client the session issues grants through.
	pub fn client(&self) -> &CloudClient<C> {
		&self.client
	}

	/// Profile the session persists under.
	pub fn profile(&self) -> ProfileId {
		self.state.read().profile.clone()
	}

	/// Billing account the current token is bound to, if any.
	pub fn account(&self) -> Option<AccountId> {
		self.state.read().account.clone()
	}

	/// Snapshot of the current token without refreshing it.
	pub fn token(&self) -> Token {
		self.state.read().token.clone()
	}

	/// Refresh counters for this session.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	/// Returns a usable access token, refreshing it first when it is about to expire.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		if let Some(secret) = self.fresh_access_token(OffsetDateTime::now_utc()) {
			return Ok(secret);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited on the guard.
		if let Some(secret) = self.fresh_access_token(OffsetDateTime::now_utc()) {
			return Ok(secret);
		}

		let account = self.account();
		let record = self.refresh(account).await?;

		Ok(record.token.access_token)
	}

	/// Re-issues the token bound to `account` and persists the result.
	pub async fn switch_account(&self, account: AccountId) -> Result<()> {
		let _singleflight = self.refresh_guard.lock().await;

		self.refresh(Some(account)).await?;

		Ok(())
	}

	/// Removes the persisted record for this session's profile.
	pub async fn logout(self) -> Result<()> {
		let profile = self.profile();

		self.store.clear(&profile).await?;

		Ok(())
	}

	async fn establish(
		client: CloudClient<C>,
		store: Arc<dyn TokenStore>,
		record: StoredToken,
	) -> Result<Self> {
		store.save(record.clone()).await?;

		Ok(Self::from_record(client, store, record))
	}

	fn from_record(client: CloudClient<C>, store: Arc<dyn TokenStore>, record: StoredToken) -> Self {
		Self {
			client,
			store,
			state: RwLock::new(record),
			refresh_guard: AsyncMutex::new(()),
			refresh_window: Self::DEFAULT_REFRESH_WINDOW,
			refresh_metrics: RefreshMetrics::default(),
		}
	}

	fn fresh_access_token(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		let state = self.state.read();

		state
			.token
			.is_fresh_at(now, self.refresh_window)
			.then(|| state.token.access_token.clone())
	}

	// Callers must hold `refresh_guard`.
	async fn refresh(&self, account: Option<AccountId>) -> Result<StoredToken> {
		let (profile, token_endpoint, refresh_token) = {
			let state = self.state.read();
			let refresh_token = state
				.token
				.refresh_token
				.clone()
				.filter(|secret| !secret.is_empty())
				.ok_or(ConfigError::MissingRefreshToken)?;

			(state.profile.clone(), state.token_endpoint.clone(), refresh_token)
		};

		self.refresh_metrics.record_attempt();

		let result = self.rotate(profile, token_endpoint, refresh_token, account).await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		result
	}

	async fn rotate(
		&self,
		profile: ProfileId,
		token_endpoint: Url,
		refresh_token: TokenSecret,
		account: Option<AccountId>,
	) -> Result<StoredToken> {
		let mut token = self
			.client
			.upgrade_token(&token_endpoint, refresh_token.expose(), account.as_ref())
			.await?;

		// IAM may omit the refresh token on rotation; keep the previous one in that case.
		if !token.can_refresh() {
			token.refresh_token = Some(refresh_token);
		}

		let record = StoredToken::new(profile, token_endpoint, account, token);

		self.store.save(record.clone()).await?;
		*self.state.write() = record.clone();

		Ok(record)
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.read();

		f.debug_struct("Session")
			.field("profile", &state.profile)
			.field("account", &state.account)
			.field("token", &state.token)
			.field("refresh_window", &self.refresh_window)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		http::{ApiRequest, ApiResponse, HttpFuture},
		store::MemoryStore,
	};

	struct UnreachableHttpClient;
	impl ApiHttpClient for UnreachableHttpClient {
		fn execute(&self, _request: ApiRequest) -> HttpFuture<'_> {
			Box::pin(async { Ok(ApiResponse { status: 599, ..Default::default() }) })
		}
	}

	fn record(expiration: i64, refresh: Option<&str>) -> StoredToken {
		StoredToken::new(
			ProfileId::new("default").expect("Profile fixture should be valid."),
			Url::parse("https://iam.example.com/identity/token")
				.expect("Token endpoint fixture should parse."),
			None,
			Token {
				access_token: TokenSecret::new("cached-access"),
				refresh_token: refresh.map(TokenSecret::new),
				token_type: "Bearer".into(),
				expires_in: 3600,
				expiration,
				scope: None,
			},
		)
	}

	fn session(record: StoredToken) -> Session<UnreachableHttpClient> {
		let client = CloudClient::with_http_client(Default::default(), UnreachableHttpClient);

		Session::from_record(client, Arc::new(MemoryStore::default()), record)
	}

	#[tokio::test]
	async fn fresh_token_is_returned_without_refresh() {
		let expiration = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();
		let session = session(record(expiration, Some("refresh")));
		let secret = session.access_token().await.expect("Fresh token should be returned as-is.");

		assert_eq!(secret.expose(), "cached-access");
		assert_eq!(session.refresh_metrics().attempts(), 0);
	}

	#[tokio::test]
	async fn expiring_token_without_refresh_token_is_rejected() {
		let expiration = (OffsetDateTime::now_utc() + Duration::seconds(30)).unix_timestamp();
		let session = session(record(expiration, None));
		let err = session
			.access_token()
			.await
			.expect_err("Token inside the refresh window without a refresh token must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
		assert_eq!(session.refresh_metrics().attempts(), 0);
	}

	#[test]
	fn negative_refresh_window_clamps_to_zero() {
		let session = session(record(0, None)).with_refresh_window(Duration::seconds(-5));

		assert_eq!(session.refresh_window, Duration::ZERO);
	}
}
