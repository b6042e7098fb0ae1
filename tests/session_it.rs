#![cfg(feature = "reqwest")]

// std
use std::{env, fs, process};
// crates.io
use httpmock::prelude::*;
// self
use ibmcloud_api::{
	_preludet::*,
	auth::{AccountId, ProfileId, Token, TokenSecret},
	error::ConfigError,
	session::Session,
	store::{FileStore, MemoryStore, StoredToken, TokenStore},
};

fn profile() -> ProfileId {
	ProfileId::new("default").expect("Profile fixture should be valid.")
}

fn token_body(access: &str, refresh: &str, lifetime: Duration) -> String {
	let expiration = (OffsetDateTime::now_utc() + lifetime).unix_timestamp();

	format!(
		"{{\"access_token\":\"{access}\",\"refresh_token\":\"{refresh}\",\"token_type\":\"Bearer\",\"expires_in\":{},\"expiration\":{expiration}}}",
		lifetime.whole_seconds(),
	)
}

async fn mock_discovery(server: &MockServer) -> httpmock::Mock<'_> {
	let body = format!(
		"{{\"authorization_endpoint\":\"{0}/identity/authorize\",\"token_endpoint\":\"{0}/identity/token\"}}",
		server.base_url(),
	);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/identity/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(&body);
		})
		.await
}

async fn seed(store: &MemoryStore, server: &MockServer, lifetime: Duration) {
	let expiration = (OffsetDateTime::now_utc() + lifetime).unix_timestamp();
	let record = StoredToken::new(
		profile(),
		Url::parse(&server.url("/identity/token")).expect("Mock token endpoint should parse."),
		None,
		Token {
			access_token: TokenSecret::new("access-seeded"),
			refresh_token: Some(TokenSecret::new("refresh-seeded")),
			token_type: "Bearer".into(),
			expires_in: lifetime.whole_seconds(),
			expiration,
			scope: None,
		},
	);

	store.save(record).await.expect("Failed to seed session record into the store.");
}

#[tokio::test]
async fn api_key_login_persists_token() {
	let server = MockServer::start_async().await;
	let discovery = mock_discovery(&server).await;
	let grant = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/token")
				.body("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey&apikey=my-key");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-login", "refresh-login", Duration::hours(1)));
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let session = Session::login_with_api_key(
		build_reqwest_test_client(&server.base_url()),
		store.clone(),
		profile(),
		"my-key",
	)
	.await
	.expect("API key login should succeed against the mock server.");

	discovery.assert_async().await;
	grant.assert_async().await;

	let secret = session.access_token().await.expect("Fresh token should be handed out.");

	assert_eq!(secret.expose(), "access-login");
	assert_eq!(session.refresh_metrics().attempts(), 0);

	let stored = store
		.fetch(&profile())
		.await
		.expect("Memory store fetch should succeed.")
		.expect("Login should persist the token.");

	assert_eq!(stored.token.access_token.expose(), "access-login");
	assert_eq!(stored.token_endpoint.path(), "/identity/token");
	assert_eq!(stored.account, None);
}

#[tokio::test]
async fn passcode_login_uses_passcode_grant() {
	let server = MockServer::start_async().await;
	let _discovery = mock_discovery(&server).await;
	let grant = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/token")
				.body("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Apasscode&passcode=XyZ123");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-passcode", "refresh-passcode", Duration::hours(1)));
		})
		.await;
	let session = Session::login_with_passcode(
		build_reqwest_test_client(&server.base_url()),
		Arc::new(MemoryStore::default()),
		profile(),
		"XyZ123",
	)
	.await
	.expect("Passcode login should succeed against the mock server.");

	grant.assert_async().await;

	assert_eq!(session.token().access_token.expose(), "access-passcode");
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());

	seed(&store, &server, Duration::seconds(10)).await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/token")
				.header("authorization", "Basic Yng6Yng=")
				.body("grant_type=refresh_token&refresh_token=refresh-seeded");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-refreshed", "refresh-rotated", Duration::hours(1)));
		})
		.await;
	let session =
		Session::restore(build_reqwest_test_client(&server.base_url()), store.clone(), &profile())
			.await
			.expect("Restore should succeed.")
			.expect("Seeded profile should be restored.");
	let (first, second) = tokio::join!(session.access_token(), session.access_token());
	let first = first.expect("First caller should receive the refreshed token.");
	let second = second.expect("Second caller should receive the refreshed token.");

	refresh.assert_calls_async(1).await;

	assert_eq!(first.expose(), "access-refreshed");
	assert_eq!(second.expose(), "access-refreshed");
	assert_eq!(session.refresh_metrics().attempts(), 1);
	assert_eq!(session.refresh_metrics().successes(), 1);

	let stored = store
		.fetch(&profile())
		.await
		.expect("Memory store fetch should succeed.")
		.expect("Refreshed token should stay persisted.");

	assert_eq!(
		stored.token.refresh_token.as_ref().map(TokenSecret::expose),
		Some("refresh-rotated")
	);
}

#[tokio::test]
async fn switch_account_binds_bss_account_and_persists() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());

	seed(&store, &server, Duration::hours(1)).await;

	let bound = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/token")
				.body("grant_type=refresh_token&refresh_token=refresh-seeded&bss_account=acc-42");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-acc-42", "refresh-acc-42", Duration::hours(1)));
		})
		.await;
	let session =
		Session::restore(build_reqwest_test_client(&server.base_url()), store.clone(), &profile())
			.await
			.expect("Restore should succeed.")
			.expect("Seeded profile should be restored.");
	let account = AccountId::new("acc-42").expect("Account fixture should be valid.");

	session.switch_account(account.clone()).await.expect("Account switch should succeed.");
	bound.assert_async().await;

	assert_eq!(session.account(), Some(account.clone()));
	assert_eq!(
		session.access_token().await.expect("Switched token should be fresh.").expose(),
		"access-acc-42"
	);

	let stored = store
		.fetch(&profile())
		.await
		.expect("Memory store fetch should succeed.")
		.expect("Switched token should be persisted.");

	assert_eq!(stored.account, Some(account));
}

#[tokio::test]
async fn refresh_without_refresh_token_fails_without_network() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());
	let record = StoredToken::new(
		profile(),
		Url::parse(&server.url("/identity/token")).expect("Mock token endpoint should parse."),
		None,
		Token {
			access_token: TokenSecret::new("access-expired"),
			refresh_token: None,
			token_type: "Bearer".into(),
			expires_in: 3600,
			expiration: 1,
			scope: None,
		},
	);

	store.save(record).await.expect("Failed to seed session record into the store.");

	let token_endpoint = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/token");
			then.status(500);
		})
		.await;
	let session =
		Session::restore(build_reqwest_test_client(&server.base_url()), store, &profile())
			.await
			.expect("Restore should succeed.")
			.expect("Seeded profile should be restored.");
	let err = session.access_token().await.expect_err("Expired token must not be handed out.");

	assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
	token_endpoint.assert_calls_async(0).await;
}

#[tokio::test]
async fn file_store_survives_process_restart() {
	let server = MockServer::start_async().await;
	let _discovery = mock_discovery(&server).await;
	let _grant = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-file", "refresh-file", Duration::hours(1)));
		})
		.await;
	let path = env::temp_dir().join(format!(
		"ibmcloud_api_session_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	));
	let store = Arc::new(FileStore::open(&path).expect("Failed to open file store."));
	let session = Session::login_with_api_key(
		build_reqwest_test_client(&server.base_url()),
		store,
		profile(),
		"file-key",
	)
	.await
	.expect("API key login should succeed against the mock server.");

	drop(session);

	let reopened = Arc::new(FileStore::open(&path).expect("Failed to reopen file store."));
	let restored =
		Session::restore(build_reqwest_test_client(&server.base_url()), reopened.clone(), &profile())
			.await
			.expect("Restore should succeed.")
			.expect("Persisted profile should be restored.");

	assert_eq!(
		restored.access_token().await.expect("Restored token should be fresh.").expose(),
		"access-file"
	);

	restored.logout().await.expect("Logout should clear the stored profile.");

	assert!(
		reopened
			.fetch(&profile())
			.await
			.expect("File store fetch should succeed.")
			.is_none()
	);

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn restore_returns_none_for_unknown_profile() {
	let server = MockServer::start_async().await;
	let restored = Session::restore(
		build_reqwest_test_client(&server.base_url()),
		Arc::new(MemoryStore::default()),
		&profile(),
	)
	.await
	.expect("Restore should succeed.");

	assert!(restored.is_none());
}
