//! Storage contracts and built-in store implementations for session tokens.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, ProfileId, Token},
};

/// Boxed future returned by [`TokenStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by session token stores.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the record for `record.profile`.
	fn save(&self, record: StoredToken) -> StoreFuture<'_, ()>;

	/// Fetches the record stored under `profile`, if present.
	fn fetch<'a>(&'a self, profile: &'a ProfileId) -> StoreFuture<'a, Option<StoredToken>>;

	/// Removes and returns the record stored under `profile`.
	fn clear<'a>(&'a self, profile: &'a ProfileId) -> StoreFuture<'a, Option<StoredToken>>;
}

/// Token persisted between runs together with what is needed to refresh it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
	/// Profile the token belongs to.
	pub profile: ProfileId,
	/// Token endpoint the refresh grant is sent to.
	pub token_endpoint: Url,
	/// Billing account the token is bound to, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub account: Option<AccountId>,
	/// Token issued by IAM.
	pub token: Token,
	/// Instant the record was written.
	#[serde(with = "time::serde::timestamp")]
	pub saved_at: OffsetDateTime,
}
impl StoredToken {
	/// Builds a record stamped with the current clock.
	pub fn new(
		profile: ProfileId,
		token_endpoint: Url,
		account: Option<AccountId>,
		token: Token,
	) -> Self {
		Self { profile, token_endpoint, account, token, saved_at: OffsetDateTime::now_utc() }
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
