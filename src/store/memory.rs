//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::ProfileId,
	store::{StoreFuture, StoredToken, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<ProfileId, StoredToken>>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of stored profiles.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenStore for MemoryStore {
	fn save(&self, record: StoredToken) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(record.profile.clone(), record);

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, profile: &'a ProfileId) -> StoreFuture<'a, Option<StoredToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(profile).cloned()) })
	}

	fn clear<'a>(&'a self, profile: &'a ProfileId) -> StoreFuture<'a, Option<StoredToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(profile)) })
	}
}
