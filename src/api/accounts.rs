//! Billing account listing.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccountId, IdentifierError},
	client::CloudClient,
	http::{ApiHttpClient, Authorization},
	obs::{self, ApiOperation},
};

/// One page of the account listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Accounts {
	/// Relative reference to the next page; appended to the listing URL when followed.
	#[serde(default)]
	pub next_url: Option<String>,
	/// Total number of accounts visible to the token.
	#[serde(default)]
	pub total_results: u64,
	/// Accounts on this page.
	#[serde(default)]
	pub resources: Vec<Account>,
}
impl Accounts {
	/// Returns the next-page reference when one is present and non-empty.
	pub fn next_page(&self) -> Option<&str> {
		self.next_url.as_deref().filter(|next| !next.is_empty())
	}
}

/// Billing account record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
	/// Bookkeeping metadata (GUID, self link, timestamps).
	pub metadata: AccountMetadata,
	/// Account details.
	pub entity: AccountEntity,
}
impl Account {
	/// Validated account identifier, suitable for `bss_account` binding.
	pub fn account_id(&self) -> Result<AccountId, IdentifierError> {
		AccountId::new(&self.metadata.guid)
	}
}

/// Metadata block of an [`Account`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
	/// Account GUID.
	pub guid: String,
	/// Self link.
	#[serde(default)]
	pub url: String,
	/// Creation timestamp as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
	/// Last update timestamp as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<String>,
}

/// Entity block of an [`Account`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountEntity {
	/// Display name.
	pub name: String,
	/// Account type (`TRIAL`, `PAYG`, `SUBSCRIPTION`, ...).
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Account state (`ACTIVE`, `SUSPENDED`, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	/// Owner's user identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_userid: Option<String>,
	/// Owner's IAM identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_iamid: Option<String>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

impl<C> CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Lists one page of accounts. `next` is a previous page's `next_url`.
	pub async fn accounts(&self, next: Option<&str>, access_token: &str) -> Result<Accounts> {
		obs::observe(ApiOperation::ListAccounts, "accounts", async move {
			let url = match next {
				Some(next) => self.endpoints.accounts_page_url(next)?,
				None => self.endpoints.accounts_url()?,
			};

			self.fetch(url, &Authorization::Bearer(access_token.to_owned())).await
		})
		.await
	}

	/// Follows `next_url` until exhausted (or repeated) and returns every account.
	pub async fn all_accounts(&self, access_token: &str) -> Result<Vec<Account>> {
		let mut page = self.accounts(None, access_token).await?;
		let mut accounts = std::mem::take(&mut page.resources);

		let mut visited = HashSet::new();

		while let Some(next) = page.next_page().map(str::to_owned) {
			// A repeated reference would page forever.
			if !visited.insert(next.clone()) {
				break;
			}

			page = self.accounts(Some(&next), access_token).await?;

			accounts.append(&mut page.resources);
		}

		Ok(accounts)
	}
}
