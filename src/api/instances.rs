//! Resource instance listing on the resource controller.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Crn, IdentifierError, ResourceId},
	client::CloudClient,
	http::{ApiHttpClient, Authorization},
	obs::{self, ApiOperation},
};

/// One page of provisioned resource instances.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
	/// Number of rows on this page.
	#[serde(default)]
	pub rows_count: u64,
	/// Controller-relative path of the next page.
	#[serde(default)]
	pub next_url: Option<String>,
	/// Instances on this page.
	#[serde(default)]
	pub resources: Vec<Resource>,
}
impl Resources {
	/// Returns the next-page reference when one is present and non-empty.
	pub fn next_page(&self) -> Option<&str> {
		self.next_url.as_deref().filter(|next| !next.is_empty())
	}
}

/// Provisioned resource instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
	/// Instance identifier (the CRN).
	#[serde(default)]
	pub id: String,
	/// Instance GUID.
	#[serde(default)]
	pub guid: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Cloud Resource Name.
	#[serde(default)]
	pub crn: String,
	/// Controller-relative self link.
	#[serde(default)]
	pub url: String,
	/// Deployment region.
	#[serde(default)]
	pub region_id: String,
	/// Owning account.
	#[serde(default)]
	pub account_id: String,
	/// Owning resource group.
	#[serde(default)]
	pub resource_group_id: String,
	/// Catalog plan.
	#[serde(default)]
	pub resource_plan_id: String,
	/// Catalog service.
	#[serde(default)]
	pub resource_id: String,
	/// Lifecycle state (`active`, `inactive`, ...).
	#[serde(default)]
	pub state: String,
	/// Instance type (`service_instance`, ...).
	#[serde(default, rename = "type")]
	pub kind: String,
	/// Service dashboard, when the service has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dashboard_url: Option<String>,
	/// Creation timestamp as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl Resource {
	/// Validated CRN, suitable as a resource key source.
	pub fn crn(&self) -> Result<Crn, IdentifierError> {
		Crn::new(&self.crn)
	}
}

impl<C> CloudClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Lists one page of resource instances, filtered by catalog service when `resource_id` is
	/// given. A `next` reference from a previous page already carries the filter.
	pub async fn resource_instances(
		&self,
		next: Option<&str>,
		access_token: &str,
		resource_id: Option<&ResourceId>,
	) -> Result<Resources> {
		obs::observe(ApiOperation::ListResourceInstances, "resource_instances", async move {
			let url = match next {
				Some(next) => self.endpoints.resource_controller_page_url(next)?,
				None => {
					let mut url = self.endpoints.resource_instances_url()?;

					if let Some(resource_id) = resource_id {
						url.query_pairs_mut().append_pair("resource_id", resource_id);
					}

					url
				},
			};

			self.fetch(url, &Authorization::Bearer(access_token.to_owned())).await
		})
		.await
	}

	/// Follows `next_url` until exhausted (or repeated) and returns every matching instance.
	pub async fn all_resource_instances(
		&self,
		access_token: &str,
		resource_id: Option<&ResourceId>,
	) -> Result<Vec<Resource>> {
		let mut page = self.resource_instances(None, access_token, resource_id).await?;
		let mut resources = std::mem::take(&mut page.resources);

		let mut visited = HashSet::new();

		while let Some(next) = page.next_page().map(str::to_owned) {
			// A repeated reference would page forever.
			if !visited.insert(next.clone()) {
				break;
			}

			page = self.resource_instances(Some(&next), access_token, resource_id).await?;

			resources.append(&mut page.resources);
		}

		Ok(resources)
	}
}
