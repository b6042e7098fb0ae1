//! Optional observability helpers for API calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `ibmcloud_api.call` with the `operation`
//!   and `stage` (call site) fields, plus a debug event for every non-success response.
//! - Enable `metrics` to increment the `ibmcloud_api_call_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// API operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiOperation {
	/// OpenID configuration discovery.
	IdentityDiscovery,
	/// Passcode grant.
	PasscodeGrant,
	/// API-key grant.
	ApiKeyGrant,
	/// Refresh-token grant.
	RefreshGrant,
	/// Account listing.
	ListAccounts,
	/// Resource instance listing.
	ListResourceInstances,
	/// Resource key listing.
	ListResourceKeys,
	/// Resource key creation.
	CreateResourceKey,
	/// Raw body upload.
	Upload,
}
impl ApiOperation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiOperation::IdentityDiscovery => "identity_discovery",
			ApiOperation::PasscodeGrant => "passcode_grant",
			ApiOperation::ApiKeyGrant => "api_key_grant",
			ApiOperation::RefreshGrant => "refresh_grant",
			ApiOperation::ListAccounts => "list_accounts",
			ApiOperation::ListResourceInstances => "list_resource_instances",
			ApiOperation::ListResourceKeys => "list_resource_keys",
			ApiOperation::CreateResourceKey => "create_resource_key",
			ApiOperation::Upload => "upload",
		}
	}
}
impl Display for ApiOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an API helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a call span and records attempt + outcome counters around it.
pub async fn observe<T, Fut>(operation: ApiOperation, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(operation, stage);

	record_call_outcome(operation, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_call_outcome(operation, CallOutcome::Success),
		Err(err) => {
			trace_failure(operation, err);
			record_call_outcome(operation, CallOutcome::Failure);
		},
	}

	result
}
