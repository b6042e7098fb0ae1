//! Endpoint calls layered on the [`CloudClient`](crate::client::CloudClient) request helpers.
//!
//! Each submodule pairs the wire models for one service area with the `impl CloudClient`
//! block that fetches them: identity discovery, IAM token grants, billing accounts,
//! resource instances, and resource keys.

pub mod accounts;
pub mod identity;
pub mod instances;
pub mod keys;
pub mod token;

pub use accounts::*;
pub use identity::*;
pub use instances::*;
pub use keys::*;
