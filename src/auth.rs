//! Auth-domain identifiers, grant types, and bearer token models.

pub mod grant;
pub mod id;
pub mod secret;
pub mod token;

pub use grant::*;
pub use id::*;
pub use secret::*;
pub use token::*;
