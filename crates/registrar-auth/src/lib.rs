//! Authentication and authorization for Registrar.
//!
//! - [`token`]: issue and validate signed, time-bounded bearer credentials.
//! - [`gate`]: the access gate, authenticating a presented `Authorization`
//!   header and authorizing the resulting claims against a [`RoleSet`].
//! - [`password`]: argon2 hashing for stored identity passwords.
//!
//! Nothing here touches HTTP frameworks or storage.

pub mod error;
pub mod gate;
pub mod password;
pub mod token;

pub use error::{AuthError, Rejection, Result};
pub use gate::{RoleSet, authenticate, authorize};
pub use token::{Claims, TokenIssuer};
