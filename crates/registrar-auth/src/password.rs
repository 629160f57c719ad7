//! argon2 password hashing for stored identities.

use std::sync::OnceLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{AuthError, Result};

/// Hash `password` into an argon2id PHC string, e.g. `$argon2id$v=19$…`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// `false` for a wrong password and for a hash that does not parse.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Verify against the stored hash of a looked-up identity. With no identity,
/// a fixed dummy hash is verified instead and the result is always `false`,
/// so an unknown username costs as much as a wrong password.
pub fn verify_stored(password: &str, stored: Option<&str>) -> bool {
  static DUMMY: OnceLock<String> = OnceLock::new();
  match stored {
    Some(phc) => verify_password(password, phc),
    None => {
      let dummy = DUMMY.get_or_init(|| hash_password("registrar-dummy").unwrap_or_default());
      let _ = verify_password(password, dummy);
      false
    }
  }
}
