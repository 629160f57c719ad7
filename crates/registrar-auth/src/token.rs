//! Bearer credentials: HS256-signed claims with an embedded expiry.
//!
//! Validation is stateless. The expiry travels inside the signed payload, so
//! no session table is consulted and a credential cannot be revoked early.

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use registrar_core::identity::{Identity, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthError, Rejection, Result};

/// How long an issued credential stays valid.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// The payload of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// Identity id.
  pub sub:  Uuid,
  /// Display name at issue time.
  pub name: String,
  pub role: Role,
  /// Issued-at, seconds since the epoch.
  pub iat:  i64,
  /// Expiry, seconds since the epoch.
  pub exp:  i64,
}

impl Claims {
  pub fn for_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
    Claims {
      sub:  identity.identity_id,
      name: identity.display_name.clone(),
      role: identity.role,
      iat:  now.timestamp(),
      exp:  (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
    }
  }

  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(self.exp, 0).single()
  }

  /// A credential is expired from its `exp` second onward.
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { now.timestamp() >= self.exp }
}

/// Signs and verifies credentials with one process-wide secret.
///
/// Built once at startup from configuration and shared read-only.
#[derive(Clone)]
pub struct TokenIssuer {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl TokenIssuer {
  pub fn new(secret: &[u8]) -> Result<Self> {
    if secret.is_empty() {
      return Err(AuthError::EmptySecret);
    }

    // Expiry is checked by hand against a caller-supplied clock.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims =
      ["exp", "sub"].into_iter().map(String::from).collect();

    Ok(TokenIssuer {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    })
  }

  pub fn issue(&self, identity: &Identity) -> Result<String> {
    self.issue_at(identity, Utc::now())
  }

  pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims::for_identity(identity, now);
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(AuthError::Signing)
  }

  pub fn validate(&self, token: &str) -> Result<Claims> {
    self.validate_at(token, Utc::now())
  }

  /// Verify the signature and decode the claims, then reject them if `now`
  /// is at or past their expiry.
  pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| {
        let rejection = match e.kind() {
          ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Rejection::BadSignature,
          ErrorKind::ExpiredSignature => Rejection::Expired,
          _ => Rejection::Malformed,
        };
        AuthError::Unauthenticated(rejection)
      })?;

    if data.claims.is_expired_at(now) {
      return Err(AuthError::Unauthenticated(Rejection::Expired));
    }
    Ok(data.claims)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use base64::Engine as _;
  use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
  use chrono::TimeZone as _;
  use registrar_core::identity::NewIdentity;

  fn issuer() -> TokenIssuer { TokenIssuer::new(b"test-secret").unwrap() }

  fn teacher() -> Identity {
    Identity::new(
      NewIdentity {
        username:      "tbrown".into(),
        email:         "tbrown@school.test".into(),
        password_hash: String::new(),
        display_name:  "Tess Brown".into(),
        role:          Role::Teacher,
      },
      Utc::now(),
    )
  }

  #[test]
  fn empty_secret_is_rejected() {
    assert!(matches!(TokenIssuer::new(b""), Err(AuthError::EmptySecret)));
  }

  #[test]
  fn issued_token_validates_to_same_claims() {
    let issuer = issuer();
    let who = teacher();
    let now = Utc::now();
    let token = issuer.issue_at(&who, now).unwrap();

    let claims = issuer.validate_at(&token, now + Duration::hours(23)).unwrap();
    assert_eq!(claims.sub, who.identity_id);
    assert_eq!(claims.role, Role::Teacher);
    assert_eq!(claims.name, "Tess Brown");
    assert_eq!(claims, Claims::for_identity(&who, now));
  }

  #[test]
  fn expiry_is_24_hours_after_issue() {
    let now = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
    let claims = Claims::for_identity(&teacher(), now);
    assert_eq!(
      claims.expires_at(),
      Some(Utc.with_ymd_and_hms(2025, 1, 11, 8, 0, 0).unwrap())
    );
  }

  #[test]
  fn token_past_expiry_is_rejected() {
    let issuer = issuer();
    let now = Utc::now();
    let token = issuer.issue_at(&teacher(), now).unwrap();

    let later = now + Duration::hours(24) + Duration::seconds(1);
    assert!(matches!(
      issuer.validate_at(&token, later),
      Err(AuthError::Unauthenticated(Rejection::Expired))
    ));
  }

  #[test]
  fn token_issued_long_ago_fails_plain_validate() {
    let issuer = issuer();
    let token = issuer
      .issue_at(&teacher(), Utc::now() - Duration::hours(25))
      .unwrap();
    assert!(issuer.validate(&token).unwrap_err().is_unauthenticated());
  }

  #[test]
  fn flipped_signature_bit_is_rejected() {
    let issuer = issuer();
    let token = issuer.issue(&teacher()).unwrap();
    let (body, sig) = token.rsplit_once('.').unwrap();

    let sig_bytes = B64.decode(sig).unwrap();
    for bit in [0usize, 7, 100, sig_bytes.len() * 8 - 1] {
      let mut tampered = sig_bytes.clone();
      tampered[bit / 8] ^= 1 << (bit % 8);
      let forged = format!("{body}.{}", B64.encode(&tampered));
      assert!(matches!(
        issuer.validate(&forged),
        Err(AuthError::Unauthenticated(Rejection::BadSignature))
      ));
    }
  }

  #[test]
  fn token_from_another_secret_is_rejected() {
    let token = TokenIssuer::new(b"other").unwrap().issue(&teacher()).unwrap();
    assert!(matches!(
      issuer().validate(&token),
      Err(AuthError::Unauthenticated(Rejection::BadSignature))
    ));
  }

  #[test]
  fn garbage_is_malformed() {
    for junk in ["", "abc", "a.b.c", "not a token at all"] {
      assert!(matches!(
        issuer().validate(junk),
        Err(AuthError::Unauthenticated(Rejection::Malformed))
      ));
    }
  }
}
