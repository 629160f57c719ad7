//! The access gate: authenticate, then authorize.
//!
//! Both steps short-circuit. [`authenticate`] turns an `Authorization` header
//! value into [`Claims`]; [`authorize`] checks those claims against a
//! non-empty [`RoleSet`].

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use registrar_core::identity::Role;

use crate::{AuthError, Claims, Rejection, Result, TokenIssuer};

/// A non-empty set of roles, any one of which grants access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
  pub fn new<I>(roles: I) -> Result<Self>
  where
    I: IntoIterator<Item = Role>,
  {
    let set: BTreeSet<Role> = roles.into_iter().collect();
    if set.is_empty() {
      return Err(AuthError::EmptyRoleSet);
    }
    Ok(RoleSet(set))
  }

  pub fn one(role: Role) -> Self { RoleSet(BTreeSet::from([role])) }

  pub fn contains(&self, role: Role) -> bool { self.0.contains(&role) }

  pub fn iter(&self) -> impl Iterator<Item = Role> + '_ { self.0.iter().copied() }
}

impl fmt::Display for RoleSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.iter().map(Role::as_str).collect();
    write!(f, "{{{}}}", names.join(", "))
  }
}

/// Extract the credential from a `Bearer <credential>` header value.
///
/// The scheme is matched case-insensitively; exactly one space-free
/// credential must follow it.
pub fn bearer_credential(header: Option<&str>) -> Result<&str> {
  let value = header.ok_or(AuthError::Unauthenticated(Rejection::MissingHeader))?;

  let mut parts = value.split(' ');
  let scheme = parts.next().unwrap_or_default();
  let credential = parts.next().unwrap_or_default();

  if !scheme.eq_ignore_ascii_case("bearer") || credential.is_empty() || parts.next().is_some() {
    return Err(AuthError::Unauthenticated(Rejection::WrongScheme));
  }
  Ok(credential)
}

/// Resolve the claims carried by an `Authorization` header value.
pub fn authenticate(header: Option<&str>, issuer: &TokenIssuer) -> Result<Claims> {
  authenticate_at(header, issuer, Utc::now())
}

pub fn authenticate_at(
  header: Option<&str>,
  issuer: &TokenIssuer,
  now: DateTime<Utc>,
) -> Result<Claims> {
  let credential = bearer_credential(header)?;
  issuer.validate_at(credential, now)
}

/// Succeeds iff the claims' role is a member of `required`.
pub fn authorize(claims: &Claims, required: &RoleSet) -> Result<()> {
  if required.contains(claims.role) {
    Ok(())
  } else {
    Err(AuthError::Forbidden { role: claims.role, required: required.clone() })
  }
}
