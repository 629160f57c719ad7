//! Error types for `registrar-auth`.

use registrar_core::identity::Role;
use thiserror::Error;

use crate::gate::RoleSet;

/// Why a presented credential was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
  MissingHeader,
  WrongScheme,
  Malformed,
  BadSignature,
  Expired,
  InvalidCredentials,
}

impl Rejection {
  pub fn as_str(self) -> &'static str {
    match self {
      Rejection::MissingHeader => "authorization header is required",
      Rejection::WrongScheme => "authorization header format must be Bearer {token}",
      Rejection::Malformed => "invalid token",
      Rejection::BadSignature => "invalid token",
      Rejection::Expired => "token expired",
      Rejection::InvalidCredentials => "invalid credentials",
    }
  }
}

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("unauthenticated: {}", .0.as_str())]
  Unauthenticated(Rejection),

  #[error("forbidden: role {role} is not one of {required}")]
  Forbidden { role: Role, required: RoleSet },

  #[error("a role set must name at least one role")]
  EmptyRoleSet,

  #[error("signing secret must not be empty")]
  EmptySecret,

  #[error("token signing failed: {0}")]
  Signing(#[source] jsonwebtoken::errors::Error),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

impl AuthError {
  pub fn is_unauthenticated(&self) -> bool { matches!(self, Self::Unauthenticated(_)) }
}

pub type Result<T, E = AuthError> = std::result::Result<T, E>;
