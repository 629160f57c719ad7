//! Access-gate extractors.
//!
//! [`RequestContext`] authenticates the `Authorization: Bearer` header and
//! yields the resolved claims. [`Authorized<R>`] additionally authorizes them
//! against the role set named by the [`Requirement`] `R`. Both reject before
//! the handler body runs.

use std::marker::PhantomData;

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use registrar_auth::{AuthError, Claims, Rejection, RoleSet, authenticate, authorize};
use registrar_core::{identity::Role, store::RecordStore};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The authenticated caller of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
  pub claims: Claims,
}

impl RequestContext {
  pub fn identity_id(&self) -> Uuid { self.claims.sub }

  pub fn role(&self) -> Role { self.claims.role }

  pub fn is_admin(&self) -> bool { self.claims.role == Role::Admin }
}

impl<S> FromRequestParts<AppState<S>> for RequestContext
where
  S: RecordStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = match parts.headers.get(header::AUTHORIZATION) {
      Some(value) => Some(
        value
          .to_str()
          .map_err(|_| AuthError::Unauthenticated(Rejection::WrongScheme))?,
      ),
      None => None,
    };

    match authenticate(header, &state.tokens) {
      Ok(claims) => Ok(RequestContext { claims }),
      Err(e) => {
        tracing::debug!(path = %parts.uri.path(), reason = %e, "rejected credential");
        Err(e.into())
      }
    }
  }
}

// ─── Role requirements ───────────────────────────────────────────────────────

/// A static, non-empty set of roles a route requires.
pub trait Requirement {
  const ROLES: &'static [Role];
}

pub struct AdminOnly;

impl Requirement for AdminOnly {
  const ROLES: &'static [Role] = &[Role::Admin];
}

/// Grade and attendance writes.
pub struct AdminOrTeacher;

impl Requirement for AdminOrTeacher {
  const ROLES: &'static [Role] = &[Role::Admin, Role::Teacher];
}

/// Roster writes.
pub struct AdminOrStaff;

impl Requirement for AdminOrStaff {
  const ROLES: &'static [Role] = &[Role::Admin, Role::Staff];
}

/// An authenticated caller whose role is in `R::ROLES`.
pub struct Authorized<R> {
  pub ctx:   RequestContext,
  _requires: PhantomData<fn() -> R>,
}

impl<R> std::ops::Deref for Authorized<R> {
  type Target = RequestContext;

  fn deref(&self) -> &RequestContext { &self.ctx }
}

impl<S, R> FromRequestParts<AppState<S>> for Authorized<R>
where
  S: RecordStore + 'static,
  R: Requirement,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let ctx = RequestContext::from_request_parts(parts, state).await?;
    let required = RoleSet::new(R::ROLES.iter().copied())?;

    if let Err(e) = authorize(&ctx.claims, &required) {
      tracing::debug!(
        path = %parts.uri.path(),
        identity = %ctx.claims.sub,
        reason = %e,
        "rejected role",
      );
      return Err(e.into());
    }
    Ok(Authorized { ctx, _requires: PhantomData })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::Arc;

  use axum::{body::Body, http::Request};
  use chrono::{Duration, Utc};
  use registrar_core::identity::{Identity, NewIdentity};
  use registrar_store_sqlite::SqliteStore;


  const SECRET: &str = "extractor-test-secret";

  async fn state() -> AppState<SqliteStore> {
    AppState {
      store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      tokens: Arc::new(registrar_auth::TokenIssuer::new(SECRET.as_bytes()).unwrap()),
    }
  }

  fn identity(role: Role) -> Identity {
    Identity::new(
      NewIdentity {
        username:      "pat".into(),
        email:         "pat@school.test".into(),
        password_hash: String::new(),
        display_name:  "Pat".into(),
        role,
      },
      Utc::now(),
    )
  }

  fn request(auth: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/api/v1/grades");
    if let Some(value) = auth {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap().into_parts().0
  }

  #[tokio::test]
  async fn missing_header_is_unauthenticated() {
    let state = state().await;
    let mut parts = request(None);
    let err = RequestContext::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated("authorization header is required")));
  }

  #[tokio::test]
  async fn basic_scheme_is_unauthenticated() {
    let state = state().await;
    let mut parts = request(Some("Basic dXNlcjpwYXNz"));
    let err = RequestContext::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated(_)));
  }

  #[tokio::test]
  async fn expired_token_is_unauthenticated() {
    let state = state().await;
    let issued = Utc::now() - Duration::hours(25);
    let token = state.tokens.issue_at(&identity(Role::Admin), issued).unwrap();
    let mut parts = request(Some(&format!("Bearer {token}")));
    let err = Authorized::<AdminOnly>::from_request_parts(&mut parts, &state)
      .await
      .err()
      .unwrap();
    assert!(matches!(err, ApiError::Unauthenticated("token expired")));
  }

  #[tokio::test]
  async fn teacher_passes_admin_or_teacher() {
    let state = state().await;
    let who = identity(Role::Teacher);
    let token = state.tokens.issue(&who).unwrap();
    let mut parts = request(Some(&format!("Bearer {token}")));
    let ok = Authorized::<AdminOrTeacher>::from_request_parts(&mut parts, &state)
      .await
      .ok()
      .unwrap();
    assert_eq!(ok.identity_id(), who.identity_id);
    assert_eq!(ok.role(), Role::Teacher);
  }

  #[tokio::test]
  async fn staff_is_forbidden_from_admin_or_teacher() {
    let state = state().await;
    let token = state.tokens.issue(&identity(Role::Staff)).unwrap();
    let mut parts = request(Some(&format!("Bearer {token}")));
    let err = Authorized::<AdminOrTeacher>::from_request_parts(&mut parts, &state)
      .await
      .err()
      .unwrap();
    assert!(matches!(err, ApiError::Forbidden(_)));
  }
}
