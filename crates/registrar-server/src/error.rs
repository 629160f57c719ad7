//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use registrar_auth::AuthError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Unauthenticated(&'static str),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Convert any store error through the core taxonomy.
  pub fn store<E: Into<registrar_core::Error>>(e: E) -> Self {
    let e: registrar_core::Error = e.into();
    e.into()
  }

  pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
    ApiError::NotFound(format!("{entity} not found: {id}"))
  }
}

impl From<registrar_core::Error> for ApiError {
  fn from(e: registrar_core::Error) -> Self {
    use registrar_core::Error;
    match e {
      e @ Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      Error::Conflict(msg) => ApiError::Conflict(msg),
      Error::Validation(msg) => ApiError::BadRequest(msg),
      Error::Storage(source) => ApiError::Internal(source),
    }
  }
}

impl From<AuthError> for ApiError {
  fn from(e: AuthError) -> Self {
    match e {
      AuthError::Unauthenticated(reason) => ApiError::Unauthenticated(reason.as_str()),
      e @ AuthError::Forbidden { .. } => ApiError::Forbidden(e.to_string()),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, (*m).to_string()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use registrar_auth::Rejection;

  #[test]
  fn unauthenticated_carries_bearer_challenge() {
    let res = ApiError::from(AuthError::Unauthenticated(Rejection::Expired)).into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
  }

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (registrar_core::Error::not_found("student", "x"), StatusCode::NOT_FOUND),
      (registrar_core::Error::Conflict("dup".into()), StatusCode::CONFLICT),
      (registrar_core::Error::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (
        registrar_core::Error::Storage("disk".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }

  #[tokio::test]
  async fn internal_errors_hide_their_source() {
    let res = ApiError::from(registrar_core::Error::Storage("/var/secret.db".into())).into_response();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "error": "internal server error" }));
  }
}
