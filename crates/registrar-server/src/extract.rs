//! `Json` and `Path` extractors whose rejections are [`ApiError`]s, so a
//! malformed body or path segment gets the same `{"error": ..}` body as
//! every other failure.

use axum::{
  extract::{FromRequest, FromRequestParts},
  response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// JSON request body, or JSON response.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}

/// Typed path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);
