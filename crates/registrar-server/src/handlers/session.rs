//! Handlers for the session endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/login` | Public. Body: `{"username":..,"password":..}` |
//! | `GET`  | `/me` | The caller's resolved claims |

use axum::extract::State;
use registrar_auth::{AuthError, Claims, Rejection, password::verify_stored};
use registrar_core::{identity::Identity, store::RecordStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::RequestContext, error::ApiError, extract::Json};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  Identity,
}

/// `POST /login`
///
/// An unknown username and a wrong password produce the same response, and
/// both run one argon2 verification.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: RecordStore + 'static,
{
  let invalid = || ApiError::from(AuthError::Unauthenticated(Rejection::InvalidCredentials));

  let identity = state
    .store
    .find_identity_by_username(body.username.clone())
    .await
    .map_err(ApiError::store)?;

  let stored = identity.as_ref().map(|i| i.password_hash.as_str());
  let verified = verify_stored(&body.password, stored);
  let Some(identity) = identity.filter(|_| verified) else {
    tracing::debug!(username = %body.username, "login rejected");
    return Err(invalid());
  };

  let token = state.tokens.issue(&identity)?;
  tracing::info!(identity = %identity.identity_id, role = %identity.role, "login");
  Ok(Json(LoginResponse { token, user: identity }))
}

/// `GET /me`
pub async fn me(ctx: RequestContext) -> Json<Claims> { Json(ctx.claims) }
