//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Access |
//! |----------|------|--------|
//! | `GET`    | `/users` | Admin |
//! | `POST`   | `/users` | Admin |
//! | `GET`    | `/users/{id}` | Authenticated |
//! | `PUT`    | `/users/{id}` | Admin, or the identity itself |
//! | `DELETE` | `/users/{id}` | Admin |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use registrar_auth::password::hash_password;
use registrar_core::{
  identity::{Identity, IdentityChanges, NewIdentity, Role},
  store::RecordStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminOnly, Authorized, RequestContext},
  error::ApiError,
  extract::{Json, Path},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: Authorized<AdminOnly>,
) -> Result<Json<Vec<Identity>>, ApiError>
where
  S: RecordStore + 'static,
{
  let identities = state.store.list_identities().await.map_err(ApiError::store)?;
  Ok(Json(identities))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub username:     String,
  pub email:        String,
  pub password:     String,
  pub display_name: String,
  pub role:         Role,
}

/// `POST /users`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOnly>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  if body.username.trim().is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest("username and password are required".into()));
  }
  ensure_unique(state.store.as_ref(), Some(&body.username), Some(&body.email), None).await?;

  let identity = Identity::new(
    NewIdentity {
      username:      body.username,
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      display_name:  body.display_name,
      role:          body.role,
    },
    Utc::now(),
  );
  let identity = state.store.create_identity(identity).await.map_err(ApiError::store)?;

  tracing::info!(
    identity = %identity.identity_id,
    role = %identity.role,
    by = %caller.identity_id(),
    "identity created",
  );
  Ok((StatusCode::CREATED, Json(identity)))
}

/// Conflict if another identity already holds `username` or `email`.
/// `owner` is the identity being edited, which may keep its own values.
async fn ensure_unique<S: RecordStore>(
  store: &S,
  username: Option<&str>,
  email: Option<&str>,
  owner: Option<Uuid>,
) -> Result<(), ApiError> {
  let taken_by_other = |found: Option<Identity>| found.is_some_and(|i| Some(i.identity_id) != owner);

  if let Some(username) = username {
    let found = store
      .find_identity_by_username(username.to_string())
      .await
      .map_err(ApiError::store)?;
    if taken_by_other(found) {
      return Err(ApiError::Conflict("username already taken".into()));
    }
  }
  if let Some(email) = email {
    let found = store
      .find_identity_by_email(email.to_string())
      .await
      .map_err(ApiError::store)?;
    if taken_by_other(found) {
      return Err(ApiError::Conflict("email already registered".into()));
    }
  }
  Ok(())
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: RequestContext,
  Path(id): Path<Uuid>,
) -> Result<Json<Identity>, ApiError>
where
  S: RecordStore + 'static,
{
  let identity = state
    .store
    .get_identity(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("user", id))?;
  Ok(Json(identity))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub username:     Option<String>,
  pub email:        Option<String>,
  pub password:     Option<String>,
  pub display_name: Option<String>,
  pub role:         Option<Role>,
}

/// `PUT /users/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: RequestContext,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Identity>, ApiError>
where
  S: RecordStore + 'static,
{
  if !caller.is_admin() && caller.identity_id() != id {
    return Err(ApiError::Forbidden("only an Admin may update another user".into()));
  }

  let mut identity = state
    .store
    .get_identity(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("user", id))?;

  if !caller.is_admin() && body.role.is_some_and(|r| r != identity.role) {
    return Err(ApiError::Forbidden("only an Admin may change a role".into()));
  }

  ensure_unique(
    state.store.as_ref(),
    body.username.as_deref(),
    body.email.as_deref(),
    Some(id),
  )
  .await?;

  let password_hash = match body.password.as_deref() {
    Some("") => return Err(ApiError::BadRequest("password must not be empty".into())),
    Some(password) => Some(hash_password(password)?),
    None => None,
  };

  identity.apply(
    IdentityChanges {
      username: body.username,
      email: body.email,
      password_hash,
      display_name: body.display_name,
      role: body.role,
    },
    Utc::now(),
  );
  let identity = state.store.update_identity(identity).await.map_err(ApiError::store)?;
  Ok(Json(identity))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Authorized<AdminOnly>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if !state.store.delete_identity(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("user", id));
  }
  tracing::info!(identity = %id, by = %caller.identity_id(), "identity deleted");
  Ok(StatusCode::NO_CONTENT)
}
