//! Identities: the accounts that sign in and act on school records.
//!
//! The core never mutates an identity on its own; account provisioning and
//! profile updates build new values through [`Identity::new`] and
//! [`Identity::apply`], which stamp their timestamps explicitly.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// The closed set of roles an identity may hold.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Role {
  Admin,
  Teacher,
  Staff,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Staff];

  pub fn as_str(self) -> &'static str {
    match self {
      Role::Admin => "Admin",
      Role::Teacher => "Teacher",
      Role::Staff => "Staff",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Role::ALL
      .into_iter()
      .find(|r| r.as_str() == s)
      .ok_or_else(|| Error::Validation(format!("unknown role: {s:?}")))
  }
}

/// A stored account. The password hash is never serialised.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
  pub identity_id:   Uuid,
  pub username:      String,
  pub email:         String,
  #[serde(skip)]
  pub password_hash: String,
  pub display_name:  String,
  pub role:          Role,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input for provisioning an identity. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub display_name:  String,
  pub role:          Role,
}

/// A partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
  pub username:      Option<String>,
  pub email:         Option<String>,
  pub password_hash: Option<String>,
  pub display_name:  Option<String>,
  pub role:          Option<Role>,
}

impl Identity {
  pub fn new(input: NewIdentity, now: DateTime<Utc>) -> Self {
    Identity {
      identity_id:   Uuid::new_v4(),
      username:      input.username,
      email:         input.email,
      password_hash: input.password_hash,
      display_name:  input.display_name,
      role:          input.role,
      created_at:    now,
      updated_at:    now,
    }
  }

  /// Apply `changes` and stamp `updated_at`.
  pub fn apply(&mut self, changes: IdentityChanges, now: DateTime<Utc>) {
    if let Some(username) = changes.username {
      self.username = username;
    }
    if let Some(email) = changes.email {
      self.email = email;
    }
    if let Some(hash) = changes.password_hash {
      self.password_hash = hash;
    }
    if let Some(name) = changes.display_name {
      self.display_name = name;
    }
    if let Some(role) = changes.role {
      self.role = role;
    }
    self.updated_at = now;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alice() -> Identity {
    Identity::new(
      NewIdentity {
        username:      "alice".into(),
        email:         "alice@school.test".into(),
        password_hash: "$argon2id$placeholder".into(),
        display_name:  "Alice Adams".into(),
        role:          Role::Teacher,
      },
      Utc::now(),
    )
  }

  #[test]
  fn role_parses_its_own_display() {
    for role in Role::ALL {
      assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
    }
    assert!("admin".parse::<Role>().is_err());
  }

  #[test]
  fn password_hash_is_not_serialised() {
    let json = serde_json::to_value(alice()).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["role"], "Teacher");
  }

  #[test]
  fn apply_only_touches_supplied_fields() {
    let mut id = alice();
    let created = id.created_at;
    let later = created + chrono::Duration::minutes(5);

    id.apply(
      IdentityChanges { display_name: Some("Alice B. Adams".into()), ..Default::default() },
      later,
    );

    assert_eq!(id.display_name, "Alice B. Adams");
    assert_eq!(id.username, "alice");
    assert_eq!(id.role, Role::Teacher);
    assert_eq!(id.created_at, created);
    assert_eq!(id.updated_at, later);
  }
}
