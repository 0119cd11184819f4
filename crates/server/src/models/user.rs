//! User account model.

use chrono::{DateTime, Utc};

use stitchpress_core::{Email, UserId, UserRole};

/// A registered account.
///
/// `password_hash` is an argon2 PHC string and never leaves the server; the
/// route layer serializes users through a view type without it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a user. The password is hashed before this exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
}
