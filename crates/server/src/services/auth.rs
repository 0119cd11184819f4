//! Signup and login.
//!
//! Passwords are hashed with Argon2id before persistence. Login failures
//! are deliberately indistinguishable: a missing account and a wrong
//! password both produce [`AuthError::InvalidCredentials`], so the API
//! never leaks which emails exist.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

use stitchpress_core::{Email, EmailError, UserRole};

use crate::models::{NewUser, User};
use crate::store::{Store, StoreError};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Errors from signup and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or wrong password; the caller cannot tell which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    UserExists,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("password hashing failed")]
    Hashing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Account creation and credential verification against a [`Store`].
pub struct AuthService;

impl AuthService {
    /// Register a new account with the default `user` role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserExists`] on a duplicate email,
    /// [`AuthError::InvalidEmail`]/[`AuthError::WeakPassword`] on bad
    /// input.
    pub async fn signup(
        store: &dyn Store,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = hash_password(password)?;
        let new = NewUser {
            email,
            password_hash,
            name: name.trim().to_owned(),
            role: UserRole::User,
        };
        match store.create_user(new).await {
            Ok(user) => Ok(user),
            Err(StoreError::Conflict(_)) => Err(AuthError::UserExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and return the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password, with no distinction between the two.
    pub async fn login(
        store: &dyn Store,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let Some(user) = store.user_by_email(email).await? else {
            // Burn a verification anyway so unknown emails take as long as
            // wrong passwords.
            let _ = verify_password("placeholder", DUMMY_HASH);
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }
}

/// A throwaway Argon2id hash used to equalize login timing.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$uFZbLWrM3gwpkyT3yTPWmw$\
                          kC9uMCiHkp7qMn7YyTzM9PPcmAwGx5F3gq2C7H0RbWk";

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hashing)
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[tokio::test]
    async fn test_signup_then_login() {
        let store = MemStore::new();
        let user = AuthService::signup(&store, "ana@example.com", "hunter22hunter", "Ana")
            .await
            .expect("signup");
        assert_eq!(user.role, UserRole::User);
        assert_ne!(user.password_hash, "hunter22hunter");

        let back = AuthService::login(&store, "ana@example.com", "hunter22hunter")
            .await
            .expect("login");
        assert_eq!(back.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemStore::new();
        AuthService::signup(&store, "ana@example.com", "hunter22hunter", "Ana")
            .await
            .expect("signup");
        assert!(matches!(
            AuthService::signup(&store, "ana@example.com", "differentpass", "Other").await,
            Err(AuthError::UserExists)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let store = MemStore::new();
        AuthService::signup(&store, "ana@example.com", "hunter22hunter", "Ana")
            .await
            .expect("signup");

        let wrong_password = AuthService::login(&store, "ana@example.com", "wrong-pass")
            .await
            .expect_err("must fail");
        let unknown_email = AuthService::login(&store, "ghost@example.com", "wrong-pass")
            .await
            .expect_err("must fail");
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let store = MemStore::new();
        assert!(matches!(
            AuthService::signup(&store, "ana@example.com", "short", "Ana").await,
            Err(AuthError::WeakPassword)
        ));
    }
}
