//! Authentication service.
//!
//! Username and password accounts with Argon2id password hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use shopfront_core::Username;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with username and password.
    ///
    /// Both inputs are trimmed before use.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either input is blank.
    /// Returns `AuthError::InvalidUsername` if the username is malformed.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (username, password) = parse_credentials(username, password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either input is blank.
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (username, password) = match parse_credentials(username, password) {
            Ok(parsed) => parsed,
            // A name that could never have been registered can't log in.
            Err(AuthError::InvalidUsername(_)) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Trim and validate submitted credentials.
fn parse_credentials<'p>(
    username: &str,
    password: &'p str,
) -> Result<(Username, &'p str), AuthError> {
    let username = username.trim();
    let password = password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    Ok((Username::parse(username)?, password))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::UsernameError;

    use super::*;

    #[test]
    fn test_parse_credentials_trims() {
        let (username, password) = parse_credentials("  alice ", " hunter22\n").unwrap();
        assert_eq!(username.as_str(), "alice");
        assert_eq!(password, "hunter22");
    }

    #[test]
    fn test_parse_credentials_missing() {
        assert!(matches!(
            parse_credentials("", "secret"),
            Err(AuthError::MissingFields)
        ));
        assert!(matches!(
            parse_credentials("alice", "   "),
            Err(AuthError::MissingFields)
        ));
    }

    #[test]
    fn test_parse_credentials_bad_username() {
        assert!(matches!(
            parse_credentials("al ice", "secret"),
            Err(AuthError::InvalidUsername(UsernameError::InvalidCharacter(' ')))
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
