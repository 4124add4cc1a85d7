//! Authentication service.
//!
//! Username and password accounts with Argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use printshop_core::Email;

use crate::db::RepositoryError;
use crate::db::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 150;

/// Registration form input.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub username: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub password_confirm: &'r str,
}

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

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::InvalidEmail`,
    /// `AuthError::WeakPassword` or `AuthError::PasswordMismatch` for bad input.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        let email = validate_registration(&form)?;
        let user = self
            .create_user(form.username.trim(), Some(&email), form.password, false)
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Create an account directly, optionally with staff access.
    ///
    /// Used by registration and by the command line.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&Email>,
        password: &str,
        is_staff: bool,
    ) -> Result<User, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, email, &password_hash, is_staff)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    /// Returns `AuthError::Inactive` if the account has been deactivated.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        Ok(user)
    }
}

fn validate_registration(form: &Registration<'_>) -> Result<Email, AuthError> {
    validate_username(form.username.trim())?;
    let email = Email::parse(form.email)?;
    validate_password(form.password)?;

    if form.password != form.password_confirm {
        return Err(AuthError::PasswordMismatch);
    }

    Ok(email)
}

/// Validate a username: letters, digits and `@.+-_`, at most 150 characters.
fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidUsername(
            "This field is required.".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "Ensure this value has at most {MAX_USERNAME_LENGTH} characters."
        )));
    }

    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(AuthError::InvalidUsername(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    Ok(())
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
    use super::*;

    fn registration<'r>(password: &'r str, confirm: &'r str) -> Registration<'r> {
        Registration {
            username: "  sam.lee ",
            email: "sam@example.com",
            password,
            password_confirm: confirm,
        }
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("ééééééé").is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alex_99+shop@x.y-z").is_ok());
        assert!(matches!(
            validate_username(""),
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn test_registration_checks_confirmation() {
        let email = validate_registration(&registration("longenough", "longenough")).unwrap();
        assert_eq!(email.as_str(), "sam@example.com");

        let err = validate_registration(&registration("longenough", "different")).unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(err.field(), Some("password_confirm"));
    }

    #[test]
    fn test_inactive_message_matches_bad_credentials() {
        assert_eq!(
            AuthError::Inactive.user_message(),
            AuthError::InvalidCredentials.user_message()
        );
    }
}
