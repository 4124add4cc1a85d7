//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use printshop_core::{Email, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, is_staff, is_active, date_joined";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    is_staff: bool,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = if row.email.is_empty() {
            None
        } else {
            Some(Email::parse(&row.email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?)
        };

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            is_staff: row.is_staff,
            is_active: row.is_active,
            date_joined: row.date_joined,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: Option<&Email>,
        password_hash: &str,
        is_staff: bool,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO shop.users (username, email, password_hash, is_staff) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email.map_or("", Email::as_str))
        .bind(password_hash)
        .bind(is_staff)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        User::try_from(row)
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_newest(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users ORDER BY date_joined DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Set a user's active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_active(&self, id: UserId, is_active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: &str) -> UserRow {
        UserRow {
            id: 1,
            username: "alex".to_string(),
            email: email.to_string(),
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_blank_email_maps_to_none() {
        let user = User::try_from(row("")).ok();
        assert_eq!(user.map(|u| u.email), Some(None));
    }

    #[test]
    fn test_corrupt_email_is_reported() {
        assert!(matches!(
            User::try_from(row("not-an-email")),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
