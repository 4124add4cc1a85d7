//! User domain types.

use chrono::{DateTime, Utc};

use printshop_core::{Email, UserId};

/// A site account. Staff accounts can use the admin panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Contact address, if one was given.
    pub email: Option<Email>,
    /// Whether the user may use the admin panel.
    pub is_staff: bool,
    /// Inactive users cannot log in.
    pub is_active: bool,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Whether this user currently holds the staff capability.
    #[must_use]
    pub const fn has_staff_access(&self) -> bool {
        self.is_active && self.is_staff
    }
}
