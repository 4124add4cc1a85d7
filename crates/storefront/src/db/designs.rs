//! Design repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use printshop_core::{DesignId, GarmentSize, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Design, DesignListItem, NewDesign};

const DESIGN_COLUMNS: &str =
    "d.id, d.user_id, d.product_id, d.design_data, d.preview, d.size, d.created_at";

#[derive(sqlx::FromRow)]
struct DesignRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    design_data: String,
    preview: Option<String>,
    size: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DesignRow> for Design {
    fn from(row: DesignRow) -> Self {
        Self {
            id: DesignId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            design_data: row.design_data,
            preview: row.preview,
            size: row.size.as_deref().and_then(GarmentSize::from_form),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DesignListRow {
    #[sqlx(flatten)]
    design: DesignRow,
    username: String,
    product_name: String,
}

impl From<DesignListRow> for DesignListItem {
    fn from(row: DesignListRow) -> Self {
        Self {
            design: row.design.into(),
            username: row.username,
            product_name: row.product_name,
        }
    }
}

/// Repository for saved designs.
pub struct DesignRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DesignRepository<'a> {
    /// Create a new design repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a design without a preview.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewDesign) -> Result<Design, RepositoryError> {
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            "INSERT INTO shop.designs AS d (user_id, product_id, design_data, size) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {DESIGN_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.product_id)
        .bind(&new.design_data)
        .bind(new.size.map(|s| s.as_str()))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Record the stored preview path of a design.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the design doesn't exist.
    pub async fn set_preview(&self, id: DesignId, preview: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.designs SET preview = $2 WHERE id = $1")
            .bind(id)
            .bind(preview)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a design with its owner and product names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: DesignId) -> Result<Option<DesignListItem>, RepositoryError> {
        let row = sqlx::query_as::<_, DesignListRow>(&format!(
            "SELECT {DESIGN_COLUMNS}, u.username, p.name AS product_name \
             FROM shop.designs d \
             JOIN shop.users u ON u.id = d.user_id \
             JOIN shop.products p ON p.id = d.product_id \
             WHERE d.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(DesignListItem::from))
    }

    /// All designs newest first, optionally only one user's.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_newest(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<DesignListItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, DesignListRow>(&format!(
            "SELECT {DESIGN_COLUMNS}, u.username, p.name AS product_name \
             FROM shop.designs d \
             JOIN shop.users u ON u.id = d.user_id \
             JOIN shop.products p ON p.id = d.product_id \
             WHERE $1::INTEGER IS NULL OR d.user_id = $1 \
             ORDER BY d.created_at DESC, d.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(DesignListItem::from).collect())
    }

    /// Count all designs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.designs")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_size_reads_as_none() {
        let row = DesignRow {
            id: 1,
            user_id: 2,
            product_id: 3,
            design_data: "{}".to_string(),
            preview: None,
            size: Some(String::new()),
            created_at: Utc::now(),
        };
        assert_eq!(Design::from(row).size, None);
    }
}
