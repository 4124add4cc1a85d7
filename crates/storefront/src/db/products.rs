//! Product repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use printshop_core::{Price, PrintArea, ProductId};

use super::{RepositoryError, column_u32};
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, price, description, image, template_image, \
     template_width, template_height, print_x, print_y, print_w, print_h, created_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Price,
    description: String,
    image: Option<String>,
    template_image: Option<String>,
    template_width: Option<i32>,
    template_height: Option<i32>,
    print_x: i32,
    print_y: i32,
    print_w: i32,
    print_h: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let template_size = match (row.template_width, row.template_height) {
            (Some(w), Some(h)) => Some((
                column_u32(w, "template_width")?,
                column_u32(h, "template_height")?,
            )),
            _ => None,
        };

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            description: row.description,
            image: row.image,
            template_image: row.template_image,
            template_size,
            print_area: PrintArea::new(row.print_x, row.print_y, row.print_w, row.print_h),
            created_at: row.created_at,
        })
    }
}

fn size_columns(size: Option<(u32, u32)>) -> (Option<i32>, Option<i32>) {
    size.map_or((None, None), |(w, h)| {
        (i32::try_from(w).ok(), i32::try_from(h).ok())
    })
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// List products newest first, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_newest(&self, limit: Option<i64>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let (template_width, template_height) = size_columns(input.template_size);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO shop.products \
                 (name, price, description, image, template_image, template_width, \
                  template_height, print_x, print_y, print_w, print_h) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.template_image)
        .bind(template_width)
        .bind(template_height)
        .bind(input.print_area.x)
        .bind(input.print_area.y)
        .bind(input.print_area.width)
        .bind(input.print_area.height)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Overwrite every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let (template_width, template_height) = size_columns(input.template_size);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE shop.products SET \
                 name = $2, price = $3, description = $4, image = $5, template_image = $6, \
                 template_width = $7, template_height = $8, \
                 print_x = $9, print_y = $10, print_w = $11, print_h = $12 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.template_image)
        .bind(template_width)
        .bind(template_height)
        .bind(input.print_area.x)
        .bind(input.print_area.y)
        .bind(input.print_area.width)
        .bind(input.print_area.height)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Delete a product. Its designs go with it; order items keep their
    /// history with the product reference cleared.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a product with this name exists (used by the seed command).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.products WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_without_template_size() {
        let row = ProductRow {
            id: 3,
            name: "Tee".to_string(),
            price: Price::from_minor(999),
            description: String::new(),
            image: None,
            template_image: None,
            template_width: None,
            template_height: Some(600),
            print_x: 150,
            print_y: 200,
            print_w: 300,
            print_h: 400,
            created_at: Utc::now(),
        };

        let product = Product::try_from(row).ok();
        let product = product.as_ref();
        assert_eq!(product.map(|p| p.template_size), Some(None));
        assert_eq!(
            product.map(|p| p.print_area),
            Some(PrintArea::COLUMN_DEFAULT)
        );
    }

    #[test]
    fn test_size_columns() {
        assert_eq!(size_columns(Some((600, 700))), (Some(600), Some(700)));
        assert_eq!(size_columns(None), (None, None));
    }
}
