//! Saved customiser designs.

use chrono::{DateTime, Utc};

use printshop_core::{DesignId, GarmentSize, ProductId, UserId};

/// A saved design. Designs are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Design {
    pub id: DesignId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Opaque JSON document produced by the customiser.
    pub design_data: String,
    /// Rendered preview, relative to the media root.
    pub preview: Option<String>,
    pub size: Option<GarmentSize>,
    pub created_at: DateTime<Utc>,
}

/// A design joined with its owner and product names, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignListItem {
    pub design: Design,
    pub username: String,
    pub product_name: String,
}

/// Fields needed to insert a design row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDesign {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub design_data: String,
    pub size: Option<GarmentSize>,
}
