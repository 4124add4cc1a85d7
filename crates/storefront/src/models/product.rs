//! Catalog product.

use chrono::{DateTime, Utc};

use printshop_core::{Price, PrintArea, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Display image, relative to the media root.
    pub image: Option<String>,
    /// Transparent template used by the customiser, relative to the media root.
    pub template_image: Option<String>,
    /// Pixel size of the template image, when known.
    pub template_size: Option<(u32, u32)>,
    /// Printable rectangle inside the template image.
    pub print_area: PrintArea,
    pub created_at: DateTime<Utc>,
}

/// Product fields written by the admin forms and the seed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image: Option<String>,
    pub template_image: Option<String>,
    pub template_size: Option<(u32, u32)>,
    pub print_area: PrintArea,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            template_image: product.template_image.clone(),
            template_size: product.template_size,
            print_area: product.print_area,
        }
    }
}
