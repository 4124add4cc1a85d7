//! Demo catalog for local development.
//!
//! Products are matched by name, so running the command again only adds
//! whatever is missing.

use printshop_core::{Price, PrintArea};
use printshop_storefront::db::ProductRepository;
use printshop_storefront::models::ProductInput;

use super::{CommandError, connect};

/// Name, price in pence, description.
const DEMO_PRODUCTS: [(&str, i64, &str); 4] = [
    (
        "Classic T-Shirt",
        1499,
        "Soft cotton crew neck. Add your own text or artwork to the front.",
    ),
    (
        "Pullover Hoodie",
        3499,
        "Heavyweight fleece hoodie with a large front print area.",
    ),
    (
        "Tote Bag",
        999,
        "Sturdy canvas tote, printed on one side.",
    ),
    (
        "Long Sleeve Tee",
        1899,
        "Everyday long sleeve top in brushed cotton.",
    ),
];

/// Build the insert for one demo product.
fn demo_input(name: &str, price_minor: i64, description: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price: Price::from_minor(price_minor),
        description: description.to_string(),
        image: None,
        template_image: None,
        template_size: None,
        print_area: PrintArea::COLUMN_DEFAULT,
    }
}

/// Insert demo products that don't exist yet.
///
/// # Returns
///
/// The number of products added.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn products() -> Result<usize, CommandError> {
    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    let mut added = 0;
    for (name, price, description) in DEMO_PRODUCTS {
        if repo.exists_by_name(name).await? {
            tracing::debug!(name, "Product already present");
            continue;
        }
        let product = repo.create(&demo_input(name, price, description)).await?;
        tracing::info!(product_id = %product.id, name, "Added demo product");
        added += 1;
    }

    tracing::info!(added, "Demo catalog seeded");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_demo_names_are_unique() {
        let names: HashSet<_> = DEMO_PRODUCTS.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names.len(), DEMO_PRODUCTS.len());
    }

    #[test]
    fn test_demo_input_is_valid() {
        for (name, price, description) in DEMO_PRODUCTS {
            let input = demo_input(name, price, description);
            assert!(input.price > Price::ZERO);
            assert!(input.print_area.validate(None).is_ok());
        }
    }
}
