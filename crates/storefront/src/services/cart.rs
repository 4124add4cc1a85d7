//! Session cart and cart summarizer.
//!
//! The cart lives in the visitor's session under [`session_keys::CART`] as a
//! JSON object mapping product IDs to quantities:
//!
//! ```json
//! {"3": {"qty": 2}, "7": {"qty": 1}}
//! ```
//!
//! Keys keep insertion order. Prices are never stored in the cart; they are
//! read from the catalog each time the cart is summarized.

use std::fmt;
use std::future::Future;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use printshop_core::{Price, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{Product, session_keys};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A cart key does not resolve to a catalog product.
    #[error("product not found: {0}")]
    UnknownProduct(String),

    /// Catalog lookup failed.
    #[error("catalog lookup failed: {0}")]
    Repository(#[from] RepositoryError),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

// =============================================================================
// Cart
// =============================================================================

/// Most units of one product a cart line can hold.
pub const MAX_LINE_QTY: u32 = 99;

/// One entry of the cart: a product key and its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Product ID as stored in the session (normally numeric).
    pub key: String,
    /// Requested quantity, always at least 1.
    pub qty: u32,
}

/// A visitor's shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines (the header badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.qty))
    }

    /// Add `qty` units of a product. An existing line keeps its position and
    /// has its quantity increased. A quantity of 0 is treated as 1, and a line
    /// never holds more than [`MAX_LINE_QTY`].
    pub fn add(&mut self, product_id: ProductId, qty: u32) {
        let qty = qty.clamp(1, MAX_LINE_QTY);
        let key = product_id.to_string();

        if let Some(line) = self.lines.iter_mut().find(|line| line.key == key) {
            line.qty = line.qty.saturating_add(qty).min(MAX_LINE_QTY);
        } else {
            self.lines.push(CartLine { key, qty });
        }
    }

    /// Remove a product's line. Returns `false` (and changes nothing) when
    /// the product is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let key = product_id.to_string();
        let before = self.lines.len();
        self.lines.retain(|line| line.key != key);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn upsert_raw(&mut self, key: String, qty: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.key == key) {
            line.qty = qty;
        } else {
            self.lines.push(CartLine { key, qty });
        }
    }
}

/// Quantity stored for a cart entry. Anything that is not a positive
/// integer (missing, zero, negative, non-numeric) counts as 1; larger values
/// are capped at [`MAX_LINE_QTY`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // f >= 1.0 and finite
fn coerce_qty(entry: &Value) -> u32 {
    let raw = entry.get("qty");
    let qty = match raw {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0)
                .map(|f| f.trunc() as u64)
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    qty.filter(|&q| q >= 1).map_or(1, |q| {
        u32::try_from(q).map_or(MAX_LINE_QTY, |q| q.min(MAX_LINE_QTY))
    })
}

#[derive(Serialize)]
struct StoredLine {
    qty: u32,
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lines.len()))?;
        for line in &self.lines {
            map.serialize_entry(&line.key, &StoredLine { qty: line.qty })?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CartVisitor;

        impl<'de> Visitor<'de> for CartVisitor {
            type Value = Cart;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of product IDs to {\"qty\": n}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Cart, A::Error> {
                let mut cart = Cart::new();
                while let Some((key, entry)) = access.next_entry::<String, Value>()? {
                    cart.upsert_raw(key, coerce_qty(&entry));
                }
                Ok(cart)
            }
        }

        deserializer.deserialize_map(CartVisitor)
    }
}

// =============================================================================
// Session-backed cart store
// =============================================================================

/// The cart stored in a visitor's session.
///
/// Mutations go through [`SessionCart::update`]. Requests of one session are
/// serialized by [`session_lock_middleware`], which holds the lock from before
/// the session record is loaded until after it is saved, so a read-modify-write
/// here never interleaves with another request of the same visitor.
///
/// [`session_lock_middleware`]: crate::middleware::session_lock_middleware
pub struct SessionCart<'a> {
    session: &'a Session,
}

impl<'a> SessionCart<'a> {
    /// Wrap a request's session.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Read the cart. A missing or unreadable cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn load(&self) -> Result<Cart, CartError> {
        read_cart(self.session).await
    }

    /// Apply `f` to the cart and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read or saved.
    #[instrument(skip(self, f))]
    pub async fn update<F, T>(&self, f: F) -> Result<T, CartError>
    where
        F: FnOnce(&mut Cart) -> T + Send,
        T: Send,
    {
        let mut cart = read_cart(self.session).await?;
        let result = f(&mut cart);
        self.store(&cart).await?;
        Ok(result)
    }

    /// Replace the stored cart and save the session.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be saved.
    pub async fn store(&self, cart: &Cart) -> Result<(), CartError> {
        self.session.insert(session_keys::CART, cart).await?;
        self.session.save().await?;
        Ok(())
    }
}

async fn read_cart(session: &Session) -> Result<Cart, CartError> {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            Ok(Cart::new())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Summarizer
// =============================================================================

/// Product lookup used by the summarizer.
pub trait ProductCatalog {
    /// Find a product by ID.
    fn find_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;
}

impl ProductCatalog for ProductRepository<'_> {
    fn find_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send {
        self.get_by_id(id)
    }
}

/// A resolved cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product: Product,
    pub qty: u32,
    /// Current price times quantity.
    pub subtotal: Price,
}

/// A priced cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Lines in cart insertion order.
    pub items: Vec<LineItem>,
    /// Sum of all subtotals.
    pub total: Price,
}

impl CartSummary {
    /// Whether there is nothing to buy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Resolve every cart line against the catalog at current prices.
///
/// # Errors
///
/// Returns `CartError::UnknownProduct` if any key is not a product ID or the
/// product no longer exists; the whole summary fails in that case.
#[instrument(skip_all, fields(lines = cart.lines().len()))]
pub async fn summarize<C>(cart: &Cart, catalog: &C) -> Result<CartSummary, CartError>
where
    C: ProductCatalog + Sync,
{
    let mut items = Vec::with_capacity(cart.lines().len());

    for line in cart.lines() {
        let id: ProductId = line
            .key
            .parse()
            .map_err(|_| CartError::UnknownProduct(line.key.clone()))?;

        let product = catalog
            .find_product(id)
            .await?
            .ok_or_else(|| CartError::UnknownProduct(line.key.clone()))?;

        let subtotal = product.price.times(line.qty);
        items.push(LineItem {
            product,
            qty: line.qty,
            subtotal,
        });
    }

    let total = items.iter().map(|item| item.subtotal).sum();
    Ok(CartSummary { items, total })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use printshop_core::PrintArea;

    use super::*;

    /// In-memory catalog for service tests.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub(crate) products: HashMap<ProductId, Product>,
    }

    impl FakeCatalog {
        pub(crate) fn with(products: &[(i32, &str, &str)]) -> Self {
            let products = products
                .iter()
                .map(|&(id, name, price)| {
                    let id = ProductId::new(id);
                    (
                        id,
                        Product {
                            id,
                            name: name.to_string(),
                            price: price.parse().unwrap(),
                            description: String::new(),
                            image: None,
                            template_image: None,
                            template_size: None,
                            print_area: PrintArea::default(),
                            created_at: Utc::now(),
                        },
                    )
                })
                .collect();
            Self { products }
        }
    }

    impl ProductCatalog for FakeCatalog {
        async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            Ok(self.products.get(&id).cloned())
        }
    }

    fn cart_from_json(json: &str) -> Cart {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_summary_totals_exactly() {
        let catalog = FakeCatalog::with(&[(3, "Tee", "9.99"), (7, "Hoodie", "5.00")]);
        let cart = cart_from_json(r#"{"3": {"qty": 2}, "7": {"qty": 1}}"#);

        let summary = summarize(&cart, &catalog).await.unwrap();

        assert_eq!(summary.total, Price::from_minor(2498));
        let subtotals: Vec<_> = summary.items.iter().map(|i| i.subtotal).collect();
        assert_eq!(subtotals, vec![Price::from_minor(1998), Price::from_minor(500)]);
    }

    #[tokio::test]
    async fn test_summary_keeps_insertion_order() {
        let catalog = FakeCatalog::with(&[(1, "A", "1.00"), (2, "B", "2.00"), (10, "C", "3.00")]);
        let cart = cart_from_json(r#"{"10": {"qty": 1}, "1": {"qty": 1}, "2": {"qty": 1}}"#);

        let summary = summarize(&cart, &catalog).await.unwrap();
        let names: Vec<_> = summary.items.iter().map(|i| i.product.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_summary_uses_current_price() {
        let mut catalog = FakeCatalog::with(&[(3, "Tee", "9.99")]);
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 1);

        if let Some(p) = catalog.products.get_mut(&ProductId::new(3)) {
            p.price = Price::from_minor(1250);
        }

        let summary = summarize(&cart, &catalog).await.unwrap();
        assert_eq!(summary.total, Price::from_minor(1250));
    }

    #[tokio::test]
    async fn test_summary_fails_on_missing_product() {
        let catalog = FakeCatalog::with(&[(3, "Tee", "9.99")]);
        let cart = cart_from_json(r#"{"3": {"qty": 1}, "99": {"qty": 1}}"#);

        let err = summarize(&cart, &catalog).await.unwrap_err();
        assert!(matches!(err, CartError::UnknownProduct(ref key) if key == "99"));
    }

    #[tokio::test]
    async fn test_summary_fails_on_non_numeric_key() {
        let catalog = FakeCatalog::with(&[(3, "Tee", "9.99")]);
        let cart = cart_from_json(r#"{"tee": {"qty": 1}}"#);

        assert!(matches!(
            summarize(&cart, &catalog).await,
            Err(CartError::UnknownProduct(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_summary() {
        let summary = summarize(&Cart::new(), &FakeCatalog::default()).await.unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.total, Price::ZERO);
    }

    #[test]
    fn test_qty_coercion() {
        let cart = cart_from_json(
            r#"{"1": {}, "2": {"qty": "4"}, "3": {"qty": 0}, "4": {"qty": -3},
                "5": {"qty": "abc"}, "6": 17, "7": {"qty": 2.0}}"#,
        );
        let qtys: Vec<_> = cart.lines().iter().map(|l| l.qty).collect();
        assert_eq!(qtys, vec![1, 4, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 2);
        cart.add(ProductId::new(7), 1);

        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(json, r#"{"3":{"qty":2},"7":{"qty":1}}"#);
    }

    #[test]
    fn test_add_accumulates_in_place() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 1);
        cart.add(ProductId::new(7), 1);
        cart.add(ProductId::new(3), 2);

        assert_eq!(
            cart.lines(),
            &[
                CartLine { key: "3".into(), qty: 3 },
                CartLine { key: "7".into(), qty: 1 },
            ]
        );
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_add_zero_counts_as_one() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = cart_from_json(r#"{"3": {"qty": 2}}"#);
        let before = cart.clone();

        assert!(!cart.remove(ProductId::new(8)));
        assert_eq!(cart, before);

        assert!(cart.remove(ProductId::new(3)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stored_oversized_qty_is_capped() {
        let cart = cart_from_json(r#"{"1": {"qty": 4294967295}, "2": {"qty": "100000000000"}}"#);
        let qtys: Vec<_> = cart.lines().iter().map(|l| l.qty).collect();
        assert_eq!(qtys, vec![MAX_LINE_QTY, MAX_LINE_QTY]);
    }

    #[test]
    fn test_add_caps_merged_line() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), u32::MAX);
        assert_eq!(cart.lines()[0].qty, MAX_LINE_QTY);

        cart.add(ProductId::new(4), 60);
        cart.add(ProductId::new(4), 60);
        assert_eq!(cart.lines()[1].qty, MAX_LINE_QTY);
        assert_eq!(cart.item_count(), 2 * MAX_LINE_QTY);
    }
}
