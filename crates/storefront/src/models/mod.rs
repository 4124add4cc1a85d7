//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the `FromRow` row
//! types in [`crate::db`].

pub mod design;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use design::{Design, DesignListItem, NewDesign};
pub use order::{DeliveryDetails, DraftItem, Order, OrderDraft, OrderItem};
pub use product::{Product, ProductInput};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
