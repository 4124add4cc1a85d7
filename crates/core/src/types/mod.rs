//! Core types for Printshop.
//!
//! Type-safe wrappers for the storefront's domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod print_area;
pub mod size;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CURRENCY_SYMBOL, Price, PriceError};
pub use print_area::{PrintArea, PrintAreaError};
pub use size::GarmentSize;
pub use status::{OrderStatus, ParseOrderStatusError};
