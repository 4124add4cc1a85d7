//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Session cart, per-session locking and pricing
//! - `checkout` - Delivery form validation and order creation
//! - `payment` - Simulated payment
//! - `designs` - Saving customiser designs and their previews
//! - `media` - Uploaded files under the media root
//! - `auth` - Username/password accounts
//! - `admin` - Staff product form and account rules

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod designs;
pub mod form;
pub mod media;
pub mod payment;
