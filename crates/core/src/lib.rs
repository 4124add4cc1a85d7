//! Printshop Core - Shared domain types.
//!
//! This crate provides the types used across all Printshop components:
//! - `storefront` - Public shop, customiser, checkout and the staff admin panel
//! - `cli` - Command-line tools for migrations, staff accounts and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no database
//! access, no HTTP. The optional `postgres` feature adds `sqlx` encode/decode
//! implementations so the types can be bound and fetched directly.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, order statuses, print areas and sizes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
