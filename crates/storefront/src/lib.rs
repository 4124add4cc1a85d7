//! Printshop storefront library.
//!
//! Catalog, session cart, checkout, simulated payment, the garment customiser
//! and the staff admin panel. Built as a library so the binary, the CLI and
//! the integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
