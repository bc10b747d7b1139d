//! Shopfront storefront library.
//!
//! Catalog browsing, per-user carts and wishlists, and username/password
//! accounts, served as server-rendered HTML. The binary in `main.rs` wires
//! this up; integration tests build the same router.

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
