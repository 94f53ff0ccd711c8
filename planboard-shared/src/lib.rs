//! # Planboard Shared Library
//!
//! This crate contains the types and data access shared by the Planboard
//! API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their sqlx queries
//! - `auth`: JWT tokens and password hashing
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Planboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
