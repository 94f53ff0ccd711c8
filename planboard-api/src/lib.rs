//! # Planboard API Server Library
//!
//! Core functionality for the Planboard API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, auth gate
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `storage`: Upload directory file storage

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod storage;
