//! myNGO Core - Shared types library.
//!
//! This crate provides common types used across all myNGO components:
//! - `api` - The JSON REST API server
//! - `cli` - Command-line tools for migrations, seeding and dev tokens
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, product status, slugs and JSON value coercions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
