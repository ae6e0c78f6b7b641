//! Core types for myNGO.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coerce;
pub mod id;
pub mod slug;
pub mod status;

pub use coerce::{InvalidId, is_truthy, optional_id};
pub use id::*;
pub use slug::{SlugCandidates, slugify};
pub use status::ProductStatus;
