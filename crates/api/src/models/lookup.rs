//! Reference data rows.

use serde::Serialize;

/// An active state from the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StateRecord {
    pub title: String,
    pub code: String,
    pub flag: Option<String>,
}
