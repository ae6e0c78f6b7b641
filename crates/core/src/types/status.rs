//! Product lifecycle status.
//!
//! Stored as a native `BOOLEAN` active flag; exposed on the wire as the
//! strings `"active"` / `"inactive"`.

use serde::{Deserialize, Serialize};

/// Externally visible product status.
///
/// There are exactly two states. No draft, archived or soft-deleted state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    #[default]
    Inactive,
}

impl ProductStatus {
    /// Build from the stored active flag.
    #[must_use]
    pub const fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    /// The stored active flag.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Interpret a raw request value.
    ///
    /// Only the exact JSON string `"active"` selects [`ProductStatus::Active`];
    /// anything else (missing, `true`, `"ACTIVE"`, `1`) is inactive.
    #[must_use]
    pub fn from_request_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) if s == "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}
