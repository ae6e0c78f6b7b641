//! Tag types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use myngo_core::{ProductId, TagId};

/// A tag as embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TagSummary {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

/// A tag in the caller's tag listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagDetail {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A tag joined to the product it labels (batch tag fetch).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductTagRow {
    pub product_id: ProductId,
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

impl From<ProductTagRow> for TagSummary {
    fn from(row: ProductTagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

/// Normalize a free-text tag name: trim and lowercase.
///
/// Returns `None` when nothing is left, in which case the candidate is skipped.
#[must_use]
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}
