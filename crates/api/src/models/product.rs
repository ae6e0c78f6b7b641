//! Product types.
//!
//! `ProductPayload` is the loosely typed request body, `ProductInput` the
//! validated form handed to the repository, `ProductRow` the stored columns and
//! `Product` the formatted record returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use myngo_core::{BusinessId, ProductId, ProductStatus, is_truthy, optional_id};

use super::tag::TagSummary;

/// Image URL reported for products stored without one.
pub const IMAGE_PLACEHOLDER_URL: &str = "https://placehold.co/600x400/e2e8f0/64748b?text=No+Image";

/// Stored product columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub status: bool,
    pub featured: bool,
    pub slug: String,
    pub business_id: Option<BusinessId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A product as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub status: ProductStatus,
    pub featured: bool,
    pub slug: String,
    pub business_id: Option<BusinessId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub tags: Vec<TagSummary>,
}

impl Product {
    /// Format a stored row for output, attaching its tags.
    ///
    /// Translates the active flag into a status and substitutes the placeholder
    /// image for a missing or blank URL.
    #[must_use]
    pub fn from_row(row: ProductRow, tags: Vec<TagSummary>) -> Self {
        let image = row
            .image
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| IMAGE_PLACEHOLDER_URL.to_string());

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            image,
            status: ProductStatus::from_active(row.status),
            featured: row.featured,
            slug: row.slug,
            business_id: row.business_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
            tags,
        }
    }
}

/// Request body for creating or updating a product.
///
/// `status`, `featured`, `businessId` and `tags` accept any JSON value and
/// are coerced by [`ProductPayload::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub status: Option<Value>,
    pub featured: Option<Value>,
    pub business_id: Option<Value>,
    pub tags: Option<Value>,
}

/// A create or update request body that cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidProduct {
    /// `name`, `description` or `category` is absent or blank.
    #[error("Name, description, and category are required")]
    MissingFields,

    /// `businessId` is set but is not an integer id.
    #[error("Invalid business ID")]
    BusinessId,
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    /// Trimmed display name.
    pub name: String,
    /// Trimmed description.
    pub description: String,
    /// Category, stored as given.
    pub category: String,
    /// Trimmed image URL, `None` when blank.
    pub image: Option<String>,
    pub status: ProductStatus,
    pub featured: bool,
    pub business_id: Option<BusinessId>,
    /// Raw tag names, normalized later by tag resolution.
    pub tags: Vec<String>,
}

impl ProductPayload {
    /// Validate required fields and coerce the loose ones.
    ///
    /// Partial payloads are rejected, never merged with stored values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProduct::MissingFields`] if `name`, `description` or
    /// `category` is absent or blank, and [`InvalidProduct::BusinessId`] if
    /// `businessId` is truthy but not an integer.
    pub fn validate(self) -> Result<ProductInput, InvalidProduct> {
        let name = required(self.name)?;
        let description = required(self.description)?;
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .ok_or(InvalidProduct::MissingFields)?;
        let business_id = optional_id(self.business_id.as_ref())
            .map_err(|_| InvalidProduct::BusinessId)?
            .map(BusinessId::new);

        let image = self
            .image
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let tags = match self.tags {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(ProductInput {
            name,
            description,
            category,
            image,
            status: ProductStatus::from_request_value(self.status.as_ref()),
            featured: self.featured.as_ref().is_some_and(is_truthy),
            business_id,
            tags,
        })
    }
}

fn required(value: Option<String>) -> Result<String, InvalidProduct> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(InvalidProduct::MissingFields)
}
