//! Tag repository and product/tag association.
//!
//! Tags are owned by the user who created them. A normalized tag name exists
//! at most once per owner; resolution is lookup-or-create.
//!
//! The write helpers take a `&mut PgConnection` so they can run inside the
//! caller's transaction together with the product write.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use myngo_core::{ProductId, TagId, UserId, slugify};

use super::RepositoryError;
use crate::models::{ProductTagRow, TagDetail, TagSummary, normalize_tag_name};

/// Repository for tag reads.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every tag owned by `owner`, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<TagDetail>, RepositoryError> {
        let tags = sqlx::query_as::<_, TagDetail>(
            r"
            SELECT t_id AS id, t_name AS name, t_slug AS slug, t_created_at AS created_at
            FROM tags
            WHERE t_user_id = $1
            ORDER BY t_name ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(tags)
    }

    /// Tags attached to a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_product(&self, product_id: ProductId) -> Result<Vec<TagSummary>, RepositoryError> {
        let tags = sqlx::query_as::<_, TagSummary>(
            r"
            SELECT t.t_id AS id, t.t_name AS name, t.t_slug AS slug
            FROM product_tags pt
            JOIN tags t ON t.t_id = pt.pt_tag_id
            WHERE pt.pt_product_id = $1
            ORDER BY t.t_name ASC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(tags)
    }

    /// Tags for a batch of products in one query, grouped by product id.
    ///
    /// Products without tags are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Vec<TagSummary>>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductTagRow>(
            r"
            SELECT pt.pt_product_id AS product_id,
                   t.t_id AS id, t.t_name AS name, t.t_slug AS slug
            FROM product_tags pt
            JOIN tags t ON t.t_id = pt.pt_tag_id
            WHERE pt.pt_product_id = ANY($1)
            ORDER BY t.t_name ASC
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(group_by_product(rows))
    }
}

/// Group joined tag rows by product, keeping row order within each product.
fn group_by_product(rows: Vec<ProductTagRow>) -> HashMap<ProductId, Vec<TagSummary>> {
    let mut grouped: HashMap<ProductId, Vec<TagSummary>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.into());
    }
    grouped
}

/// Resolve free-text tag names to persisted tags for `owner`, creating the
/// missing ones.
///
/// The result follows input order. Blank names are skipped; repeated names
/// resolve to the same tag and appear once per occurrence.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a statement fails.
pub async fn resolve(
    conn: &mut PgConnection,
    names: &[String],
    owner: UserId,
) -> Result<Vec<TagSummary>, RepositoryError> {
    let mut tags = Vec::with_capacity(names.len());

    for raw in names {
        let Some(name) = normalize_tag_name(raw) else {
            continue;
        };
        let slug = slugify(&name);

        // The no-op update makes RETURNING yield the existing row on conflict,
        // leaving its original slug untouched.
        let tag = sqlx::query_as::<_, TagSummary>(
            r"
            INSERT INTO tags (t_name, t_slug, t_user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (t_user_id, t_name) DO UPDATE SET t_name = EXCLUDED.t_name
            RETURNING t_id AS id, t_name AS name, t_slug AS slug
            ",
        )
        .bind(&name)
        .bind(&slug)
        .bind(owner)
        .fetch_one(&mut *conn)
        .await?;

        tracing::debug!(tag_id = %tag.id, name = %tag.name, "Resolved tag");
        tags.push(tag);
    }

    Ok(tags)
}

/// Make `tag_ids` the complete tag set of a product.
///
/// Removes every existing association, then inserts the new ones. Repeated ids
/// are linked once. An empty slice leaves the product untagged.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a statement fails.
pub async fn replace_for_product(
    conn: &mut PgConnection,
    product_id: ProductId,
    tag_ids: &[TagId],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM product_tags WHERE pt_product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let ids: Vec<i32> = tag_ids.iter().map(TagId::as_i32).collect();
    sqlx::query(
        r"
        INSERT INTO product_tags (pt_product_id, pt_tag_id)
        SELECT $1, tag_id FROM UNNEST($2::INT4[]) AS tag_id
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(product_id)
    .bind(&ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product: i32, tag: i32, name: &str) -> ProductTagRow {
        ProductTagRow {
            product_id: ProductId::new(product),
            id: TagId::new(tag),
            name: name.to_string(),
            slug: slugify(name),
        }
    }

    #[test]
    fn test_group_by_product() {
        let grouped = group_by_product(vec![
            row(1, 10, "fresh"),
            row(2, 11, "local"),
            row(1, 12, "organic"),
        ]);

        assert_eq!(grouped.len(), 2);
        let first = &grouped[&ProductId::new(1)];
        assert_eq!(
            first.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            ["fresh", "organic"]
        );
        assert_eq!(grouped[&ProductId::new(2)][0].id, TagId::new(11));
        assert!(!grouped.contains_key(&ProductId::new(3)));
    }
}
