//! Product repository.
//!
//! Every query is filtered on the owner id, so rows belonging to other users
//! behave exactly like rows that do not exist.
//!
//! Creates and updates run in one transaction holding an advisory lock keyed
//! on the owner. The slug search and the write therefore see a stable set of
//! the owner's slugs, and a failure part way through leaves nothing behind.

use sqlx::{PgConnection, PgPool};

use myngo_core::{ProductId, SlugCandidates, TagId, UserId, slugify};

use super::RepositoryError;
use super::tags::{self, TagRepository};
use crate::models::{Product, ProductInput, ProductRow};

/// Advisory lock namespace for per-owner product writes.
const PRODUCT_WRITE_LOCK: i32 = 0x7072_6f64;

/// Slug base used when a name contains nothing slug-safe.
const FALLBACK_SLUG: &str = "product";

macro_rules! product_columns {
    () => {
        "p_id AS id, p_name AS name, p_description AS description, \
         p_category AS category, p_image_url AS image, p_status AS status, \
         p_featured AS featured, p_slug AS slug, p_business_id AS business_id, \
         p_created_at AS created_at, p_modified_at AS modified_at"
    };
}

/// Repository for product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the owner's products, newest first, each with its tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE p_user_id = $1 ORDER BY p_created_at DESC, p_id DESC"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<ProductId> = rows.iter().map(|row| row.id).collect();
        let mut tags = TagRepository::new(self.pool).for_products(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_tags = tags.remove(&row.id).unwrap_or_default();
                Product::from_row(row, product_tags)
            })
            .collect())
    }

    /// Get one of the owner's products.
    ///
    /// Returns `None` if the product does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_owner(
        &self,
        id: ProductId,
        owner: UserId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE p_id = $1 AND p_user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tags = TagRepository::new(self.pool).for_product(row.id).await?;
        Ok(Some(Product::from_row(row, tags)))
    }

    /// Check whether the owner has a product with this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_for_owner(
        &self,
        id: ProductId,
        owner: UserId,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE p_id = $1 AND p_user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a product with a slug unique among the owner's products, then
    /// resolve and attach its tags.
    ///
    /// The returned record carries the resolved tags in input order, repeats
    /// included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken despite the
    /// owner lock.
    /// Returns `RepositoryError::InvalidReference` if the business or owner
    /// does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner: UserId,
        input: ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, owner).await?;

        let slug = unique_slug(&mut tx, owner, &slug_base(&input.name), None).await?;

        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "INSERT INTO products (p_name, p_description, p_category, p_image_url, \
             p_status, p_featured, p_slug, p_business_id, p_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            product_columns!()
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.image.as_deref())
        .bind(input.status.is_active())
        .bind(input.featured)
        .bind(&slug)
        .bind(input.business_id)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product slug"))?;

        let tags = tags::resolve(&mut tx, &input.tags, owner).await?;
        let tag_ids: Vec<TagId> = tags.iter().map(|tag| tag.id).collect();
        tags::replace_for_product(&mut tx, row.id, &tag_ids).await?;

        tx.commit().await?;

        tracing::info!(product_id = %row.id, owner = %owner, slug = %row.slug, "Created product");
        Ok(Product::from_row(row, tags))
    }

    /// Replace every field of one of the owner's products and its tag set.
    ///
    /// The slug is re-derived only when the name changes. An empty tag list
    /// clears the product's tags. Returns `None` if the product does not exist
    /// or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken despite the
    /// owner lock.
    /// Returns `RepositoryError::InvalidReference` if the business does not
    /// exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        owner: UserId,
        input: ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, owner).await?;

        let stored_name = sqlx::query_scalar::<_, String>(
            "SELECT p_name FROM products WHERE p_id = $1 AND p_user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stored_name) = stored_name else {
            return Ok(None);
        };

        let slug = if stored_name == input.name {
            None
        } else {
            Some(unique_slug(&mut tx, owner, &slug_base(&input.name), Some(id)).await?)
        };

        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "UPDATE products SET p_name = $1, p_description = $2, p_category = $3, \
             p_image_url = $4, p_status = $5, p_featured = $6, p_business_id = $7, \
             p_slug = COALESCE($8, p_slug), p_modified_at = NOW() \
             WHERE p_id = $9 AND p_user_id = $10 RETURNING ",
            product_columns!()
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.image.as_deref())
        .bind(input.status.is_active())
        .bind(input.featured)
        .bind(input.business_id)
        .bind(slug.as_deref())
        .bind(id)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product slug"))?;

        let tags = tags::resolve(&mut tx, &input.tags, owner).await?;
        let tag_ids: Vec<TagId> = tags.iter().map(|tag| tag.id).collect();
        tags::replace_for_product(&mut tx, row.id, &tag_ids).await?;

        tx.commit().await?;

        tracing::info!(product_id = %row.id, owner = %owner, slug = %row.slug, "Updated product");
        Ok(Some(Product::from_row(row, tags)))
    }

    /// Delete one of the owner's products. Tag links go with it.
    ///
    /// Returns `false` if the product does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId, owner: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE p_id = $1 AND p_user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(product_id = %id, owner = %owner, "Deleted product");
        }
        Ok(deleted)
    }
}

/// Serialize product writes for one owner until the transaction ends.
async fn lock_owner(conn: &mut PgConnection, owner: UserId) -> Result<(), RepositoryError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(PRODUCT_WRITE_LOCK)
        .bind(owner)
        .execute(conn)
        .await?;
    Ok(())
}

/// Slug base for a product name.
fn slug_base(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// First candidate derived from `base` that none of the owner's other
/// products uses.
async fn unique_slug(
    conn: &mut PgConnection,
    owner: UserId,
    base: &str,
    exclude: Option<ProductId>,
) -> Result<String, RepositoryError> {
    for candidate in SlugCandidates::new(base) {
        let taken = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM products
                WHERE p_user_id = $1 AND p_slug = $2
                  AND ($3::INT4 IS NULL OR p_id <> $3)
            )
            ",
        )
        .bind(owner)
        .bind(&candidate)
        .bind(exclude)
        .fetch_one(&mut *conn)
        .await?;

        if !taken {
            return Ok(candidate);
        }
    }

    Err(RepositoryError::Conflict(format!("no free slug for '{base}'")))
}
