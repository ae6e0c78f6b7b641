//! Product and tag route handlers.
//!
//! Every handler is scoped to the authenticated caller. Products owned by
//! someone else are reported exactly like missing ones.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use myngo_core::ProductId;

use crate::db::{ProductRepository, TagRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Product, ProductPayload, TagDetail};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductData {
    pub product: Product,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProduct {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct TagList {
    pub tags: Vec<TagDetail>,
}

/// Parse a product id path segment; only positive integers are ids.
fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<ProductId>()
        .ok()
        .filter(|id| id.as_i32() > 0)
        .ok_or_else(AppError::invalid_product_id)
}

/// Unwrap a JSON body, turning extractor rejections into envelope errors.
///
/// Oversized bodies keep their 413; anything else unreadable is a 400.
fn json_body(body: std::result::Result<Json<ProductPayload>, JsonRejection>) -> Result<ProductPayload> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected product body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

/// `GET /products` - all of the caller's products, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<ApiResponse<ProductList>> {
    let products = ProductRepository::new(state.pool())
        .list_for_owner(user.id)
        .await?;

    Ok(ApiResponse::ok(
        "Products fetched successfully",
        ProductList { products },
    ))
}

/// `GET /products/tags/all` - the caller's tags, alphabetically.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn tags(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<ApiResponse<TagList>> {
    let tags = TagRepository::new(state.pool())
        .list_for_owner(user.id)
        .await?;

    Ok(ApiResponse::ok("Tags fetched successfully", TagList { tags }))
}

/// `GET /products/{id}` - one of the caller's products.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<ProductData>> {
    let id = parse_product_id(&id)?;

    let product = ProductRepository::new(state.pool())
        .get_for_owner(id, user.id)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    Ok(ApiResponse::ok(
        "Product fetched successfully",
        ProductData { product },
    ))
}

/// `POST /products` - create a product for the caller.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    body: std::result::Result<Json<ProductPayload>, JsonRejection>,
) -> Result<ApiResponse<ProductData>> {
    let input = json_body(body)?.validate()?;

    let product = ProductRepository::new(state.pool())
        .create(user.id, input)
        .await?;

    Ok(ApiResponse::created(
        "Product created successfully",
        ProductData { product },
    ))
}

/// `PUT /products/{id}` - replace one of the caller's products.
///
/// Ownership is checked before the body is validated, so a foreign id
/// answers 404 even for an incomplete body.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductPayload>, JsonRejection>,
) -> Result<ApiResponse<ProductData>> {
    let id = parse_product_id(&id)?;
    let repo = ProductRepository::new(state.pool());

    if !repo.exists_for_owner(id, user.id).await? {
        return Err(AppError::product_not_found());
    }

    let input = json_body(body)?.validate()?;

    let product = repo
        .update(id, user.id, input)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    Ok(ApiResponse::ok(
        "Product updated successfully",
        ProductData { product },
    ))
}

/// `DELETE /products/{id}` - delete one of the caller's products.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedProduct>> {
    let id = parse_product_id(&id)?;

    let deleted = ProductRepository::new(state.pool())
        .delete(id, user.id)
        .await?;
    if !deleted {
        return Err(AppError::product_not_found());
    }

    Ok(ApiResponse::ok(
        "Product deleted successfully",
        DeletedProduct { product_id: id },
    ))
}
