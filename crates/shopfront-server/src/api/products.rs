//! Catalog read endpoints.
//!
//! - `GET /api/v1/products`      — list, optionally active-only
//! - `GET /api/v1/products/{id}` — detail
//!
//! Both serve the shared `Product` record whichever source answered, so
//! callers cannot tell store data from fallback data by shape.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use shopfront_core::Product;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    /// Defaults to `true`: the storefront only shows purchasable products.
    pub active_only: Option<bool>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductListQuery>,
) -> Json<ApiResponse<Vec<Product>>> {
    let active_only = query.active_only.unwrap_or(true);
    let (products, source) = state.catalog.list_products(active_only).await;

    tracing::debug!(%source, count = products.len(), active_only, "catalog list served");

    Json(ApiResponse {
        data: products,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    match state.catalog.get_product(&id).await {
        Some((product, source)) => {
            tracing::debug!(%source, product_id = %id, "catalog detail served");
            Ok(Json(ApiResponse {
                data: product,
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("product '{id}' not found"),
        )),
    }
}
