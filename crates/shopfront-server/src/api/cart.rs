//! Cart mutation surface.
//!
//! Carts are process-local, keyed by a caller-chosen cart id (one per
//! session). Every mutation answers with the resulting ordered line sequence
//! and totals derived from it on the spot.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use shopfront_core::{compute_totals, Cart, CartLine, CartTotals};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Shared in-memory cart collection. Each cart belongs to exactly one
/// session key; the lock is held only across a single mutation, and the
/// store attempt for add-item happens before it is taken.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<Mutex<HashMap<String, Cart>>>,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure against the cart for `cart_id`, creating it on first
    /// use, and return the resulting view.
    async fn mutate<F>(&self, cart_id: &str, f: F) -> CartView
    where
        F: FnOnce(&mut Cart),
    {
        let mut carts = self.carts.lock().await;
        let cart = carts.entry(cart_id.to_string()).or_default();
        f(cart);
        CartView::from_cart(cart)
    }

    /// Read-only view; an unknown cart id reads as an empty cart and is not
    /// created.
    async fn view(&self, cart_id: &str) -> CartView {
        let carts = self.carts.lock().await;
        carts
            .get(cart_id)
            .map_or_else(CartView::empty, CartView::from_cart)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CartView {
    items: Vec<CartLine>,
    total_items: u32,
    totals: CartTotals,
}

impl CartView {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart.lines().to_vec(),
            total_items: cart.total_items(),
            totals: compute_totals(cart.lines()),
        }
    }

    fn empty() -> Self {
        Self::from_cart(&Cart::new())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemRequest {
    pub product_id: Option<String>,
    /// Units to add; defaults to 1. Must be positive: remove-on-zero
    /// belongs to the set-quantity operation only.
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetQuantityRequest {
    pub quantity: Option<i64>,
}

pub(super) async fn get_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(cart_id): Path<String>,
) -> Json<ApiResponse<CartView>> {
    let view = state.carts.view(&cart_id).await;
    Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(cart_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let product_id = match body.product_id.as_deref() {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "product_id is required",
            ))
        }
    };

    let quantity = body.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "quantity must be at least 1",
        ));
    }
    let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

    // Resolve before locking the cart map: the store attempt may take up to
    // the bounded timeout and must not block other sessions' mutations.
    let Some((product, source)) = state.catalog.get_product(product_id).await else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("product '{product_id}' not found"),
        ));
    };

    tracing::debug!(%source, product_id, quantity, cart_id = %cart_id, "cart add");

    let view = state
        .carts
        .mutate(&cart_id, |cart| cart.add_item(&product, quantity))
        .await;

    Ok(Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn set_quantity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(body): Json<SetQuantityRequest>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let Some(quantity) = body.quantity else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "quantity is required",
        ));
    };

    let mut found = false;
    let view = state
        .carts
        .mutate(&cart_id, |cart| {
            found = cart.set_quantity(&product_id, quantity);
        })
        .await;

    if !found {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no cart line for product '{product_id}'"),
        ));
    }

    Ok(Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn remove_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Json<ApiResponse<CartView>> {
    let view = state
        .carts
        .mutate(&cart_id, |cart| {
            // Idempotent: removing an absent line is a successful no-op.
            cart.remove_item(&product_id);
        })
        .await;

    Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn clear_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(cart_id): Path<String>,
) -> Json<ApiResponse<CartView>> {
    let view = state.carts.mutate(&cart_id, Cart::clear).await;

    Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    })
}
