use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView},
    error::AppResult,
    models::CartItem,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

/// Mounted under `/users`, next to the profile route.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/cart", get(get_cart).delete(clear_cart))
        .route("/{user_id}/cart/items", post(add_to_cart))
        .route("/{user_id}/cart/items/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/cart",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Cart with product details and subtotal", body = ApiResponse<CartView>),
        (status = 404, description = "User not found"),
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::get_cart(&state, user_id).await?;
    let meta = Meta::total(cart.items.len());
    Ok(Json(ApiResponse::success("OK", cart, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/cart/items",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add or update cart item", body = ApiResponse<CartItem>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "User or product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let item = cart_service::add_to_cart(&state, user_id, payload).await?;
    Ok(Json(ApiResponse::success("OK", item, None)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/cart/items/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    cart_service::remove_from_cart(&state, user_id, product_id).await?;
    Ok(Json(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/cart",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Cart cleared", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    cart_service::clear_cart(&state, user_id).await?;
    Ok(Json(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
