use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    error::AppResult,
    models::{Order, Payment},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{order_service, payment_service},
    state::AppState,
};

/// Order routes addressed by order id, mounted under `/orders`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/status", axum::routing::patch(update_order_status))
        .route("/{id}/payment", get(get_order_payment))
}

/// Checkout and history, mounted under `/users`.
pub fn user_router() -> Router<AppState> {
    Router::new().route("/{user_id}/orders", get(list_orders).post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/orders",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed from the cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart, missing address or insufficient stock"),
        (status = 404, description = "User not found"),
    ),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let order = order_service::checkout(&state, user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Order placed",
            order,
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/orders",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        OrderListQuery
    ),
    responses(
        (status = 200, description = "Order history", body = ApiResponse<OrderList>),
        (status = 404, description = "User not found"),
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let (items, meta) = order_service::list_orders(&state, user_id, query).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        OrderList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = order_service::get_order(&state, id).await?;
    Ok(Json(ApiResponse::success("OK", order, Some(Meta::empty()))))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Order>),
        (status = 400, description = "Invalid order status transition"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service::update_order_status(&state, id, payload.status).await?;
    Ok(Json(ApiResponse::success(
        "Order status updated",
        order,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Deleted order and its items"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order has a recorded payment"),
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    order_service::delete_order(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/payment",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Payment recorded for the order", body = ApiResponse<Payment>),
        (status = 404, description = "Order or payment not found"),
    ),
    tag = "Payments"
)]
pub async fn get_order_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let payment = payment_service::get_payment_for_order(&state, id).await?;
    Ok(Json(ApiResponse::success("OK", payment, None)))
}
