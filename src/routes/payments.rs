use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::PaymentWebhook,
    error::AppResult,
    models::Payment,
    response::{ApiResponse, Meta},
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(payment_webhook))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body = PaymentWebhook,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<Payment>),
        (status = 400, description = "Invalid payment status transition"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let payment = payment_service::record_payment(&state, payload).await?;
    Ok(Json(ApiResponse::success(
        "Payment recorded",
        payment,
        Some(Meta::empty()),
    )))
}
