use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};
use uuid::Uuid;

use crate::{
    dto::reviews::UpdateReviewRequest,
    error::AppResult,
    models::Review,
    response::{ApiResponse, Meta},
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_review).delete(delete_review))
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ApiResponse<Review>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Review not found"),
    ),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let review = review_service::update_review(&state, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Updated",
        review,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Deleted review"),
        (status = 404, description = "Review not found"),
    ),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    review_service::delete_review(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
