use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::User,
    response::{ApiResponse, Meta},
    routes::{cart, orders},
    services::user_service,
    state::AppState,
};

/// Everything addressed by a user id: the profile, the cart and the order history.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_user))
        .merge(cart::router())
        .merge(orders::user_router())
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Get user", body = ApiResponse<User>),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = user_service::get_user(&state, user_id).await?;
    Ok(Json(ApiResponse::success("OK", user, Some(Meta::empty()))))
}
