use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        categories::{CategoryList, CreateCategoryRequest},
        products::ProductList,
    },
    error::AppResult,
    models::Category,
    response::{ApiResponse, Meta},
    services::{category_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", get(get_category))
        .route("/{id}/products", get(list_category_products))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = category_service::list_categories(&state).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 409, description = "Category already exists"),
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = category_service::create_category(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Category created",
            category,
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = category_service::get_category(&state, id).await?;
    Ok(Json(ApiResponse::success("Category", category, None)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Products in category", body = ApiResponse<ProductList>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let items = product_service::get_products_by_category(&state, id).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    )))
}
