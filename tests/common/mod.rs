#![allow(dead_code)]

use std::path::Path;

use axum::{Router, body::Body, http::Request, response::Response};
use storefront::{
    db::{create_orm_conn, run_migrations},
    dto::{auth::RegisterRequest, categories::CreateCategoryRequest, products::SaveProductRequest},
    models::{Category, Product, User},
    routes::build_router,
    services::{category_service, product_service, user_service},
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Fresh in-memory SQLite database with the full schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:", 1).await?;
    run_migrations(&orm).await?;
    Ok(AppState { orm })
}

pub fn app(state: AppState) -> Router {
    build_router(state, Path::new("static"))
}

pub async fn send(app: Router, request: Request<Body>) -> anyhow::Result<(Response, serde_json::Value)> {
    let response = app.oneshot(request).await?;
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await?;
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    Ok((Response::from_parts(parts, Body::empty()), json))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Test User".into(),
        email: email.into(),
        password: "s3cret-pass".into(),
        phone: Some("+62 811 0000".into()),
        address: Some("1 Crab Street".into()),
        role: None,
    }
}

pub async fn create_user(state: &AppState, email: &str) -> anyhow::Result<User> {
    Ok(user_service::register_user(state, register_request(email)).await?)
}

pub async fn create_category(state: &AppState, name: &str) -> anyhow::Result<Category> {
    let payload = CreateCategoryRequest { name: name.into() };
    Ok(category_service::create_category(state, payload).await?)
}

pub fn product_payload(category_id: Uuid, name: &str, price: i64, stock: i32) -> SaveProductRequest {
    SaveProductRequest {
        name: name.into(),
        description: Some(format!("{name} description")),
        category_id,
        price,
        stock,
        image_url: None,
    }
}

pub async fn create_product(
    state: &AppState,
    category_id: Uuid,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let payload = product_payload(category_id, name, price, stock);
    Ok(product_service::save_product(state, None, payload).await?)
}
