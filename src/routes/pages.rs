use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

/// Storefront pages and their assets, all read from `static_dir`.
pub fn router(static_dir: &Path) -> Router<AppState> {
    let html = static_dir.join("html");
    let index = ServeFile::new(html.join("index.html"));

    Router::new()
        .route_service("/", index.clone())
        .route_service("/index", index)
        .route_service("/products", ServeFile::new(html.join("products.html")))
        .route_service("/cart", ServeFile::new(html.join("cart.html")))
        .route_service("/account", ServeFile::new(html.join("account.html")))
        .nest_service("/html", ServeDir::new(html))
        .nest_service("/css", ServeDir::new(static_dir.join("css")))
        .nest_service("/js", ServeDir::new(static_dir.join("js")))
        .nest_service("/static", ServeDir::new(static_dir))
}
