mod common;

use axum::http::StatusCode;
use serde_json::json;
use storefront::{
    dto::cart::AddToCartRequest,
    error::AppError,
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{cart_service, category_service, product_service},
};
use uuid::Uuid;

#[tokio::test]
async fn keyword_search_ignores_case() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let category = common::create_category(&state, "Electronics").await?;
    common::create_product(&state, category.id, "Smartphone X", 500_000, 5).await?;
    common::create_product(&state, category.id, "PHONE case", 20_000, 50).await?;
    common::create_product(&state, category.id, "Laptop", 900_000, 2).await?;

    let upper = product_service::search_by_keyword(&state, "PHONE").await?;
    let lower = product_service::search_by_keyword(&state, "phone").await?;

    let ids = |items: &[storefront::models::Product]| items.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(upper.len(), 2);
    assert_eq!(ids(&upper), ids(&lower));

    // LIKE wildcards in the keyword are matched literally.
    assert!(product_service::search_by_keyword(&state, "%").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn keyword_search_folds_ascii_around_accents() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let category = common::create_category(&state, "Desserts").await?;
    let dessert = common::create_product(&state, category.id, "Crème Brûlée", 900, 8).await?;

    let found = product_service::search_by_keyword(&state, "CRèME").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, dessert.id);
    assert_eq!(product_service::search_by_keyword(&state, "brûlée").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_product_is_not_found() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let id = Uuid::new_v4();

    let err = product_service::get_product_by_id(&state, id)
        .await
        .expect_err("no such product");
    assert!(matches!(err, AppError::NotFound("Product")));

    let (response, body) =
        common::send(common::app(state), common::get(&format!("/api/products/{id}"))).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
    Ok(())
}

#[tokio::test]
async fn saved_product_keeps_its_category() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let books = common::create_category(&state, "Books").await?;
    let games = common::create_category(&state, "Games").await?;

    let product = common::create_product(&state, books.id, "Rust Book", 300_000, 10).await?;
    let fetched = product_service::get_product_by_id(&state, product.id).await?;
    assert_eq!(fetched.category_id, books.id);
    assert_eq!(fetched.rating, 0.0);

    let moved = product_service::save_product(
        &state,
        Some(product.id),
        common::product_payload(games.id, "Rust Book 2e", 350_000, 8),
    )
    .await?;
    assert_eq!(moved.id, product.id);
    assert_eq!(moved.category_id, games.id);
    assert_eq!(moved.price, 350_000);

    let in_games = product_service::get_products_by_category(&state, games.id).await?;
    assert_eq!(in_games.len(), 1);
    assert!(product_service::get_products_by_category(&state, books.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn save_with_unknown_id_inserts_under_that_id() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let category = common::create_category(&state, "Toys").await?;
    let id = Uuid::new_v4();

    let product = product_service::save_product(
        &state,
        Some(id),
        common::product_payload(category.id, "Plush Crab", 90_000, 3),
    )
    .await?;
    assert_eq!(product.id, id);
    assert_eq!(product_service::get_all_products(&state).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn save_validates_category_and_amounts() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let err = common::create_product(&state, Uuid::new_v4(), "Orphan", 1, 1)
        .await
        .expect_err("unknown category");
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::NotFound("Category"))
    ));

    let category = common::create_category(&state, "Misc").await?;
    let err = common::create_product(&state, category.id, "Negative", -5, 1)
        .await
        .expect_err("negative price");
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn categories_are_unique_by_name() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let created = common::create_category(&state, "Garden").await?;

    let fetched = category_service::get_category(&state, created.id).await?;
    assert_eq!(fetched.name, "Garden");

    let err = common::create_category(&state, "Garden")
        .await
        .expect_err("duplicate name");
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Conflict(msg)) if msg == "Category already exists"
    ));
    assert_eq!(category_service::list_categories(&state).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn product_listing_filters_sorts_and_pages() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let category = common::create_category(&state, "Kitchen").await?;
    let other = common::create_category(&state, "Office").await?;
    for (name, price) in [("Pan", 300), ("Pot", 100), ("Kettle", 200)] {
        common::create_product(&state, category.id, name, price, 1).await?;
    }
    common::create_product(&state, other.id, "Stapler", 150, 1).await?;

    let query = ProductQuery {
        category_id: Some(category.id),
        sort_by: Some(ProductSortBy::Price),
        sort_order: Some(SortOrder::Asc),
        per_page: Some(2),
        ..Default::default()
    };
    let (items, meta) = product_service::list_products(&state, query).await?;
    assert_eq!(items.iter().map(|p| p.price).collect::<Vec<_>>(), vec![100, 200]);
    assert_eq!(meta.total, Some(3));
    assert_eq!(meta.per_page, Some(2));

    let query = ProductQuery {
        min_price: Some(150),
        max_price: Some(250),
        sort_by: Some(ProductSortBy::Name),
        sort_order: Some(SortOrder::Asc),
        ..Default::default()
    };
    let (items, _) = product_service::list_products(&state, query).await?;
    let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Kettle", "Stapler"]);

    let (response, body) = common::send(
        common::app(state),
        common::get("/api/products?q=P&sort_by=name&sort_order=asc"),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);
    Ok(())
}

#[tokio::test]
async fn referenced_product_cannot_be_deleted() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "cart@example.com").await?;
    let category = common::create_category(&state, "Audio").await?;
    let kept = common::create_product(&state, category.id, "Headphones", 1_000, 5).await?;
    let spare = common::create_product(&state, category.id, "Cable", 100, 5).await?;

    cart_service::add_to_cart(
        &state,
        user.id,
        AddToCartRequest {
            product_id: kept.id,
            quantity: 1,
        },
    )
    .await?;

    let err = product_service::delete_product(&state, kept.id)
        .await
        .expect_err("still in a cart");
    assert!(matches!(err, AppError::Conflict(ref msg) if msg == "Product is still referenced"));

    product_service::delete_product(&state, spare.id).await?;
    let err = product_service::delete_product(&state, spare.id)
        .await
        .expect_err("already gone");
    assert!(matches!(err, AppError::NotFound("Product")));
    Ok(())
}

#[tokio::test]
async fn product_endpoints_create_and_search() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let (response, body) = common::send(
        common::app(state.clone()),
        common::json_request("POST", "/api/categories", json!({ "name": "Outdoor" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category_id = body["data"]["id"].as_str().expect("category id").to_string();

    let (response, body) = common::send(
        common::app(state.clone()),
        common::json_request(
            "POST",
            "/api/products",
            json!({
                "name": "Camping Lamp",
                "category_id": category_id,
                "price": 45_000,
                "stock": 12
            }),
        ),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Camping Lamp");

    let (response, body) = common::send(
        common::app(state.clone()),
        common::get("/api/products/search?keyword=LAMP"),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = common::send(
        common::app(state),
        common::get(&format!("/api/categories/{category_id}/products")),
    )
    .await?;
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}
