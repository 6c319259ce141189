use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, Set};
use uuid::Uuid;

use crate::{
    dto::products::SaveProductRequest,
    entity::products::{self, Column},
    error::{AppError, AppResult},
    models::Product,
    repository::{CategoryRepository, ProductRepository, name_contains},
    response::Meta,
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Products whose name contains `keyword`, ignoring case.
pub async fn search_by_keyword(state: &AppState, keyword: &str) -> AppResult<Vec<Product>> {
    let items = ProductRepository::new(&state.orm)
        .find_by_name_containing_ignore_case(keyword)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    Ok(items)
}

pub async fn get_all_products(state: &AppState) -> AppResult<Vec<Product>> {
    let items = ProductRepository::new(&state.orm)
        .find_all()
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    Ok(items)
}

pub async fn get_product_by_id(state: &AppState, id: Uuid) -> AppResult<Product> {
    ProductRepository::new(&state.orm)
        .find_by_id(id)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound("Product"))
}

pub async fn get_products_by_category(
    state: &AppState,
    category_id: Uuid,
) -> AppResult<Vec<Product>> {
    if CategoryRepository::new(&state.orm)
        .find_by_id(category_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Category"));
    }

    let items = ProductRepository::new(&state.orm)
        .find_by_category_id(category_id)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    Ok(items)
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<(Vec<Product>, Meta)> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(keyword) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(name_contains(keyword));
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let (items, total) = ProductRepository::new(&state.orm)
        .find_page(
            condition,
            sort_col,
            sort_order.into(),
            limit as u64,
            offset as u64,
        )
        .await?;

    let items = items.into_iter().map(Product::from).collect();
    Ok((items, Meta::new(page, limit, total as i64)))
}

/// Insert when `id` is absent or unknown, update otherwise.
///
/// The stored rating is derived from reviews and is left untouched by updates.
pub async fn save_product(
    state: &AppState,
    id: Option<Uuid>,
    payload: SaveProductRequest,
) -> AppResult<Product> {
    validate_product(&payload)?;

    if CategoryRepository::new(&state.orm)
        .find_by_id(payload.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Category"));
    }

    let products = ProductRepository::new(&state.orm);
    let existing = match id {
        Some(id) => products.find_by_id(id).await?,
        None => None,
    };

    let product = match existing {
        Some(existing) => {
            let mut active: products::ActiveModel = existing.into();
            active.name = Set(payload.name.trim().to_string());
            active.description = Set(payload.description);
            active.category_id = Set(payload.category_id);
            active.price = Set(payload.price);
            active.stock = Set(payload.stock);
            active.image_url = Set(payload.image_url);
            let product = products.update(active).await?;
            tracing::info!(product_id = %product.id, "product updated");
            product
        }
        None => {
            let product = products
                .insert(products::ActiveModel {
                    id: Set(id.unwrap_or_else(Uuid::new_v4)),
                    name: Set(payload.name.trim().to_string()),
                    description: Set(payload.description),
                    category_id: Set(payload.category_id),
                    price: Set(payload.price),
                    stock: Set(payload.stock),
                    image_url: Set(payload.image_url),
                    rating: Set(0.0),
                    created_at: Set(Utc::now().into()),
                })
                .await?;
            tracing::info!(product_id = %product.id, "product created");
            product
        }
    };

    Ok(product.into())
}

pub async fn delete_product(state: &AppState, id: Uuid) -> AppResult<()> {
    let deleted = ProductRepository::new(&state.orm)
        .delete(id)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict("Product is still referenced".into()),
            other => other,
        })?;

    if !deleted {
        return Err(AppError::NotFound("Product"));
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(())
}

fn validate_product(payload: &SaveProductRequest) -> AppResult<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    Ok(())
}
