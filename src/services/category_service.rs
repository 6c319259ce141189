use sea_orm::Set;
use uuid::Uuid;

use crate::{
    dto::categories::CreateCategoryRequest,
    entity::categories,
    error::{AppError, AppResult, is_unique_violation},
    models::Category,
    repository::CategoryRepository,
    state::AppState,
};

const CATEGORY_TAKEN: &str = "Category already exists";

pub async fn list_categories(state: &AppState) -> AppResult<Vec<Category>> {
    let items = CategoryRepository::new(&state.orm)
        .find_all()
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(items)
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<Category> {
    CategoryRepository::new(&state.orm)
        .find_by_id(id)
        .await?
        .map(Category::from)
        .ok_or(AppError::NotFound("Category"))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<Category> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let categories = CategoryRepository::new(&state.orm);
    if categories.find_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict(CATEGORY_TAKEN.into()));
    }

    let category = categories
        .insert(categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
        })
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict(CATEGORY_TAKEN.into())
            } else {
                AppError::from(err)
            }
        })?;

    tracing::info!(category_id = %category.id, "category created");
    Ok(category.into())
}
