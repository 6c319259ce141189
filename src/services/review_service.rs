use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    entity::reviews,
    error::{AppError, AppResult},
    models::Review,
    repository::{ProductRepository, ReviewRepository},
    services::cart_service::ensure_user,
    state::AppState,
};

pub async fn list_reviews(state: &AppState, product_id: Uuid) -> AppResult<Vec<Review>> {
    ensure_product(&state.orm, product_id).await?;
    let items = ReviewRepository::new(&state.orm)
        .find_by_product_id(product_id)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    Ok(items)
}

pub async fn create_review(
    state: &AppState,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<Review> {
    validate_rating(payload.rating)?;

    let txn = state.orm.begin().await?;
    ensure_user(&txn, payload.user_id).await?;
    ensure_product(&txn, product_id).await?;

    let review = ReviewRepository::new(&txn)
        .insert(reviews::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(payload.user_id),
            product_id: Set(product_id),
            rating: Set(payload.rating),
            comment: Set(payload.comment),
            created_at: Set(Utc::now().into()),
        })
        .await?;
    refresh_rating(&txn, product_id).await?;

    txn.commit().await?;

    tracing::info!(review_id = %review.id, product_id = %product_id, "review created");
    Ok(review.into())
}

pub async fn update_review(
    state: &AppState,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<Review> {
    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
    }

    let txn = state.orm.begin().await?;
    let reviews = ReviewRepository::new(&txn);
    let existing = reviews
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Review"))?;

    let product_id = existing.product_id;
    let mut active: reviews::ActiveModel = existing.into();
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(Some(comment));
    }
    let review = reviews.update(active).await?;
    refresh_rating(&txn, product_id).await?;

    txn.commit().await?;

    tracing::info!(review_id = %review.id, "review updated");
    Ok(review.into())
}

pub async fn delete_review(state: &AppState, id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let reviews = ReviewRepository::new(&txn);
    let existing = reviews
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Review"))?;

    reviews.delete(id).await?;
    refresh_rating(&txn, existing.product_id).await?;

    txn.commit().await?;

    tracing::info!(review_id = %id, "review deleted");
    Ok(())
}

async fn ensure_product<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> AppResult<()> {
    if ProductRepository::new(conn)
        .find_by_id(product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product"));
    }
    Ok(())
}

async fn refresh_rating<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> AppResult<()> {
    let average = ReviewRepository::new(conn)
        .average_rating(product_id)
        .await?;
    ProductRepository::new(conn)
        .set_rating(product_id, average)
        .await?;
    Ok(())
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    Ok(())
}
