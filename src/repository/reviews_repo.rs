use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::Repository;
use crate::entity::reviews;

impl<C: ConnectionTrait> Repository<'_, C, reviews::Entity> {
    pub async fn find_by_product_id(&self, product_id: Uuid) -> Result<Vec<reviews::Model>, DbErr> {
        reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(product_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(self.conn)
            .await
    }

    /// Mean rating of a product's reviews, 0 when it has none.
    pub async fn average_rating(&self, product_id: Uuid) -> Result<f64, DbErr> {
        let reviews = self.find_by_product_id(product_id).await?;
        if reviews.is_empty() {
            return Ok(0.0);
        }
        let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
        Ok(sum as f64 / reviews.len() as f64)
    }
}
