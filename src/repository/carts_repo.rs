use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::Repository;
use crate::entity::{cart_items, carts, products};

impl<C: ConnectionTrait> Repository<'_, C, carts::Entity> {
    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<carts::Model>, DbErr> {
        carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(self.conn)
            .await
    }
}

impl<C: ConnectionTrait> Repository<'_, C, cart_items::Entity> {
    pub async fn find_by_cart_id(&self, cart_id: Uuid) -> Result<Vec<cart_items::Model>, DbErr> {
        cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(self.conn)
            .await
    }

    /// Items of a cart joined with their products.
    pub async fn find_with_products(
        &self,
        cart_id: Uuid,
    ) -> Result<Vec<(cart_items::Model, Option<products::Model>)>, DbErr> {
        cart_items::Entity::find()
            .find_also_related(products::Entity)
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(self.conn)
            .await
    }

    pub async fn find_by_cart_and_product(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<cart_items::Model>, DbErr> {
        cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(self.conn)
            .await
    }

    pub async fn delete_by_cart_and_product(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DbErr> {
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
