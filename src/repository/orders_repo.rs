use sea_orm::{
    ActiveEnum, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use uuid::Uuid;

use super::Repository;
use crate::entity::{
    order_items,
    orders::{self, OrderStatus},
    payments::{self, PaymentStatus},
};

impl<C: ConnectionTrait> Repository<'_, C, orders::Entity> {
    /// Newest first.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<orders::Model>, DbErr> {
        orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(self.conn)
            .await
    }

    /// Moves the order from `current` to `next` only if it is still in `current`.
    pub async fn compare_and_set_status(
        &self,
        id: Uuid,
        current: OrderStatus,
        next: OrderStatus,
        updated_at: DateTimeWithTimeZone,
    ) -> Result<bool, DbErr> {
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(next.to_value()))
            .col_expr(orders::Column::UpdatedAt, Expr::value(updated_at))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::Status.eq(current))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

impl<C: ConnectionTrait> Repository<'_, C, order_items::Entity> {
    pub async fn find_by_order_id(&self, order_id: Uuid) -> Result<Vec<order_items::Model>, DbErr> {
        order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .all(self.conn)
            .await
    }
}

impl<C: ConnectionTrait> Repository<'_, C, payments::Entity> {
    pub async fn find_by_order_id(&self, order_id: Uuid) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order_id))
            .one(self.conn)
            .await
    }

    /// Applies a provider callback only if the payment is still in `current`.
    /// A missing `reference` keeps the stored one.
    pub async fn compare_and_set_status(
        &self,
        id: Uuid,
        current: PaymentStatus,
        next: PaymentStatus,
        provider: String,
        reference: Option<String>,
        updated_at: DateTimeWithTimeZone,
    ) -> Result<bool, DbErr> {
        let mut update = payments::Entity::update_many()
            .col_expr(payments::Column::Status, Expr::value(next.to_value()))
            .col_expr(payments::Column::Provider, Expr::value(provider))
            .col_expr(payments::Column::UpdatedAt, Expr::value(updated_at));
        if let Some(reference) = reference {
            update = update.col_expr(payments::Column::TransactionReference, Expr::value(reference));
        }
        let result = update
            .filter(payments::Column::Id.eq(id))
            .filter(payments::Column::Status.eq(current))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
