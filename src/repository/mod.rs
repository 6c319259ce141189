//! Access layer.
//!
//! [`Repository`] gives every entity the same CRUD surface over any SeaORM
//! connection, so the same code runs on the pool or inside a transaction.
//! Entity specific finders live in the submodules as extra `impl` blocks.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, Order, PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity::{
    cart_items, carts, categories, order_items, orders, payments, products, reviews, users,
};

mod carts_repo;
mod catalog_repo;
mod orders_repo;
mod reviews_repo;
mod users_repo;

pub use catalog_repo::name_contains;

pub type UserRepository<'a, C> = Repository<'a, C, users::Entity>;
pub type CategoryRepository<'a, C> = Repository<'a, C, categories::Entity>;
pub type ProductRepository<'a, C> = Repository<'a, C, products::Entity>;
pub type CartRepository<'a, C> = Repository<'a, C, carts::Entity>;
pub type CartItemRepository<'a, C> = Repository<'a, C, cart_items::Entity>;
pub type OrderRepository<'a, C> = Repository<'a, C, orders::Entity>;
pub type OrderItemRepository<'a, C> = Repository<'a, C, order_items::Entity>;
pub type PaymentRepository<'a, C> = Repository<'a, C, payments::Entity>;
pub type ReviewRepository<'a, C> = Repository<'a, C, reviews::Entity>;

pub struct Repository<'a, C, E> {
    conn: &'a C,
    entity: PhantomData<fn() -> E>,
}

impl<'a, C, E> Repository<'a, C, E>
where
    C: ConnectionTrait,
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    /// Persist a new row. Callers assign the id before inserting.
    pub async fn insert<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.insert(self.conn).await
    }

    pub async fn update<A>(&self, model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.update(self.conn).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(self.conn).await
    }

    /// Every row, in storage order.
    pub async fn find_all(&self) -> Result<Vec<E::Model>, DbErr> {
        E::find().all(self.conn).await
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = E::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// One page of rows matching `condition` plus the unpaged total.
    pub async fn find_page(
        &self,
        condition: Condition,
        order_by: E::Column,
        order: Order,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<E::Model>, u64), DbErr>
    where
        E::Model: Sync,
    {
        let finder = E::find().filter(condition).order_by(order_by, order);
        let total = finder.clone().count(self.conn).await?;
        let items = finder.limit(limit).offset(offset).all(self.conn).await?;
        Ok((items, total))
    }
}
