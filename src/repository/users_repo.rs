use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use super::Repository;
use crate::entity::users;

impl<C: ConnectionTrait> Repository<'_, C, users::Entity> {
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.conn)
            .await
    }
}
