use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func, LikeExpr},
};
use uuid::Uuid;

use super::Repository;
use crate::entity::{categories, products};

impl<C: ConnectionTrait> Repository<'_, C, categories::Entity> {
    pub async fn find_by_name(&self, name: &str) -> Result<Option<categories::Model>, DbErr> {
        categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(self.conn)
            .await
    }
}

impl<C: ConnectionTrait> Repository<'_, C, products::Entity> {
    pub async fn find_by_category_id(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<products::Model>, DbErr> {
        products::Entity::find()
            .filter(products::Column::CategoryId.eq(category_id))
            .order_by_asc(products::Column::CreatedAt)
            .all(self.conn)
            .await
    }

    /// Case-insensitive substring match on the product name.
    pub async fn find_by_name_containing_ignore_case(
        &self,
        keyword: &str,
    ) -> Result<Vec<products::Model>, DbErr> {
        products::Entity::find()
            .filter(name_contains(keyword))
            .order_by_asc(products::Column::CreatedAt)
            .all(self.conn)
            .await
    }

    /// Take `quantity` units if at least that many are in stock.
    pub async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<bool, DbErr> {
        let result = products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).sub(quantity),
            )
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::Stock.gte(quantity))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<(), DbErr> {
        products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).add(quantity),
            )
            .filter(products::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_rating(&self, id: Uuid, rating: f64) -> Result<(), DbErr> {
        products::Entity::update_many()
            .col_expr(products::Column::Rating, Expr::value(rating))
            .filter(products::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(())
    }
}

/// `LOWER(name) LIKE '%keyword%'` with the keyword's wildcards escaped.
pub fn name_contains(keyword: &str) -> sea_orm::sea_query::SimpleExpr {
    let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(products::Column::Name)))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// Escape `\`, `%` and `_` so user input only ever matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn plain_keywords_pass_through() {
        assert_eq!(escape_like("phone"), "phone");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
    }
}
