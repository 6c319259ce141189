use chrono::Utc;
use sea_orm::{ConnectionTrait, Set};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartLine, CartView},
    entity::{cart_items, carts},
    error::{AppError, AppResult, is_unique_violation},
    models::{CartItem, Product},
    repository::{CartItemRepository, CartRepository, ProductRepository, UserRepository},
    state::AppState,
};

pub async fn get_cart(state: &AppState, user_id: Uuid) -> AppResult<CartView> {
    ensure_user(&state.orm, user_id).await?;

    let cart = CartRepository::new(&state.orm)
        .find_by_user_id(user_id)
        .await?;
    let Some(cart) = cart else {
        return Ok(CartView {
            cart_id: None,
            user_id,
            items: Vec::new(),
            subtotal: 0,
        });
    };

    let rows = CartItemRepository::new(&state.orm)
        .find_with_products(cart.id)
        .await?;

    let mut subtotal = 0;
    let mut items = Vec::with_capacity(rows.len());
    for (item, product) in rows {
        let product = product.ok_or(AppError::NotFound("Product"))?;
        let line_total = line_total(product.price, item.quantity)?;
        subtotal = add_amounts(subtotal, line_total)?;
        items.push(CartLine {
            id: item.id,
            product: Product::from(product),
            quantity: item.quantity,
            line_total,
        });
    }

    Ok(CartView {
        cart_id: Some(cart.id),
        user_id,
        items,
        subtotal,
    })
}

/// Put `quantity` of a product in the user's cart, replacing any previous quantity.
pub async fn add_to_cart(
    state: &AppState,
    user_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<CartItem> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    ensure_user(&state.orm, user_id).await?;

    if ProductRepository::new(&state.orm)
        .find_by_id(payload.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product"));
    }

    let cart = find_or_create_cart(&state.orm, user_id).await?;
    let items = CartItemRepository::new(&state.orm);

    let existing = items
        .find_by_cart_and_product(cart.id, payload.product_id)
        .await?;

    let item = match existing {
        Some(item) => set_quantity(&state.orm, item, payload.quantity).await?,
        None => {
            let inserted = items
                .insert(cart_items::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(payload.product_id),
                    quantity: Set(payload.quantity),
                    created_at: Set(Utc::now().into()),
                })
                .await;
            match inserted {
                Ok(item) => item,
                // Another request added the same product first.
                Err(err) if is_unique_violation(&err) => {
                    let item = items
                        .find_by_cart_and_product(cart.id, payload.product_id)
                        .await?
                        .ok_or(AppError::NotFound("Cart item"))?;
                    set_quantity(&state.orm, item, payload.quantity).await?
                }
                Err(err) => return Err(err.into()),
            }
        }
    };

    tracing::info!(
        user_id = %user_id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        "cart updated"
    );
    Ok(item.into())
}

pub async fn remove_from_cart(state: &AppState, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
    let cart = CartRepository::new(&state.orm)
        .find_by_user_id(user_id)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;

    let removed = CartItemRepository::new(&state.orm)
        .delete_by_cart_and_product(cart.id, product_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound("Cart item"));
    }

    tracing::info!(user_id = %user_id, product_id = %product_id, "removed from cart");
    Ok(())
}

/// Drop the whole cart; its items go with it through the foreign key cascade.
pub async fn clear_cart(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let carts = CartRepository::new(&state.orm);
    let cart = carts
        .find_by_user_id(user_id)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;

    carts.delete(cart.id).await?;

    tracing::info!(user_id = %user_id, cart_id = %cart.id, "cart cleared");
    Ok(())
}

async fn find_or_create_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<carts::Model> {
    let carts = CartRepository::new(conn);
    if let Some(cart) = carts.find_by_user_id(user_id).await? {
        return Ok(cart);
    }

    let created = carts
        .insert(carts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        })
        .await;

    match created {
        Ok(cart) => Ok(cart),
        Err(err) if is_unique_violation(&err) => carts
            .find_by_user_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Cart")),
        Err(err) => Err(err.into()),
    }
}

async fn set_quantity<C: ConnectionTrait>(
    conn: &C,
    item: cart_items::Model,
    quantity: i32,
) -> AppResult<cart_items::Model> {
    let mut active: cart_items::ActiveModel = item.into();
    active.quantity = Set(quantity);
    Ok(CartItemRepository::new(conn).update(active).await?)
}

/// `price * quantity`, rejected when it does not fit the money column.
pub(crate) fn line_total(price: i64, quantity: i32) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .ok_or_else(amount_too_large)
}

pub(crate) fn add_amounts(total: i64, amount: i64) -> AppResult<i64> {
    total.checked_add(amount).ok_or_else(amount_too_large)
}

fn amount_too_large() -> AppError {
    AppError::BadRequest("Cart total exceeds the supported amount".into())
}

pub(crate) async fn ensure_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    if UserRepository::new(conn).find_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_that_overflow_are_rejected() {
        assert_eq!(line_total(1_200, 3).ok(), Some(3_600));
        assert!(matches!(
            line_total(i64::MAX / 2 + 1, 2),
            Err(AppError::BadRequest(_))
        ));
        assert!(add_amounts(i64::MAX, 1).is_err());
    }
}
