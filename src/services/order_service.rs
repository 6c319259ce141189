use chrono::Utc;
use sea_orm::{ActiveEnum, ColumnTrait, Condition, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutRequest, OrderWithItems},
    entity::{
        order_items,
        orders::{self, Column as OrderCol, OrderStatus},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    repository::{
        CartItemRepository, CartRepository, OrderItemRepository, OrderRepository,
        PaymentRepository, ProductRepository,
    },
    response::Meta,
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::{add_amounts, ensure_user, line_total},
    state::AppState,
};

/// Turn the user's cart into a placed order.
///
/// Stock is taken with a conditional decrement, so a product that sold out in
/// the meantime fails the whole checkout and the transaction rolls back.
pub async fn checkout(
    state: &AppState,
    user_id: Uuid,
    payload: CheckoutRequest,
) -> AppResult<OrderWithItems> {
    let shipping_address = payload.shipping_address.trim().to_string();
    if shipping_address.is_empty() {
        return Err(AppError::BadRequest("shipping_address must not be empty".into()));
    }

    ensure_user(&state.orm, user_id).await?;

    let txn = state.orm.begin().await?;

    let cart = CartRepository::new(&txn)
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;

    let rows = CartItemRepository::new(&txn)
        .find_with_products(cart.id)
        .await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    // A concurrent checkout of the same cart blocks here and then finds nothing
    // to delete. The cart's items cascade.
    if !CartRepository::new(&txn).delete(cart.id).await? {
        return Err(AppError::Conflict("Cart was already checked out".into()));
    }

    let products = ProductRepository::new(&txn);
    let mut total_price: i64 = 0;
    let mut lines = Vec::with_capacity(rows.len());
    for (item, product) in rows {
        let product = product.ok_or(AppError::NotFound("Product"))?;
        if !products.decrement_stock(product.id, item.quantity).await? {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.id
            )));
        }
        total_price = add_amounts(total_price, line_total(product.price, item.quantity)?)?;
        lines.push((product.id, item.quantity, product.price));
    }

    let now = Utc::now();
    let order = OrderRepository::new(&txn)
        .insert(orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            status: Set(OrderStatus::Placed),
            total_price: Set(total_price),
            payment_method: Set(payload.payment_method),
            shipping_address: Set(shipping_address),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .await?;

    let order_items = OrderItemRepository::new(&txn);
    let mut items = Vec::with_capacity(lines.len());
    for (product_id, quantity, price) in lines {
        let item = order_items
            .insert(order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                price: Set(price),
            })
            .await?;
        items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    tracing::info!(
        user_id = %user_id,
        order_id = %order.id,
        total_price = order.total_price,
        "checkout completed"
    );

    Ok(OrderWithItems {
        order: order.into(),
        items,
    })
}

pub async fn list_orders(
    state: &AppState,
    user_id: Uuid,
    query: OrderListQuery,
) -> AppResult<(Vec<Order>, Meta)> {
    ensure_user(&state.orm, user_id).await?;

    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let (orders, total) = OrderRepository::new(&state.orm)
        .find_page(
            condition,
            OrderCol::CreatedAt,
            sort_order.into(),
            limit as u64,
            offset as u64,
        )
        .await?;

    let orders = orders.into_iter().map(Order::from).collect();
    Ok((orders, Meta::new(page, limit, total as i64)))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<OrderWithItems> {
    let order = OrderRepository::new(&state.orm)
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    let items = OrderItemRepository::new(&state.orm)
        .find_by_order_id(order.id)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(OrderWithItems {
        order: order.into(),
        items,
    })
}

/// Move an order along PLACED -> SHIPPED -> DELIVERED, or cancel it while it is
/// still PLACED. Cancelling puts the items back in stock.
pub async fn update_order_status(
    state: &AppState,
    id: Uuid,
    next: OrderStatus,
) -> AppResult<Order> {
    let txn = state.orm.begin().await?;
    let orders = OrderRepository::new(&txn);

    let order = orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    if !order.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Invalid order status transition from {} to {}",
            order.status.to_value(),
            next.to_value()
        )));
    }

    // Only one of several concurrent requests sees the status it read.
    let moved = orders
        .compare_and_set_status(order.id, order.status, next, Utc::now().into())
        .await?;
    if !moved {
        return Err(AppError::Conflict("Order status was changed concurrently".into()));
    }

    if next == OrderStatus::Cancelled {
        let products = ProductRepository::new(&txn);
        for item in OrderItemRepository::new(&txn)
            .find_by_order_id(order.id)
            .await?
        {
            products.increment_stock(item.product_id, item.quantity).await?;
        }
    }

    let order = orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, status = %order.status.to_value(), "order status updated");
    Ok(order.into())
}

/// Delete an order and, through the cascade, its items.
pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<()> {
    if PaymentRepository::new(&state.orm)
        .find_by_order_id(id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Order has a recorded payment".into()));
    }

    let deleted = OrderRepository::new(&state.orm).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Order"));
    }

    tracing::info!(order_id = %id, "order deleted");
    Ok(())
}
