mod common;

use axum::http::StatusCode;
use serde_json::json;
use storefront::{
    dto::{
        cart::AddToCartRequest,
        orders::CheckoutRequest,
        payments::PaymentWebhook,
    },
    error::AppError,
    models::{OrderStatus, PaymentMethod, PaymentStatus},
    repository::{
        CartItemRepository, CartRepository, OrderItemRepository, OrderRepository,
        PaymentRepository,
    },
    routes::params::OrderListQuery,
    services::{cart_service, order_service, payment_service, product_service},
    state::AppState,
};
use uuid::Uuid;

async fn add(state: &AppState, user_id: Uuid, product_id: Uuid, quantity: i32) -> anyhow::Result<()> {
    cart_service::add_to_cart(state, user_id, AddToCartRequest { product_id, quantity }).await?;
    Ok(())
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: "1 Crab Street".into(),
        payment_method: PaymentMethod::Online,
    }
}

#[tokio::test]
async fn cart_upserts_quantities_and_computes_subtotal() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "shopper@example.com").await?;
    let category = common::create_category(&state, "Merch").await?;
    let mug = common::create_product(&state, category.id, "Mug", 1_200, 10).await?;
    let hoodie = common::create_product(&state, category.id, "Hoodie", 5_500, 10).await?;

    let empty = cart_service::get_cart(&state, user.id).await?;
    assert!(empty.cart_id.is_none());
    assert_eq!(empty.subtotal, 0);

    add(&state, user.id, mug.id, 1).await?;
    add(&state, user.id, mug.id, 3).await?;
    add(&state, user.id, hoodie.id, 2).await?;

    let cart = cart_service::get_cart(&state, user.id).await?;
    assert_eq!(cart.items.len(), 2);
    let mug_line = cart
        .items
        .iter()
        .find(|line| line.product.id == mug.id)
        .expect("mug line");
    assert_eq!(mug_line.quantity, 3);
    assert_eq!(mug_line.line_total, 3_600);
    assert_eq!(cart.subtotal, 3 * 1_200 + 2 * 5_500);

    let err = cart_service::add_to_cart(
        &state,
        user.id,
        AddToCartRequest {
            product_id: mug.id,
            quantity: 0,
        },
    )
    .await
    .expect_err("zero quantity");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::add_to_cart(
        &state,
        user.id,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await
    .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound("Product")));

    cart_service::remove_from_cart(&state, user.id, hoodie.id).await?;
    let err = cart_service::remove_from_cart(&state, user.id, hoodie.id)
        .await
        .expect_err("already removed");
    assert!(matches!(err, AppError::NotFound("Cart item")));
    Ok(())
}

#[tokio::test]
async fn clearing_cart_removes_its_items() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "clear@example.com").await?;
    let category = common::create_category(&state, "Snacks").await?;
    let chips = common::create_product(&state, category.id, "Chips", 300, 10).await?;
    let nuts = common::create_product(&state, category.id, "Nuts", 500, 10).await?;
    add(&state, user.id, chips.id, 2).await?;
    add(&state, user.id, nuts.id, 1).await?;

    let cart = CartRepository::new(&state.orm)
        .find_by_user_id(user.id)
        .await?
        .expect("cart");
    assert_eq!(CartItemRepository::new(&state.orm).find_by_cart_id(cart.id).await?.len(), 2);

    cart_service::clear_cart(&state, user.id).await?;

    assert!(CartRepository::new(&state.orm).find_by_id(cart.id).await?.is_none());
    assert!(CartItemRepository::new(&state.orm).find_by_cart_id(cart.id).await?.is_empty());

    let err = cart_service::clear_cart(&state, user.id)
        .await
        .expect_err("no cart left");
    assert!(matches!(err, AppError::NotFound("Cart")));

    let err = cart_service::remove_from_cart(&state, user.id, chips.id)
        .await
        .expect_err("no cart left");
    assert!(matches!(err, AppError::NotFound("Cart")));
    Ok(())
}

#[tokio::test]
async fn totals_that_overflow_are_rejected() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "whale@example.com").await?;
    let category = common::create_category(&state, "Jewellery").await?;
    let crown = common::create_product(&state, category.id, "Crown", i64::MAX / 2 + 1, 5).await?;
    add(&state, user.id, crown.id, 2).await?;

    let err = cart_service::get_cart(&state, user.id)
        .await
        .expect_err("subtotal does not fit");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::checkout(&state, user.id, checkout_request())
        .await
        .expect_err("total does not fit");
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(product_service::get_product_by_id(&state, crown.id).await?.stock, 5);
    assert!(OrderRepository::new(&state.orm).find_by_user_id(user.id).await?.is_empty());
    let cart = CartRepository::new(&state.orm)
        .find_by_user_id(user.id)
        .await?
        .expect("cart survives the rollback");
    assert_eq!(CartItemRepository::new(&state.orm).find_by_cart_id(cart.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn checkout_snapshots_prices_and_takes_stock() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "buyer@example.com").await?;
    let category = common::create_category(&state, "Books").await?;
    let book = common::create_product(&state, category.id, "Async Book", 2_500, 5).await?;
    let pen = common::create_product(&state, category.id, "Pen", 150, 100).await?;
    add(&state, user.id, book.id, 2).await?;
    add(&state, user.id, pen.id, 4).await?;

    let placed = order_service::checkout(&state, user.id, checkout_request()).await?;
    assert_eq!(placed.order.status, OrderStatus::Placed);
    assert_eq!(placed.order.total_price, 2 * 2_500 + 4 * 150);
    assert_eq!(placed.items.len(), 2);

    // Later price changes leave the order untouched.
    product_service::save_product(
        &state,
        Some(book.id),
        common::product_payload(category.id, "Async Book", 9_999, 3),
    )
    .await?;
    let stored = order_service::get_order(&state, placed.order.id).await?;
    let book_line = stored
        .items
        .iter()
        .find(|item| item.product_id == book.id)
        .expect("book line");
    assert_eq!(book_line.price, 2_500);
    assert_eq!(stored.order.total_price, 5_600);

    let pen_after = product_service::get_product_by_id(&state, pen.id).await?;
    assert_eq!(pen_after.stock, 96);

    let cart = cart_service::get_cart(&state, user.id).await?;
    assert!(cart.items.is_empty());

    let err = order_service::checkout(&state, user.id, checkout_request())
        .await
        .expect_err("empty cart");
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Cart is empty"));

    let (orders, meta) = order_service::list_orders(&state, user.id, OrderListQuery::default()).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(meta.total, Some(1));
    assert_eq!(OrderRepository::new(&state.orm).find_by_user_id(user.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn insufficient_stock_rolls_back_checkout() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "greedy@example.com").await?;
    let category = common::create_category(&state, "Limited").await?;
    let plenty = common::create_product(&state, category.id, "Plenty", 100, 50).await?;
    let scarce = common::create_product(&state, category.id, "Scarce", 100, 1).await?;
    add(&state, user.id, plenty.id, 5).await?;
    add(&state, user.id, scarce.id, 2).await?;

    let err = order_service::checkout(&state, user.id, checkout_request())
        .await
        .expect_err("not enough stock");
    match err {
        AppError::BadRequest(msg) => assert!(msg.starts_with("Insufficient stock for product")),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(product_service::get_product_by_id(&state, plenty.id).await?.stock, 50);
    assert_eq!(product_service::get_product_by_id(&state, scarce.id).await?.stock, 1);
    assert_eq!(cart_service::get_cart(&state, user.id).await?.items.len(), 2);
    assert!(OrderRepository::new(&state.orm).find_by_user_id(user.id).await?.is_empty());

    let err = order_service::checkout(
        &state,
        user.id,
        CheckoutRequest {
            shipping_address: "   ".into(),
            payment_method: PaymentMethod::Cod,
        },
    )
    .await
    .expect_err("blank address");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn order_status_follows_transition_table() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "status@example.com").await?;
    let category = common::create_category(&state, "Garden").await?;
    let shovel = common::create_product(&state, category.id, "Shovel", 700, 4).await?;

    add(&state, user.id, shovel.id, 1).await?;
    let first = order_service::checkout(&state, user.id, checkout_request()).await?;

    let err = order_service::update_order_status(&state, first.order.id, OrderStatus::Delivered)
        .await
        .expect_err("cannot skip shipping");
    assert!(
        matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid order status transition from PLACED to DELIVERED")
    );

    let shipped = order_service::update_order_status(&state, first.order.id, OrderStatus::Shipped).await?;
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert!(
        order_service::update_order_status(&state, first.order.id, OrderStatus::Cancelled)
            .await
            .is_err()
    );
    let delivered =
        order_service::update_order_status(&state, first.order.id, OrderStatus::Delivered).await?;
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // Cancelling a placed order puts the stock back.
    add(&state, user.id, shovel.id, 2).await?;
    let second = order_service::checkout(&state, user.id, checkout_request()).await?;
    assert_eq!(product_service::get_product_by_id(&state, shovel.id).await?.stock, 1);

    order_service::update_order_status(&state, second.order.id, OrderStatus::Cancelled).await?;
    assert_eq!(product_service::get_product_by_id(&state, shovel.id).await?.stock, 3);

    let err = order_service::update_order_status(&state, Uuid::new_v4(), OrderStatus::Shipped)
        .await
        .expect_err("unknown order");
    assert!(matches!(err, AppError::NotFound("Order")));
    Ok(())
}

#[tokio::test]
async fn stale_status_writes_change_nothing() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "stale@example.com").await?;
    let category = common::create_category(&state, "Kitchen").await?;
    let pan = common::create_product(&state, category.id, "Pan", 1_500, 6).await?;
    add(&state, user.id, pan.id, 2).await?;

    let cart = CartRepository::new(&state.orm)
        .find_by_user_id(user.id)
        .await?
        .expect("cart");
    let placed = order_service::checkout(&state, user.id, checkout_request()).await?;
    // A second checkout holding the same cart id finds it gone.
    assert!(!CartRepository::new(&state.orm).delete(cart.id).await?);

    order_service::update_order_status(&state, placed.order.id, OrderStatus::Shipped).await?;

    // A cancel that still believes the order is PLACED loses.
    let orders = OrderRepository::new(&state.orm);
    let moved = orders
        .compare_and_set_status(
            placed.order.id,
            OrderStatus::Placed,
            OrderStatus::Cancelled,
            chrono::Utc::now().into(),
        )
        .await?;
    assert!(!moved);
    let stored = orders.find_by_id(placed.order.id).await?.expect("order");
    assert_eq!(stored.status, OrderStatus::Shipped);
    assert_eq!(product_service::get_product_by_id(&state, pan.id).await?.stock, 4);

    let pending = payment_service::record_payment(
        &state,
        PaymentWebhook {
            order_id: placed.order.id,
            provider: "paypal".into(),
            status: PaymentStatus::Pending,
            transaction_reference: None,
        },
    )
    .await?;

    // A FAILED callback racing a SUCCESS that already landed.
    let payments = PaymentRepository::new(&state.orm);
    assert!(
        payments
            .compare_and_set_status(
                pending.id,
                PaymentStatus::Pending,
                PaymentStatus::Success,
                "paypal".into(),
                Some("pp_1".into()),
                chrono::Utc::now().into(),
            )
            .await?
    );
    assert!(
        !payments
            .compare_and_set_status(
                pending.id,
                PaymentStatus::Pending,
                PaymentStatus::Failed,
                "paypal".into(),
                Some("pp_2".into()),
                chrono::Utc::now().into(),
            )
            .await?
    );
    let stored = payment_service::get_payment_for_order(&state, placed.order.id).await?;
    assert_eq!(stored.status, PaymentStatus::Success);
    assert_eq!(stored.transaction_reference.as_deref(), Some("pp_1"));
    Ok(())
}

#[tokio::test]
async fn deleting_order_removes_its_items() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "delete@example.com").await?;
    let category = common::create_category(&state, "Tools").await?;
    for (name, qty) in [("Hammer", 1), ("Nails", 3), ("Saw", 2)] {
        let product = common::create_product(&state, category.id, name, 100, 10).await?;
        add(&state, user.id, product.id, qty).await?;
    }

    let placed = order_service::checkout(&state, user.id, checkout_request()).await?;
    let items = OrderItemRepository::new(&state.orm);
    assert_eq!(items.find_by_order_id(placed.order.id).await?.len(), 3);

    order_service::delete_order(&state, placed.order.id).await?;

    assert!(items.find_by_order_id(placed.order.id).await?.is_empty());
    let err = order_service::get_order(&state, placed.order.id)
        .await
        .expect_err("deleted");
    assert!(matches!(err, AppError::NotFound("Order")));
    Ok(())
}

#[tokio::test]
async fn payment_webhook_settles_pending_payment_once() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "payer@example.com").await?;
    let category = common::create_category(&state, "Music").await?;
    let vinyl = common::create_product(&state, category.id, "Vinyl", 3_000, 2).await?;
    add(&state, user.id, vinyl.id, 1).await?;
    let placed = order_service::checkout(&state, user.id, checkout_request()).await?;

    let webhook = |status| PaymentWebhook {
        order_id: placed.order.id,
        provider: "stripe".into(),
        status,
        transaction_reference: Some("txn_123".into()),
    };

    let pending = payment_service::record_payment(&state, webhook(PaymentStatus::Pending)).await?;
    let success = payment_service::record_payment(&state, webhook(PaymentStatus::Success)).await?;
    assert_eq!(pending.id, success.id);
    assert_eq!(success.status, PaymentStatus::Success);

    // Redelivery of the same outcome is accepted.
    payment_service::record_payment(&state, webhook(PaymentStatus::Success)).await?;

    let err = payment_service::record_payment(&state, webhook(PaymentStatus::Failed))
        .await
        .expect_err("settled payments stay settled");
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = payment_service::get_payment_for_order(&state, placed.order.id).await?;
    assert_eq!(stored.status, PaymentStatus::Success);
    assert_eq!(stored.transaction_reference.as_deref(), Some("txn_123"));

    let err = order_service::delete_order(&state, placed.order.id)
        .await
        .expect_err("payment references the order");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = payment_service::record_payment(
        &state,
        PaymentWebhook {
            order_id: Uuid::new_v4(),
            provider: "stripe".into(),
            status: PaymentStatus::Success,
            transaction_reference: None,
        },
    )
    .await
    .expect_err("unknown order");
    assert!(matches!(err, AppError::NotFound("Order")));
    Ok(())
}

#[tokio::test]
async fn shopping_flow_over_http() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "http-shopper@example.com").await?;
    let category = common::create_category(&state, "Games").await?;
    let game = common::create_product(&state, category.id, "Board Game", 4_000, 3).await?;

    let (response, _) = common::send(
        common::app(state.clone()),
        common::json_request(
            "POST",
            &format!("/api/users/{}/cart/items", user.id),
            json!({ "product_id": game.id, "quantity": 2 }),
        ),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = common::send(
        common::app(state.clone()),
        common::get(&format!("/api/users/{}/cart", user.id)),
    )
    .await?;
    assert_eq!(body["data"]["subtotal"], 8_000);

    let (response, body) = common::send(
        common::app(state.clone()),
        common::json_request(
            "POST",
            &format!("/api/users/{}/orders", user.id),
            json!({ "shipping_address": "2 Crab Street", "payment_method": "COD" }),
        ),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body["data"]["order"]["status"], "PLACED");
    let order_id = body["data"]["order"]["id"].as_str().expect("order id").to_string();

    let (response, body) = common::send(
        common::app(state.clone()),
        common::json_request(
            "PATCH",
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": "DELIVERED" }),
        ),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Invalid order status transition"))
    );

    let (response, body) = common::send(
        common::app(state.clone()),
        common::json_request(
            "POST",
            "/api/payments/webhook",
            json!({ "order_id": order_id, "provider": "cod", "status": "SUCCESS" }),
        ),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"]["status"], "SUCCESS");

    let (response, body) = common::send(
        common::app(state),
        common::get(&format!("/api/orders/{order_id}/payment")),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["data"]["provider"], "cod");
    Ok(())
}
