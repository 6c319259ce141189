use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A user's cart with product details. `cart_id` is absent until the first item is added.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub cart_id: Option<Uuid>,
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    pub subtotal: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    pub line_total: i64,
}
