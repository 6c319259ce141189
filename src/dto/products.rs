use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub price: i64,
    pub stock: i32,
    pub image_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
