use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::PaymentStatus;

/// Callback body sent by the payment provider.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhook {
    pub order_id: Uuid,
    pub provider: String,
    pub status: PaymentStatus,
    pub transaction_reference: Option<String>,
}
