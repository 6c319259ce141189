use chrono::Utc;
use sea_orm::{ActiveEnum, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    dto::payments::PaymentWebhook,
    entity::payments,
    error::{AppError, AppResult, is_unique_violation},
    models::Payment,
    repository::{OrderRepository, PaymentRepository},
    state::AppState,
};

/// Record a provider callback against its order.
///
/// The first callback creates the order's payment. Later ones may only settle a
/// pending payment; repeating the current status is treated as a redelivery.
pub async fn record_payment(state: &AppState, webhook: PaymentWebhook) -> AppResult<Payment> {
    let provider = webhook.provider.trim().to_string();
    if provider.is_empty() {
        return Err(AppError::BadRequest("provider must not be empty".into()));
    }

    let txn = state.orm.begin().await?;

    if OrderRepository::new(&txn)
        .find_by_id(webhook.order_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Order"));
    }

    let payments = PaymentRepository::new(&txn);
    let now = Utc::now();

    let payment = match payments.find_by_order_id(webhook.order_id).await? {
        Some(existing) => {
            if !existing.status.can_transition_to(webhook.status) {
                return Err(AppError::BadRequest(format!(
                    "Invalid payment status transition from {} to {}",
                    existing.status.to_value(),
                    webhook.status.to_value()
                )));
            }
            let settled = payments
                .compare_and_set_status(
                    existing.id,
                    existing.status,
                    webhook.status,
                    provider,
                    webhook.transaction_reference,
                    now.into(),
                )
                .await?;
            if !settled {
                return Err(AppError::Conflict(
                    "Payment status was changed concurrently".into(),
                ));
            }
            payments
                .find_by_id(existing.id)
                .await?
                .ok_or(AppError::NotFound("Payment"))?
        }
        None => payments
            .insert(payments::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(webhook.order_id),
                provider: Set(provider),
                status: Set(webhook.status),
                transaction_reference: Set(webhook.transaction_reference),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            })
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::Conflict("Payment already recorded for this order".into())
                } else {
                    AppError::from(err)
                }
            })?,
    };

    txn.commit().await?;

    tracing::info!(
        order_id = %payment.order_id,
        payment_id = %payment.id,
        status = %payment.status.to_value(),
        "payment recorded"
    );
    Ok(payment.into())
}

pub async fn get_payment_for_order(state: &AppState, order_id: Uuid) -> AppResult<Payment> {
    if OrderRepository::new(&state.orm)
        .find_by_id(order_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Order"));
    }

    PaymentRepository::new(&state.orm)
        .find_by_order_id(order_id)
        .await?
        .map(Payment::from)
        .ok_or(AppError::NotFound("Payment"))
}
