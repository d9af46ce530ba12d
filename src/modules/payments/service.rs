use anyhow::anyhow;
use edudesk_core::{AppError, PaginationMeta};
use edudesk_models::fees::FeeSummary;
use edudesk_models::ids::{FeeId, PaymentId};
use edudesk_models::payments::{
    CreatePaymentDto, PaginatedPaymentsResponse, Payment, PaymentFilterParams, RecordedPayment,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::fees::service::{FeeService, fee_error};
use crate::utils::{SqlFilters, map_db_error};

const PAYMENT_SELECT: &str = r#"SELECT
        p.id, p.fee_id, p.amount, p.method, p.reference, p.note, p.paid_at,
        f.student_id, f.title AS fee_title, p.created_at
    FROM payments p
    JOIN fees f ON f.id = p.fee_id"#;

pub struct PaymentService;

impl PaymentService {
    /// Records a payment and raises the fee's paid amount in one transaction.
    ///
    /// The fee row stays locked while the balance is checked, so concurrent
    /// payments cannot overpay it.
    #[instrument(skip(db, dto), fields(fee_id = %dto.fee_id, method = %dto.method))]
    pub async fn record_payment(
        db: &PgPool,
        dto: CreatePaymentDto,
    ) -> Result<RecordedPayment, AppError> {
        let mut tx = db.begin().await?;

        let fee = FeeService::lock_fee(&mut tx, dto.fee_id).await?;
        let current = fee.breakdown().map_err(fee_error)?;
        let next = current.with_payment(dto.amount).map_err(fee_error)?;
        let amount = next.paid - current.paid;

        let id = sqlx::query_scalar::<_, PaymentId>(
            r#"INSERT INTO payments (fee_id, amount, method, reference, note, paid_at)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
               RETURNING id"#,
        )
        .bind(dto.fee_id)
        .bind(amount)
        .bind(dto.method)
        .bind(&dto.reference)
        .bind(&dto.note)
        .bind(dto.paid_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        FeeService::set_paid_amount(&mut tx, dto.fee_id, &next).await?;
        tx.commit().await?;

        crate::metrics::track_payment_recorded(
            dto.method.as_str(),
            amount.to_f64().unwrap_or_default(),
        );
        tracing::info!(payment_id = %id, remaining = %next.remaining, "Payment recorded");

        Ok(RecordedPayment {
            payment: Self::get_payment(db, id).await?,
            fee: FeeService::get_fee_summary(db, dto.fee_id).await?,
        })
    }

    #[instrument(skip(db))]
    pub async fn get_payments(
        db: &PgPool,
        filters: PaymentFilterParams,
    ) -> Result<PaginatedPaymentsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut conditions = SqlFilters::new();
        conditions
            .eq_uuid("p.fee_id", filters.fee_id)
            .eq_uuid("f.student_id", filters.student_id)
            .eq_enum(
                "p.method",
                "payment_method",
                filters.method.map(|m| m.as_str()),
            );
        let where_clause = conditions.where_sql();

        let count_query = format!(
            "SELECT COUNT(*) FROM payments p JOIN fees f ON f.id = p.fee_id{}",
            where_clause
        );
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} ORDER BY p.paid_at DESC, p.created_at DESC LIMIT {} OFFSET {}",
            PAYMENT_SELECT, where_clause, limit, offset
        );
        let payments = conditions
            .bind_as(sqlx::query_as::<_, Payment>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedPaymentsResponse {
            data: payments,
            meta: PaginationMeta::for_params(&filters.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_payment(db: &PgPool, id: PaymentId) -> Result<Payment, AppError> {
        let query = format!("{} WHERE p.id = $1", PAYMENT_SELECT);
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Payment not found")))
    }

    /// Deletes a payment and takes its amount back off the fee.
    #[instrument(skip(db))]
    pub async fn delete_payment(db: &PgPool, id: PaymentId) -> Result<FeeSummary, AppError> {
        let mut tx = db.begin().await?;

        let fee_id = sqlx::query_scalar::<_, FeeId>("SELECT fee_id FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Payment not found")))?;

        let fee = FeeService::lock_fee(&mut tx, fee_id).await?;

        let amount = sqlx::query_scalar::<_, Decimal>(
            "DELETE FROM payments WHERE id = $1 RETURNING amount",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Payment not found")))?;

        let next = fee
            .breakdown()
            .and_then(|b| b.without_payment(amount))
            .map_err(fee_error)?;
        FeeService::set_paid_amount(&mut tx, fee_id, &next).await?;
        tx.commit().await?;

        crate::metrics::track_payment_reversed();
        FeeService::get_fee_summary(db, fee_id).await
    }
}
