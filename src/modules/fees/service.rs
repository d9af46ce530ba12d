use anyhow::anyhow;
use edudesk_core::{AppError, PaginationMeta};
use edudesk_models::fees::{
    CreateFeeDto, FeeBreakdown, FeeDetails, FeeError, FeeFilterParams, FeeItem, FeeItemInput,
    FeePreviewDto, FeeRecord, FeeSummary, PaginatedFeesResponse, UpdateFeeDto,
};
use edudesk_models::ids::FeeId;
use edudesk_models::payments::Payment;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::utils::{SqlFilters, map_db_error};

pub(crate) const FEE_SELECT: &str = r#"SELECT
        f.id, f.student_id, f.title, f.academic_term, f.subtotal, f.discount, f.total,
        f.paid_amount, f.due_date,
        (s.first_name || ' ' || s.last_name) AS student_name,
        f.created_at, f.updated_at
    FROM fees f
    JOIN students s ON s.id = f.student_id"#;

/// Maps fee arithmetic failures to `422`.
pub(crate) fn fee_error(err: FeeError) -> AppError {
    AppError::unprocessable(err)
}

pub struct FeeService;

impl FeeService {
    async fn insert_items(
        conn: &mut PgConnection,
        fee_id: FeeId,
        items: &[FeeItemInput],
    ) -> Result<(), AppError> {
        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO fee_items (fee_id, name, amount, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(fee_id)
            .bind(item.name.trim())
            .bind(item.amount.round_dp(2))
            .bind(position as i32)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
        Ok(())
    }

    /// Loads a fee and locks its row until the transaction ends.
    pub(crate) async fn lock_fee(
        conn: &mut PgConnection,
        id: FeeId,
    ) -> Result<FeeRecord, AppError> {
        let query = format!("{} WHERE f.id = $1 FOR UPDATE OF f", FEE_SELECT);
        sqlx::query_as::<_, FeeRecord>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Fee not found")))
    }

    /// Stores the new paid amount of a locked fee.
    pub(crate) async fn set_paid_amount(
        conn: &mut PgConnection,
        id: FeeId,
        breakdown: &FeeBreakdown,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE fees SET paid_amount = $1, updated_at = NOW() WHERE id = $2")
            .bind(breakdown.paid)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(db, dto), fields(student_id = %dto.student_id, items = dto.items.len()))]
    pub async fn create_fee(db: &PgPool, dto: CreateFeeDto) -> Result<FeeDetails, AppError> {
        let breakdown = dto.breakdown().map_err(fee_error)?;

        let mut tx = db.begin().await?;
        let id = sqlx::query_scalar::<_, FeeId>(
            r#"INSERT INTO fees (student_id, title, academic_term, subtotal, discount, total, due_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(dto.student_id)
        .bind(dto.title.trim())
        .bind(&dto.academic_term)
        .bind(breakdown.subtotal)
        .bind(breakdown.discount)
        .bind(breakdown.total)
        .bind(dto.due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        Self::insert_items(&mut tx, id, &dto.items).await?;
        tx.commit().await?;

        crate::metrics::track_fee_created(dto.items.len());
        Self::get_fee(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_fees(
        db: &PgPool,
        filters: FeeFilterParams,
    ) -> Result<PaginatedFeesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut conditions = SqlFilters::new();
        conditions.eq_uuid("f.student_id", filters.student_id).search(
            &["f.title", "f.academic_term"],
            filters
                .search
                .as_deref()
                .map(edudesk_core::pagination::like_pattern),
        );
        if let Some(status) = filters.status {
            conditions.raw(status.sql_predicate());
        }
        let where_clause = conditions.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM fees f{}", where_clause);
        let total = conditions
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} ORDER BY f.created_at DESC, f.id LIMIT {} OFFSET {}",
            FEE_SELECT, where_clause, limit, offset
        );
        let fees = conditions
            .bind_as(sqlx::query_as::<_, FeeRecord>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedFeesResponse {
            data: fees.into_iter().map(FeeSummary::from).collect(),
            meta: PaginationMeta::for_params(&filters.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_fee_summary(db: &PgPool, id: FeeId) -> Result<FeeSummary, AppError> {
        let query = format!("{} WHERE f.id = $1", FEE_SELECT);
        let fee = sqlx::query_as::<_, FeeRecord>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Fee not found")))?;
        Ok(FeeSummary::from(fee))
    }

    /// The fee with its line items and payment history, newest payment first.
    #[instrument(skip(db))]
    pub async fn get_fee(db: &PgPool, id: FeeId) -> Result<FeeDetails, AppError> {
        let summary = Self::get_fee_summary(db, id).await?;

        let items = sqlx::query_as::<_, FeeItem>(
            "SELECT id, fee_id, name, amount, position FROM fee_items WHERE fee_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let payments = sqlx::query_as::<_, Payment>(
            r#"SELECT id, fee_id, amount, method, reference, note, paid_at, created_at
               FROM payments
               WHERE fee_id = $1
               ORDER BY paid_at DESC, created_at DESC"#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(FeeDetails {
            summary,
            items,
            payments,
        })
    }

    /// Applies the patch; new items or discount recompute the totals against
    /// the amount already paid.
    #[instrument(skip(db, dto))]
    pub async fn update_fee(
        db: &PgPool,
        id: FeeId,
        dto: UpdateFeeDto,
    ) -> Result<FeeDetails, AppError> {
        let mut tx = db.begin().await?;
        let existing = Self::lock_fee(&mut tx, id).await?;

        let breakdown = if dto.changes_amounts() {
            let discount = dto.discount.unwrap_or(existing.discount);
            match &dto.items {
                Some(items) => FeeBreakdown::compute(
                    items.iter().map(|i| i.amount),
                    discount,
                    existing.paid_amount,
                ),
                None => FeeBreakdown::compute([existing.subtotal], discount, existing.paid_amount),
            }
            .map_err(fee_error)?
        } else {
            existing.breakdown().map_err(fee_error)?
        };

        if let Some(items) = &dto.items {
            sqlx::query("DELETE FROM fee_items WHERE fee_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_items(&mut tx, id, items).await?;
        }

        let academic_term = match dto.academic_term {
            Some(term) => term,
            None => existing.academic_term,
        };
        let due_date = match dto.due_date {
            Some(date) => date,
            None => existing.due_date,
        };

        sqlx::query(
            r#"UPDATE fees
               SET title = $1, academic_term = $2, subtotal = $3, discount = $4, total = $5,
                   due_date = $6, updated_at = NOW()
               WHERE id = $7"#,
        )
        .bind(dto.title.map(|s| s.trim().to_string()).unwrap_or(existing.title))
        .bind(academic_term)
        .bind(breakdown.subtotal)
        .bind(breakdown.discount)
        .bind(breakdown.total)
        .bind(due_date)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await?;
        Self::get_fee(db, id).await
    }

    /// Removes the fee with its items and payments.
    #[instrument(skip(db))]
    pub async fn delete_fee(db: &PgPool, id: FeeId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM fees WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Fee not found")));
        }
        Ok(())
    }

    pub fn preview_fee(dto: &FeePreviewDto) -> Result<FeeBreakdown, AppError> {
        dto.breakdown().map_err(fee_error)
    }
}
