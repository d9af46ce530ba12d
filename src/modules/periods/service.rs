use anyhow::anyhow;
use edudesk_core::{AppError, ListParams, PaginationMeta};
use edudesk_models::ids::PeriodId;
use edudesk_models::periods::{
    CreatePeriodDto, PaginatedPeriodsResponse, Period, UpdatePeriodDto, check_period_times,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::utils::{SqlFilters, map_db_error};

const PERIOD_COLUMNS: &str = "id, name, start_time, end_time, sort_order, created_at, updated_at";

pub struct PeriodService;

impl PeriodService {
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_period(db: &PgPool, dto: CreatePeriodDto) -> Result<Period, AppError> {
        let query = format!(
            r#"INSERT INTO periods (name, start_time, end_time, sort_order)
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            PERIOD_COLUMNS
        );
        let period = sqlx::query_as::<_, Period>(&query)
            .bind(dto.name.trim())
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(dto.sort_order)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        Ok(period)
    }

    #[instrument(skip(db))]
    pub async fn get_periods(
        db: &PgPool,
        params: ListParams,
    ) -> Result<PaginatedPeriodsResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut filters = SqlFilters::new();
        filters.search(&["name"], params.search_pattern());
        let where_clause = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM periods{}", where_clause);
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "SELECT {} FROM periods{} ORDER BY sort_order, start_time LIMIT {} OFFSET {}",
            PERIOD_COLUMNS, where_clause, limit, offset
        );
        let periods = filters
            .bind_as(sqlx::query_as::<_, Period>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedPeriodsResponse {
            data: periods,
            meta: PaginationMeta::for_params(&params.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_period(db: &PgPool, id: PeriodId) -> Result<Period, AppError> {
        let query = format!("SELECT {} FROM periods WHERE id = $1", PERIOD_COLUMNS);
        sqlx::query_as::<_, Period>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Period not found")))
    }

    /// Applies the patch over the stored row; the merged times must still be ordered.
    #[instrument(skip(db, dto))]
    pub async fn update_period(
        db: &PgPool,
        id: PeriodId,
        dto: UpdatePeriodDto,
    ) -> Result<Period, AppError> {
        let existing = Self::get_period(db, id).await?;

        let start_time = dto.start_time.unwrap_or(existing.start_time);
        let end_time = dto.end_time.unwrap_or(existing.end_time);
        check_period_times(start_time, end_time)
            .map_err(|_| AppError::unprocessable(anyhow!("start_time must be before end_time")))?;

        let query = format!(
            r#"UPDATE periods
               SET name = $1, start_time = $2, end_time = $3, sort_order = $4, updated_at = NOW()
               WHERE id = $5
               RETURNING {}"#,
            PERIOD_COLUMNS
        );
        let period = sqlx::query_as::<_, Period>(&query)
            .bind(dto.name.map(|s| s.trim().to_string()).unwrap_or(existing.name))
            .bind(start_time)
            .bind(end_time)
            .bind(dto.sort_order.unwrap_or(existing.sort_order))
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        Ok(period)
    }

    /// Removes the period together with the schedule entries placed in it.
    #[instrument(skip(db))]
    pub async fn delete_period(db: &PgPool, id: PeriodId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM periods WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Period not found")));
        }
        Ok(())
    }
}
