use anyhow::anyhow;
use edudesk_core::pagination::like_pattern;
use edudesk_core::{AppError, ListParams, PaginationMeta};
use edudesk_models::buses::{Bus, CreateBusDto, PaginatedBusesResponse, UpdateBusDto};
use edudesk_models::ids::BusId;
use edudesk_models::students::{PaginatedStudentsResponse, StudentFilterParams};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::students::service::StudentService;
use crate::utils::{SqlFilters, map_write_error};

const BUS_SELECT: &str = r#"SELECT
        b.id, b.bus_number, b.route_name, b.driver_name, b.driver_phone, b.capacity,
        (SELECT COUNT(*) FROM students s WHERE s.bus_id = b.id) AS student_count,
        b.created_at, b.updated_at
    FROM buses b"#;

const DUPLICATE_BUS: &str = "A bus with this number already exists";

pub struct BusService;

impl BusService {
    #[instrument(skip(db, dto), fields(bus_number = %dto.bus_number))]
    pub async fn create_bus(db: &PgPool, dto: CreateBusDto) -> Result<Bus, AppError> {
        let id = sqlx::query_scalar::<_, BusId>(
            r#"INSERT INTO buses (bus_number, route_name, driver_name, driver_phone, capacity)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(dto.bus_number.trim())
        .bind(dto.route_name.trim())
        .bind(&dto.driver_name)
        .bind(&dto.driver_phone)
        .bind(dto.capacity)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_BUS))?;

        Self::get_bus(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_buses(
        db: &PgPool,
        params: ListParams,
    ) -> Result<PaginatedBusesResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut filters = SqlFilters::new();
        filters.search(
            &["b.bus_number", "b.route_name", "b.driver_name"],
            params.search.as_deref().map(like_pattern),
        );
        let where_clause = filters.where_sql();

        let count_query = format!("SELECT COUNT(*) FROM buses b{}", where_clause);
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
            .fetch_one(db)
            .await?;

        let data_query = format!(
            "{}{} ORDER BY b.bus_number LIMIT {} OFFSET {}",
            BUS_SELECT, where_clause, limit, offset
        );
        let buses = filters
            .bind_as(sqlx::query_as::<_, Bus>(&data_query))
            .fetch_all(db)
            .await?;

        Ok(PaginatedBusesResponse {
            data: buses,
            meta: PaginationMeta::for_params(&params.pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_bus(db: &PgPool, id: BusId) -> Result<Bus, AppError> {
        let query = format!("{} WHERE b.id = $1", BUS_SELECT);
        sqlx::query_as::<_, Bus>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Bus not found")))
    }

    /// Students assigned to the bus; `404` when the bus does not exist.
    #[instrument(skip(db))]
    pub async fn get_bus_students(
        db: &PgPool,
        id: BusId,
        params: ListParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        Self::get_bus(db, id).await?;

        StudentService::get_students(
            db,
            StudentFilterParams {
                search: params.search,
                bus_id: Some(id),
                pagination: params.pagination,
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_bus(db: &PgPool, id: BusId, dto: UpdateBusDto) -> Result<Bus, AppError> {
        let existing = Self::get_bus(db, id).await?;

        sqlx::query(
            r#"UPDATE buses
               SET bus_number = $1, route_name = $2, driver_name = $3, driver_phone = $4,
                   capacity = $5, updated_at = NOW()
               WHERE id = $6"#,
        )
        .bind(dto.bus_number.map(|s| s.trim().to_string()).unwrap_or(existing.bus_number))
        .bind(dto.route_name.map(|s| s.trim().to_string()).unwrap_or(existing.route_name))
        .bind(dto.driver_name.or(existing.driver_name))
        .bind(dto.driver_phone.or(existing.driver_phone))
        .bind(dto.capacity.or(existing.capacity))
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_BUS))?;

        Self::get_bus(db, id).await
    }

    /// Riders stay enrolled without a bus.
    #[instrument(skip(db))]
    pub async fn delete_bus(db: &PgPool, id: BusId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM buses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Bus not found")));
        }
        Ok(())
    }
}
