use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use edudesk_core::{AppError, ErrorResponse, ListParams};
use edudesk_models::ids::PeriodId;
use edudesk_models::periods::{CreatePeriodDto, PaginatedPeriodsResponse, Period, UpdatePeriodDto};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::periods::service::PeriodService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/periods",
    request_body = CreatePeriodDto,
    responses(
        (status = 201, description = "Period created successfully", body = Period),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Periods"
)]
#[instrument(skip(state, dto))]
pub async fn create_period(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePeriodDto>,
) -> Result<(StatusCode, Json<Period>), AppError> {
    let period = PeriodService::create_period(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

#[utoipa::path(
    get,
    path = "/api/periods",
    params(ListParams),
    responses(
        (status = 200, description = "Periods in day order", body = PaginatedPeriodsResponse)
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn get_periods(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedPeriodsResponse>, AppError> {
    let periods = PeriodService::get_periods(&state.db, params).await?;
    Ok(Json(periods))
}

#[utoipa::path(
    get,
    path = "/api/periods/{id}",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    responses(
        (status = 200, description = "Period details", body = Period),
        (status = 404, description = "Period not found", body = ErrorResponse)
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn get_period(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
) -> Result<Json<Period>, AppError> {
    let period = PeriodService::get_period(&state.db, id).await?;
    Ok(Json(period))
}

#[utoipa::path(
    put,
    path = "/api/periods/{id}",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    request_body = UpdatePeriodDto,
    responses(
        (status = 200, description = "Period updated successfully", body = Period),
        (status = 404, description = "Period not found", body = ErrorResponse),
        (status = 422, description = "Start time not before end time", body = ErrorResponse)
    ),
    tag = "Periods"
)]
#[instrument(skip(state, dto))]
pub async fn update_period(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
    ValidatedJson(dto): ValidatedJson<UpdatePeriodDto>,
) -> Result<Json<Period>, AppError> {
    let period = PeriodService::update_period(&state.db, id, dto).await?;
    Ok(Json(period))
}

#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    responses(
        (status = 204, description = "Period deleted successfully"),
        (status = 404, description = "Period not found", body = ErrorResponse)
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn delete_period(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
) -> Result<StatusCode, AppError> {
    PeriodService::delete_period(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
