use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use edudesk_core::{AppError, ErrorResponse};
use edudesk_models::fees::{
    CreateFeeDto, FeeBreakdown, FeeDetails, FeeFilterParams, FeePreviewDto,
    PaginatedFeesResponse, UpdateFeeDto,
};
use edudesk_models::ids::FeeId;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::fees::service::FeeService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/fees",
    request_body = CreateFeeDto,
    responses(
        (status = 201, description = "Fee created with its line items", body = FeeDetails),
        (status = 400, description = "Student does not exist", body = ErrorResponse),
        (status = 422, description = "Validation error or invalid amounts", body = ErrorResponse)
    ),
    tag = "Fees"
)]
#[instrument(skip(state, dto))]
pub async fn create_fee(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFeeDto>,
) -> Result<(StatusCode, Json<FeeDetails>), AppError> {
    let fee = FeeService::create_fee(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(fee)))
}

#[utoipa::path(
    get,
    path = "/api/fees",
    params(FeeFilterParams),
    responses(
        (status = 200, description = "Paginated list of fees with balances", body = PaginatedFeesResponse)
    ),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn get_fees(
    State(state): State<AppState>,
    Query(filters): Query<FeeFilterParams>,
) -> Result<Json<PaginatedFeesResponse>, AppError> {
    let fees = FeeService::get_fees(&state.db, filters).await?;
    Ok(Json(fees))
}

#[utoipa::path(
    post,
    path = "/api/fees/preview",
    request_body = FeePreviewDto,
    responses(
        (status = 200, description = "Computed totals, nothing is saved", body = FeeBreakdown),
        (status = 422, description = "Invalid amounts", body = ErrorResponse)
    ),
    tag = "Fees"
)]
#[instrument(skip(dto))]
pub async fn preview_fee(
    ValidatedJson(dto): ValidatedJson<FeePreviewDto>,
) -> Result<Json<FeeBreakdown>, AppError> {
    let breakdown = FeeService::preview_fee(&dto)?;
    Ok(Json(breakdown))
}

#[utoipa::path(
    get,
    path = "/api/fees/{id}",
    params(
        ("id" = Uuid, Path, description = "Fee ID")
    ),
    responses(
        (status = 200, description = "Fee with items and payments", body = FeeDetails),
        (status = 404, description = "Fee not found", body = ErrorResponse)
    ),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn get_fee(
    State(state): State<AppState>,
    Path(id): Path<FeeId>,
) -> Result<Json<FeeDetails>, AppError> {
    let fee = FeeService::get_fee(&state.db, id).await?;
    Ok(Json(fee))
}

#[utoipa::path(
    put,
    path = "/api/fees/{id}",
    params(
        ("id" = Uuid, Path, description = "Fee ID")
    ),
    request_body = UpdateFeeDto,
    responses(
        (status = 200, description = "Fee updated", body = FeeDetails),
        (status = 404, description = "Fee not found", body = ErrorResponse),
        (status = 422, description = "Invalid amounts or total below amount paid", body = ErrorResponse)
    ),
    tag = "Fees"
)]
#[instrument(skip(state, dto))]
pub async fn update_fee(
    State(state): State<AppState>,
    Path(id): Path<FeeId>,
    ValidatedJson(dto): ValidatedJson<UpdateFeeDto>,
) -> Result<Json<FeeDetails>, AppError> {
    let fee = FeeService::update_fee(&state.db, id, dto).await?;
    Ok(Json(fee))
}

#[utoipa::path(
    delete,
    path = "/api/fees/{id}",
    params(
        ("id" = Uuid, Path, description = "Fee ID")
    ),
    responses(
        (status = 204, description = "Fee deleted"),
        (status = 404, description = "Fee not found", body = ErrorResponse)
    ),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn delete_fee(
    State(state): State<AppState>,
    Path(id): Path<FeeId>,
) -> Result<StatusCode, AppError> {
    FeeService::delete_fee(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
