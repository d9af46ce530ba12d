use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use edudesk_core::{AppError, ErrorResponse};
use edudesk_models::ids::ScheduleId;
use edudesk_models::schedules::{
    BulkScheduleUpdateDto, BulkScheduleUpdateResponse, CreateScheduleDto,
    PaginatedSchedulesResponse, ScheduleEntry, ScheduleFilterParams, ScheduleValidationReport,
    Timetable, TimetableParams, UpdateScheduleDto, UpdateScheduleStatusDto, ValidateSchedulesDto,
};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::schedules::service::ScheduleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = CreateScheduleDto,
    responses(
        (status = 201, description = "Schedule entry created", body = ScheduleEntry),
        (status = 400, description = "Section not in class or unknown reference", body = ErrorResponse),
        (status = 409, description = "Slot taken or teacher double-booked", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn create_schedule(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateScheduleDto>,
) -> Result<(StatusCode, Json<ScheduleEntry>), AppError> {
    let entry = ScheduleService::create_schedule(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/schedules",
    params(ScheduleFilterParams),
    responses(
        (status = 200, description = "Paginated list of schedule entries", body = PaginatedSchedulesResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state))]
pub async fn get_schedules(
    State(state): State<AppState>,
    Query(filters): Query<ScheduleFilterParams>,
) -> Result<Json<PaginatedSchedulesResponse>, AppError> {
    let entries = ScheduleService::get_schedules(&state.db, filters).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/schedules/timetable",
    params(TimetableParams),
    responses(
        (status = 200, description = "Entries grouped by weekday", body = Timetable),
        (status = 400, description = "No class, section or teacher given", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state))]
pub async fn get_timetable(
    State(state): State<AppState>,
    Query(params): Query<TimetableParams>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = ScheduleService::get_timetable(&state.db, params).await?;
    Ok(Json(timetable))
}

#[utoipa::path(
    patch,
    path = "/api/schedules/bulk",
    request_body = BulkScheduleUpdateDto,
    responses(
        (status = 200, description = "Changed fields saved", body = BulkScheduleUpdateResponse),
        (status = 404, description = "An entry does not exist", body = ErrorResponse),
        (status = 409, description = "The edits introduce conflicts", body = ErrorResponse),
        (status = 422, description = "Validation error or invalid status change", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn bulk_update_schedules(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<BulkScheduleUpdateDto>,
) -> Result<Json<BulkScheduleUpdateResponse>, AppError> {
    let result = ScheduleService::bulk_update_schedules(&state.db, dto).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/schedules/validate",
    request_body = ValidateSchedulesDto,
    responses(
        (status = 200, description = "Conflicts the entries would cause", body = ScheduleValidationReport),
        (status = 400, description = "Section not in class", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn validate_schedules(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ValidateSchedulesDto>,
) -> Result<Json<ScheduleValidationReport>, AppError> {
    let report = ScheduleService::validate_schedules(&state.db, dto).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    params(
        ("id" = Uuid, Path, description = "Schedule entry ID")
    ),
    responses(
        (status = 200, description = "Schedule entry details", body = ScheduleEntry),
        (status = 404, description = "Schedule entry not found", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<ScheduleId>,
) -> Result<Json<ScheduleEntry>, AppError> {
    let entry = ScheduleService::get_schedule(&state.db, id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    params(
        ("id" = Uuid, Path, description = "Schedule entry ID")
    ),
    request_body = UpdateScheduleDto,
    responses(
        (status = 200, description = "Schedule entry updated", body = ScheduleEntry),
        (status = 404, description = "Schedule entry not found", body = ErrorResponse),
        (status = 409, description = "Slot taken or teacher double-booked", body = ErrorResponse),
        (status = 422, description = "Validation error or invalid status change", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<ScheduleId>,
    ValidatedJson(dto): ValidatedJson<UpdateScheduleDto>,
) -> Result<Json<ScheduleEntry>, AppError> {
    let entry = ScheduleService::update_schedule(&state.db, id, dto).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    patch,
    path = "/api/schedules/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Schedule entry ID")
    ),
    request_body = UpdateScheduleStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ScheduleEntry),
        (status = 404, description = "Schedule entry not found", body = ErrorResponse),
        (status = 409, description = "Activation would cause a conflict", body = ErrorResponse),
        (status = 422, description = "Transition not allowed", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state, dto))]
pub async fn update_schedule_status(
    State(state): State<AppState>,
    Path(id): Path<ScheduleId>,
    ValidatedJson(dto): ValidatedJson<UpdateScheduleStatusDto>,
) -> Result<Json<ScheduleEntry>, AppError> {
    let entry = ScheduleService::update_schedule_status(&state.db, id, dto).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(
        ("id" = Uuid, Path, description = "Schedule entry ID")
    ),
    responses(
        (status = 204, description = "Schedule entry deleted"),
        (status = 404, description = "Schedule entry not found", body = ErrorResponse)
    ),
    tag = "Schedules"
)]
#[instrument(skip(state))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<ScheduleId>,
) -> Result<StatusCode, AppError> {
    ScheduleService::delete_schedule(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
