use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use edudesk_core::{AppError, ErrorResponse, ListParams};
use edudesk_models::buses::{Bus, CreateBusDto, PaginatedBusesResponse, UpdateBusDto};
use edudesk_models::ids::BusId;
use edudesk_models::students::PaginatedStudentsResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::buses::service::BusService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/buses",
    request_body = CreateBusDto,
    responses(
        (status = 201, description = "Bus created successfully", body = Bus),
        (status = 400, description = "Bus number already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Buses"
)]
#[instrument(skip(state, dto))]
pub async fn create_bus(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateBusDto>,
) -> Result<(StatusCode, Json<Bus>), AppError> {
    let bus = BusService::create_bus(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(bus)))
}

#[utoipa::path(
    get,
    path = "/api/buses",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of buses", body = PaginatedBusesResponse)
    ),
    tag = "Buses"
)]
#[instrument(skip(state))]
pub async fn get_buses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedBusesResponse>, AppError> {
    let buses = BusService::get_buses(&state.db, params).await?;
    Ok(Json(buses))
}

#[utoipa::path(
    get,
    path = "/api/buses/{id}",
    params(
        ("id" = Uuid, Path, description = "Bus ID")
    ),
    responses(
        (status = 200, description = "Bus details", body = Bus),
        (status = 404, description = "Bus not found", body = ErrorResponse)
    ),
    tag = "Buses"
)]
#[instrument(skip(state))]
pub async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<BusId>,
) -> Result<Json<Bus>, AppError> {
    let bus = BusService::get_bus(&state.db, id).await?;
    Ok(Json(bus))
}

#[utoipa::path(
    get,
    path = "/api/buses/{id}/students",
    params(
        ("id" = Uuid, Path, description = "Bus ID"),
        ListParams
    ),
    responses(
        (status = 200, description = "Students riding the bus", body = PaginatedStudentsResponse),
        (status = 404, description = "Bus not found", body = ErrorResponse)
    ),
    tag = "Buses"
)]
#[instrument(skip(state))]
pub async fn get_bus_students(
    State(state): State<AppState>,
    Path(id): Path<BusId>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let students = BusService::get_bus_students(&state.db, id, params).await?;
    Ok(Json(students))
}

#[utoipa::path(
    put,
    path = "/api/buses/{id}",
    params(
        ("id" = Uuid, Path, description = "Bus ID")
    ),
    request_body = UpdateBusDto,
    responses(
        (status = 200, description = "Bus updated successfully", body = Bus),
        (status = 400, description = "Bus number already in use", body = ErrorResponse),
        (status = 404, description = "Bus not found", body = ErrorResponse)
    ),
    tag = "Buses"
)]
#[instrument(skip(state, dto))]
pub async fn update_bus(
    State(state): State<AppState>,
    Path(id): Path<BusId>,
    ValidatedJson(dto): ValidatedJson<UpdateBusDto>,
) -> Result<Json<Bus>, AppError> {
    let bus = BusService::update_bus(&state.db, id, dto).await?;
    Ok(Json(bus))
}

#[utoipa::path(
    delete,
    path = "/api/buses/{id}",
    params(
        ("id" = Uuid, Path, description = "Bus ID")
    ),
    responses(
        (status = 204, description = "Bus deleted successfully"),
        (status = 404, description = "Bus not found", body = ErrorResponse)
    ),
    tag = "Buses"
)]
#[instrument(skip(state))]
pub async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<BusId>,
) -> Result<StatusCode, AppError> {
    BusService::delete_bus(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
