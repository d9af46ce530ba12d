use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use edudesk_core::{AppError, ErrorResponse, ListParams};
use edudesk_models::classes::{
    Class, ClassWithStats, CreateClassDto, CreateSectionDto, CreateSectionWithClassDto,
    PaginatedClassesResponse, PaginatedSectionsResponse, Section, SectionFilterParams,
    UpdateClassDto, UpdateSectionDto,
};
use edudesk_models::ids::{ClassId, SectionId};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created successfully", body = Class),
        (status = 400, description = "Class name already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of classes with section and student counts", body = PaginatedClassesResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    let classes = ClassService::get_classes(&state.db, params).await?;
    Ok(Json(classes))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class details", body = ClassWithStats),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<ClassWithStats>, AppError> {
    let class = ClassService::get_class(&state.db, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated successfully", body = Class),
        (status = 400, description = "Class name already in use", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 204, description = "Class and its sections deleted"),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<StatusCode, AppError> {
    ClassService::delete_class(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}/sections",
    params(
        ("id" = Uuid, Path, description = "Class ID"),
        ListParams
    ),
    responses(
        (status = 200, description = "Sections of the class", body = PaginatedSectionsResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state))]
pub async fn get_class_sections(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedSectionsResponse>, AppError> {
    let sections = ClassService::get_class_sections(&state.db, id, params).await?;
    Ok(Json(sections))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/sections",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    request_body = CreateSectionDto,
    responses(
        (status = 201, description = "Section created successfully", body = Section),
        (status = 400, description = "Section name already used in this class", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state, dto))]
pub async fn create_class_section(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<CreateSectionDto>,
) -> Result<(StatusCode, Json<Section>), AppError> {
    let section = ClassService::create_section(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

#[utoipa::path(
    post,
    path = "/api/sections",
    request_body = CreateSectionWithClassDto,
    responses(
        (status = 201, description = "Section created successfully", body = Section),
        (status = 400, description = "Section name already used in this class", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state, dto))]
pub async fn create_section(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateSectionWithClassDto>,
) -> Result<(StatusCode, Json<Section>), AppError> {
    let section = ClassService::create_section(&state.db, dto.class_id, dto.section).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

#[utoipa::path(
    get,
    path = "/api/sections",
    params(SectionFilterParams),
    responses(
        (status = 200, description = "Paginated list of sections", body = PaginatedSectionsResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state))]
pub async fn get_sections(
    State(state): State<AppState>,
    Query(params): Query<SectionFilterParams>,
) -> Result<Json<PaginatedSectionsResponse>, AppError> {
    let sections = ClassService::get_sections(&state.db, params).await?;
    Ok(Json(sections))
}

#[utoipa::path(
    get,
    path = "/api/sections/{id}",
    params(
        ("id" = Uuid, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Section details", body = Section),
        (status = 404, description = "Section not found", body = ErrorResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state))]
pub async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<SectionId>,
) -> Result<Json<Section>, AppError> {
    let section = ClassService::get_section(&state.db, id).await?;
    Ok(Json(section))
}

#[utoipa::path(
    put,
    path = "/api/sections/{id}",
    params(
        ("id" = Uuid, Path, description = "Section ID")
    ),
    request_body = UpdateSectionDto,
    responses(
        (status = 200, description = "Section updated successfully", body = Section),
        (status = 400, description = "Section name already used in this class", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state, dto))]
pub async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<SectionId>,
    ValidatedJson(dto): ValidatedJson<UpdateSectionDto>,
) -> Result<Json<Section>, AppError> {
    let section = ClassService::update_section(&state.db, id, dto).await?;
    Ok(Json(section))
}

#[utoipa::path(
    delete,
    path = "/api/sections/{id}",
    params(
        ("id" = Uuid, Path, description = "Section ID")
    ),
    responses(
        (status = 204, description = "Section deleted successfully"),
        (status = 404, description = "Section not found", body = ErrorResponse)
    ),
    tag = "Sections"
)]
#[instrument(skip(state))]
pub async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<SectionId>,
) -> Result<StatusCode, AppError> {
    ClassService::delete_section(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
