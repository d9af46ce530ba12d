use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use edudesk_core::{AppError, ErrorResponse};
use edudesk_models::fees::FeeSummary;
use edudesk_models::ids::PaymentId;
use edudesk_models::payments::{
    CreatePaymentDto, PaginatedPaymentsResponse, Payment, PaymentFilterParams, RecordedPayment,
};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::payments::service::PaymentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentDto,
    responses(
        (status = 201, description = "Payment recorded", body = RecordedPayment),
        (status = 404, description = "Fee not found", body = ErrorResponse),
        (status = 422, description = "Amount not positive or above the remaining balance", body = ErrorResponse)
    ),
    tag = "Payments"
)]
#[instrument(skip(state, dto))]
pub async fn record_payment(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePaymentDto>,
) -> Result<(StatusCode, Json<RecordedPayment>), AppError> {
    let recorded = PaymentService::record_payment(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    params(PaymentFilterParams),
    responses(
        (status = 200, description = "Paginated list of payments", body = PaginatedPaymentsResponse)
    ),
    tag = "Payments"
)]
#[instrument(skip(state))]
pub async fn get_payments(
    State(state): State<AppState>,
    Query(filters): Query<PaymentFilterParams>,
) -> Result<Json<PaginatedPaymentsResponse>, AppError> {
    let payments = PaymentService::get_payments(&state.db, filters).await?;
    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    ),
    tag = "Payments"
)]
#[instrument(skip(state))]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<Json<Payment>, AppError> {
    let payment = PaymentService::get_payment(&state.db, id).await?;
    Ok(Json(payment))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment reversed; returns the fee balance", body = FeeSummary),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    ),
    tag = "Payments"
)]
#[instrument(skip(state))]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<Json<FeeSummary>, AppError> {
    let fee = PaymentService::delete_payment(&state.db, id).await?;
    Ok(Json(fee))
}
