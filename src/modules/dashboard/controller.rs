use axum::{Json, extract::State};
use edudesk_core::AppError;
use edudesk_models::dashboard::DashboardSummary;
use tracing::instrument;

use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Directory counts and fee totals", body = DashboardSummary)
    ),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = DashboardService::get_summary(&state.db).await?;
    Ok(Json(summary))
}
