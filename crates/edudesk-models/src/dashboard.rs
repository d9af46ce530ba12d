//! Dashboard summary returned by `GET /api/dashboard/summary`.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
pub struct DirectoryCounts {
    pub students: i64,
    pub teachers: i64,
    pub classes: i64,
    pub sections: i64,
    pub subjects: i64,
    pub buses: i64,
    pub active_schedules: i64,
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
pub struct FeeTotals {
    pub billed: Decimal,
    pub collected: Decimal,
    pub outstanding: Decimal,
    pub unpaid_fees: i64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub counts: DirectoryCounts,
    pub fees: FeeTotals,
}
