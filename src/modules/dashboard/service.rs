use edudesk_core::AppError;
use edudesk_models::dashboard::{DashboardSummary, DirectoryCounts, FeeTotals};
use sqlx::PgPool;
use tracing::instrument;

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn get_summary(db: &PgPool) -> Result<DashboardSummary, AppError> {
        let counts = sqlx::query_as::<_, DirectoryCounts>(
            r#"SELECT
                   (SELECT COUNT(*) FROM students) AS students,
                   (SELECT COUNT(*) FROM teachers) AS teachers,
                   (SELECT COUNT(*) FROM classes) AS classes,
                   (SELECT COUNT(*) FROM sections) AS sections,
                   (SELECT COUNT(*) FROM subjects) AS subjects,
                   (SELECT COUNT(*) FROM buses) AS buses,
                   (SELECT COUNT(*) FROM schedules WHERE status = 'active') AS active_schedules"#,
        )
        .fetch_one(db)
        .await?;

        let fees = sqlx::query_as::<_, FeeTotals>(
            r#"SELECT
                   COALESCE(SUM(total), 0) AS billed,
                   COALESCE(SUM(paid_amount), 0) AS collected,
                   COALESCE(SUM(total - paid_amount), 0) AS outstanding,
                   COUNT(*) FILTER (WHERE paid_amount = 0 AND total > 0) AS unpaid_fees
               FROM fees"#,
        )
        .fetch_one(db)
        .await?;

        Ok(DashboardSummary { counts, fees })
    }
}
