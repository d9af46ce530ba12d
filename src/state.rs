use edudesk_config::CorsConfig;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            cors_config: CorsConfig::from_env(),
        }
    }
}
