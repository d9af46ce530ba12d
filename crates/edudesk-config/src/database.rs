//! PostgreSQL connection settings.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `RUN_MIGRATIONS`: Apply pending migrations on startup (default: true)

use std::fmt;

/// Returned when a required environment variable is not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEnvVar(pub &'static str);

impl fmt::Display for MissingEnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must be set", self.0)
    }
}

impl std::error::Error for MissingEnvVar {}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, MissingEnvVar> {
        let url = std::env::var("DATABASE_URL").map_err(|_| MissingEnvVar("DATABASE_URL"))?;

        Ok(Self {
            url,
            max_connections: crate::env_or("DATABASE_MAX_CONNECTIONS", 10),
            run_migrations: crate::env_flag("RUN_MIGRATIONS", true),
        })
    }
}

// The URL carries credentials.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}
