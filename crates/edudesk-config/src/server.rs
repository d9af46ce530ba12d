//! HTTP server settings.
//!
//! - `SERVER_HOST`: Bind address (default: 0.0.0.0)
//! - `SERVER_PORT`: API port (default: 3000)
//! - `METRICS_PORT`: Prometheus exposition port (default: 9090)

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            metrics_port: 9090,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: crate::env_or("SERVER_PORT", defaults.port),
            metrics_port: crate::env_or("METRICS_PORT", defaults.metrics_port),
        }
    }

    /// `host:port` of the API listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:port` of the metrics listener.
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.metrics_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        // Key chosen so it is never set in a real environment.
        let port: u16 = crate::env_or("EDUDESK_TEST_UNSET_PORT_VARIABLE", 4321);
        assert_eq!(port, 4321);
    }
}
