//! Environment-driven configuration for the route service.
//!
//! # Environment Variables
//!
//! - `SERVICE_PORT`: HTTP port (default: 5635)
//! - `SKYROUTE_AIRPORTS_PATH`, `SKYROUTE_ROUTES_PATH`: dataset files
//! - `OPENWEATHER_API_KEY`, `OPENWEATHER_BASE_URL`, `WEATHER_TIMEOUT_SECS`: live weather
//! - `SKYROUTE_WEATHER_FILE`: serve a fixed weather payload instead of calling the provider
//! - `CORS_ALLOW_ORIGIN`: allowed origin (default: any)

use std::env;
use std::path::PathBuf;

use skyroute_lib::{DatasetPaths, WeatherConfig};

/// Default listen port.
pub const DEFAULT_SERVICE_PORT: u16 = 5635;

/// Fully resolved service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub datasets: DatasetPaths,
    pub weather: WeatherConfig,
    /// Offline weather payload; takes precedence over `weather` when set.
    pub weather_file: Option<PathBuf>,
    /// `None` allows any origin.
    pub cors_allow_origin: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVICE_PORT,
            datasets: DatasetPaths::default(),
            weather: WeatherConfig::default(),
            weather_file: None,
            cors_allow_origin: None,
        }
    }
}

impl ServiceConfig {
    /// Read every setting from the environment, falling back to defaults for
    /// missing or unparseable values.
    pub fn from_env() -> Self {
        let port = env::var("SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_SERVICE_PORT);

        let cors_allow_origin = env::var("CORS_ALLOW_ORIGIN")
            .ok()
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty() && origin != "*");

        Self {
            port,
            datasets: DatasetPaths::from_env(),
            weather: WeatherConfig::from_env(),
            weather_file: env::var_os("SKYROUTE_WEATHER_FILE").map(PathBuf::from),
            cors_allow_origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 5635);
        assert_eq!(config.datasets, DatasetPaths::default());
        assert!(config.weather_file.is_none());
        assert!(config.cors_allow_origin.is_none());
    }
}
