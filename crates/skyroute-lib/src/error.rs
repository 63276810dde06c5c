use std::path::PathBuf;

use thiserror::Error;

use crate::hazard::HazardSignal;

/// Convenient result alias for the Skyroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset file could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when a dataset file is structurally unusable (e.g. missing header).
    #[error("invalid dataset {path}: {message}")]
    InvalidDataset { path: PathBuf, message: String },

    /// Raised when an airport identifier is not part of the loaded graph.
    #[error("unknown airport: {id}")]
    UnknownAirport { id: String },

    /// Raised when no route could be found between two airports.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when live weather at an endpoint blocks the route.
    #[error("route blocked by weather hazard: {hazard}")]
    HazardBlocked { hazard: HazardSignal },

    /// Raised when current weather could not be obtained for an endpoint.
    #[error("weather data unavailable: {message}")]
    WeatherUnavailable { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for building a [`Error::WeatherUnavailable`].
    pub fn weather_unavailable(message: impl Into<String>) -> Self {
        Self::WeatherUnavailable {
            message: message.into(),
        }
    }

    /// Whether repeating the same query may succeed without any change on the
    /// caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::WeatherUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_weather_failures_are_retryable() {
        assert!(Error::weather_unavailable("timeout").is_retryable());
        assert!(!Error::RouteNotFound {
            start: "JFK".into(),
            goal: "LHR".into()
        }
        .is_retryable());
        assert!(!Error::HazardBlocked {
            hazard: HazardSignal::Tornado
        }
        .is_retryable());
    }

    #[test]
    fn hazard_message_names_the_hazard() {
        let error = Error::HazardBlocked {
            hazard: HazardSignal::Thunderstorm,
        };
        assert!(error.to_string().contains("Thunderstorm alert"));
    }
}
