//! Application state for the route service.
//!
//! The route graph is built once at start-up and shared read-only between
//! handlers; each query carries its own weight overrides.

use std::sync::Arc;

use skyroute_lib::{
    load_route_graph, Error as LibError, IngestReport, OpenWeatherMapProvider, RouteGraph,
    StaticWeatherProvider, WeatherProvider, WeatherReweighter,
};

use crate::config::ServiceConfig;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to load the airport or route dataset.
    DatasetLoad(LibError),

    /// Failed to build the weather provider.
    WeatherProvider(LibError),

    /// The dataset loaded but contains no airports.
    EmptyGraph,
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetLoad(e) => write!(f, "failed to load route dataset: {}", e),
            Self::WeatherProvider(e) => write!(f, "failed to set up weather provider: {}", e),
            Self::EmptyGraph => write!(f, "route dataset contains no airports"),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetLoad(e) | Self::WeatherProvider(e) => Some(e),
            Self::EmptyGraph => None,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable (`Arc` internally); clones can be moved into
/// `spawn_blocking` closures.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graph: RouteGraph,
    weather: Arc<dyn WeatherProvider>,
    reweighter: WeatherReweighter,
    ingest: IngestReport,
}

impl AppState {
    /// Load the datasets and weather provider named by `config`.
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        tracing::info!(
            airports = %config.datasets.airports.display(),
            routes = %config.datasets.routes.display(),
            "loading route dataset"
        );
        let (graph, ingest) =
            load_route_graph(&config.datasets).map_err(AppStateError::DatasetLoad)?;
        if graph.airport_count() == 0 {
            return Err(AppStateError::EmptyGraph);
        }

        let weather: Arc<dyn WeatherProvider> = match &config.weather_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "serving weather from a fixed payload");
                Arc::new(
                    StaticWeatherProvider::from_payload_file(path)
                        .map_err(AppStateError::WeatherProvider)?,
                )
            }
            None => {
                if config.weather.api_key.is_empty() {
                    tracing::warn!("OPENWEATHER_API_KEY is not set, weather requests will fail");
                }
                Arc::new(
                    OpenWeatherMapProvider::new(config.weather.clone())
                        .map_err(AppStateError::WeatherProvider)?,
                )
            }
        };

        Ok(Self::build(graph, weather, ingest))
    }

    /// Create application state from pre-loaded components.
    pub fn from_components(graph: RouteGraph, weather: Arc<dyn WeatherProvider>) -> Self {
        Self::build(graph, weather, IngestReport::default())
    }

    fn build(graph: RouteGraph, weather: Arc<dyn WeatherProvider>, ingest: IngestReport) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                graph,
                weather,
                reweighter: WeatherReweighter::default(),
                ingest,
            }),
        }
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.inner.graph
    }

    pub fn weather(&self) -> &dyn WeatherProvider {
        self.inner.weather.as_ref()
    }

    pub fn reweighter(&self) -> &WeatherReweighter {
        &self.inner.reweighter
    }

    /// Row counts from the dataset load (all zero for injected graphs).
    pub fn ingest_report(&self) -> IngestReport {
        self.inner.ingest
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("airport_count", &self.inner.graph.airport_count())
            .field("connection_count", &self.inner.graph.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyroute_lib::DatasetPaths;

    fn two_airport_graph() -> RouteGraph {
        let mut graph = RouteGraph::new();
        graph.add_airport("AAA", 0.0, 0.0, "Alpha");
        graph.add_airport("BBB", 0.0, 1.0, "Bravo");
        graph.add_route("AAA", "BBB");
        graph
    }

    #[test]
    fn test_app_state_from_components() {
        let state =
            AppState::from_components(two_airport_graph(), Arc::new(StaticWeatherProvider::calm()));

        assert_eq!(state.graph().airport_count(), 2);
        assert_eq!(state.graph().connection_count(), 1);
        assert_eq!(state.ingest_report(), IngestReport::default());
    }

    #[test]
    fn test_app_state_clone_shares_graph() {
        let state1 =
            AppState::from_components(two_airport_graph(), Arc::new(StaticWeatherProvider::calm()));
        let state2 = state1.clone();
        assert!(std::ptr::eq(state1.graph(), state2.graph()));
    }

    #[test]
    fn test_app_state_debug() {
        let state =
            AppState::from_components(two_airport_graph(), Arc::new(StaticWeatherProvider::calm()));
        let debug = format!("{:?}", state);
        assert!(debug.contains("airport_count: 2"));
        assert!(debug.contains("connection_count: 1"));
    }

    #[test]
    fn test_app_state_load_missing_dataset() {
        let config = ServiceConfig {
            datasets: DatasetPaths::new("/nonexistent/airports.csv", "/nonexistent/routes.csv"),
            ..ServiceConfig::default()
        };

        match AppState::load(&config) {
            Err(AppStateError::DatasetLoad(LibError::DatasetNotFound { path })) => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
