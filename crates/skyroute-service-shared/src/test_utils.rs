//! Fixtures for handler tests.
//!
//! Loads the CSV fixtures under `docs/fixtures/` once and builds `AppState`
//! values around them with deterministic weather.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use skyroute_lib::{
    load_route_graph, DatasetPaths, RouteGraph, StaticWeatherProvider, WeatherProvider,
    WeatherSnapshot,
};

use crate::middleware::RequestId;
use crate::state::AppState;

/// Directory holding the fixture datasets and weather payloads.
pub const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures");

static FIXTURE_GRAPH: OnceLock<RouteGraph> = OnceLock::new();

pub fn fixture_paths() -> DatasetPaths {
    let dir = PathBuf::from(FIXTURE_DIR);
    DatasetPaths::new(dir.join("airports.csv"), dir.join("routes.csv"))
}

/// Fixture graph, parsed once per test binary.
///
/// # Panics
///
/// Panics if the fixture files cannot be loaded.
pub fn fixture_graph() -> RouteGraph {
    FIXTURE_GRAPH
        .get_or_init(|| {
            let paths = fixture_paths();
            load_route_graph(&paths)
                .unwrap_or_else(|e| panic!("failed to load fixtures from {:?}: {}", paths, e))
                .0
        })
        .clone()
}

/// Fixture state with calm weather everywhere.
pub fn test_state() -> AppState {
    test_state_with(StaticWeatherProvider::calm())
}

pub fn test_state_with(provider: impl WeatherProvider + 'static) -> AppState {
    AppState::from_components(fixture_graph(), Arc::new(provider))
}

/// Calm weather everywhere except `snapshot` at airport `id`.
pub fn weather_at(id: &str, snapshot: WeatherSnapshot) -> StaticWeatherProvider {
    let graph = fixture_graph();
    let coordinate = graph
        .airport(id)
        .unwrap_or_else(|| panic!("{} is not a fixture airport", id))
        .coordinate;
    StaticWeatherProvider::calm().with_override(coordinate, snapshot)
}

/// Airport ids present in the fixture dataset.
pub mod fixture_airports {
    /// London Heathrow, hub of the fixture network.
    pub const LHR: &str = "LHR";
    pub const JFK: &str = "JFK";
    pub const SIN: &str = "SIN";
    /// Null Island; only connected to `EQE`.
    pub const NUL: &str = "NUL";
    /// One degree east of `NUL`.
    pub const EQE: &str = "EQE";
}

pub fn test_request_id() -> String {
    format!("test-{}", RequestId::generate())
}
