//! Skyroute library entry points.
//!
//! This crate loads airport and route datasets into a [`RouteGraph`], screens
//! route queries against live weather, and runs weather-adjusted shortest-path
//! searches. Higher-level consumers (CLI, HTTP service) should only depend on
//! the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod dataset;
pub mod error;
pub mod geodesy;
pub mod graph;
pub mod hazard;
pub mod path;
pub mod reweight;
pub mod routing;
pub mod weather;

pub use dataset::{build_route_graph, load_route_graph, DatasetPaths, IngestReport};
pub use error::{Error, Result};
pub use geodesy::{distance_km, initial_bearing, Coordinate};
pub use graph::{Airport, AirportId, Connection, EdgeKey, RouteGraph};
pub use hazard::{ConditionClass, HazardSignal, HazardTaxonomy};
pub use path::{find_route_dijkstra, find_shortest_path, PathOutcome};
pub use reweight::{Reweighting, WeatherReweighter, WeightOverrides};
pub use routing::{plan_route, plan_route_with, RoutePlan, RouteRequest};
pub use weather::{
    OpenWeatherMapProvider, StaticWeatherProvider, WeatherConfig, WeatherProvider,
    WeatherSnapshot,
};
