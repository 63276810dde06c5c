//! Shared infrastructure for the Skyroute HTTP service.
//!
//! - [`AppState`]: route graph and weather provider loaded once at start-up
//! - [`ServiceConfig`]: environment-driven settings
//! - [`health_live`] / [`health_ready`]: probe handlers
//! - [`ProblemDetails`]: RFC 9457 error bodies, including weather hazards
//! - [`ServiceResponse`] / [`RouteResponse`]: success bodies
//! - [`metrics`]: Prometheus recorder and business counters
//! - [`logging`]: JSON or text tracing output
//! - [`middleware`]: request correlation IDs
//!
//! Handlers stay thin: parse, validate, call `skyroute-lib`, format. Enable
//! the `test-utils` feature to reuse the fixture helpers from other crates.

#![deny(warnings)]

pub mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ServiceConfig, DEFAULT_SERVICE_PORT};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_route_calculated, record_route_failed,
    record_route_hops, record_weather_hazard, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    failure_reason, from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST, PROBLEM_ROUTE_NOT_FOUND, PROBLEM_WEATHER_HAZARD,
    PROBLEM_WEATHER_UNAVAILABLE,
};
pub use request::{RouteQuery, RouteRequest, Validate, MAX_AIRPORT_ID_LEN};
pub use response::{RouteResponse, ServiceResponse};
pub use state::{AppState, AppStateError};
