//! Prometheus metrics for the route service.
//!
//! Call [`init_metrics`] once at start-up and mount [`metrics_handler`] at
//! `/metrics`. The `record_*` helpers are no-ops until a recorder is
//! installed, so handlers can call them unconditionally.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use skyroute_lib::HazardSignal;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// `METRICS_ENABLED=false` turns collection off.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self { enabled }
    }
}

/// Install the global Prometheus recorder.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Axum handler for `/metrics` (Prometheus exposition format).
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increment `skyroute_routes_calculated_total`.
pub fn record_route_calculated(retry: bool) {
    metrics::counter!(
        "skyroute_routes_calculated_total",
        "retry" => if retry { "true" } else { "false" }
    )
    .increment(1);
}

/// Increment `skyroute_routes_failed_total` with a `reason` label such as
/// `no_path`, `unknown_airport`, `hazard`, or `validation_error`.
pub fn record_route_failed(reason: &'static str) {
    metrics::counter!("skyroute_routes_failed_total", "reason" => reason).increment(1);
}

/// Increment `skyroute_weather_hazards_total` for a refused query.
pub fn record_weather_hazard(hazard: HazardSignal) {
    let label = match hazard {
        HazardSignal::None => return,
        HazardSignal::Thunderstorm => "thunderstorm",
        HazardSignal::Tornado => "tornado",
    };
    metrics::counter!("skyroute_weather_hazards_total", "hazard" => label).increment(1);
}

/// Record the hop count of a successful route in `skyroute_route_hops`.
pub fn record_route_hops(hops: usize) {
    metrics::histogram!("skyroute_route_hops").record(hops as f64);
}
