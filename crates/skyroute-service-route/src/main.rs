//! Weather-aware flight route planning HTTP service.
//!
//! # Endpoints
//!
//! - `GET /shortest_path?start=..&end=..&int=..` - Route query (non-empty `int` marks a retry)
//! - `POST /api/v1/route` - Same query as JSON `{"start", "end", "retry"}`
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//!
//! Configuration is read from the environment; see
//! [`skyroute_service_shared::config`].

use std::net::SocketAddr;

use axum::{
    extract::{Query, State},
    http::{header::HeaderValue, HeaderMap, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use skyroute_lib::{plan_route_with, Error as LibError};
use skyroute_service_shared::{
    extract_or_generate_request_id, failure_reason, from_lib_error, health_live, health_ready,
    init_logging, init_metrics, metrics_handler, record_route_calculated, record_route_failed,
    record_route_hops, record_weather_hazard, AppState, LoggingConfig, MetricsConfig,
    ProblemDetails, RouteQuery, RouteRequest, RouteResponse, ServiceConfig, ServiceResponse,
    Validate,
};

type RouteResult = Result<ServiceResponse<RouteResponse>, ProblemDetails>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("route");
    init_logging(&logging_config)?;

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(port = config.port, "starting route service");

    // Dataset parsing is blocking file I/O.
    let load_config = config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&load_config))
        .await?
        .map_err(|e| {
            error!(error = %e, "failed to load application state");
            e
        })?;

    let report = state.ingest_report();
    info!(
        airports = state.graph().airport_count(),
        connections = state.graph().connection_count(),
        skipped_airport_rows = report.airport_rows_skipped,
        dropped_routes = report.routes_dropped_unknown_airport,
        "application state loaded"
    );

    let app = build_router(state, cors_layer(config.cors_allow_origin.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/shortest_path", get(shortest_path_handler))
        .route("/api/v1/route", post(route_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origin = match allow_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!(error = %e, "invalid CORS_ALLOW_ORIGIN, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Handle `GET /shortest_path`.
async fn shortest_path_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RouteQuery>,
) -> RouteResult {
    plan(state, &headers, RouteRequest::from(query)).await
}

/// Handle `POST /api/v1/route`.
async fn route_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RouteRequest>,
) -> RouteResult {
    plan(state, &headers, request).await
}

async fn plan(state: AppState, headers: &HeaderMap, request: RouteRequest) -> RouteResult {
    let request_id = extract_or_generate_request_id(headers).to_string();

    info!(
        request_id = %request_id,
        start = %request.start,
        end = %request.end,
        retry = request.retry,
        "handling route request"
    );

    if let Err(problem) = request.validate(&request_id) {
        record_route_failed("validation_error");
        return Err(*problem);
    }

    let lib_request = request.to_lib_request();
    let retry = lib_request.is_retry;

    // Weather fetches and the search block; keep them off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        plan_route_with(
            state.graph(),
            state.weather(),
            state.reweighter(),
            &lib_request,
        )
    })
    .await;

    let plan = match outcome {
        Ok(Ok(plan)) => plan,
        Ok(Err(e)) => {
            report_failure(&e, &request_id);
            return Err(from_lib_error(&e, &request_id));
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "route planning task failed");
            record_route_failed("internal_error");
            return Err(ProblemDetails::internal_error(
                "route planning task failed",
                request_id,
            ));
        }
    };

    let response = RouteResponse::from(plan);
    record_route_calculated(retry);
    record_route_hops(response.hops);

    info!(
        request_id = %request_id,
        hops = response.hops,
        distance_km = response.distance_km,
        weighted_cost = response.weighted_cost,
        "route computed successfully"
    );

    Ok(ServiceResponse::new(response))
}

fn report_failure(error: &LibError, request_id: &str) {
    match error {
        LibError::HazardBlocked { hazard } => {
            warn!(request_id = %request_id, hazard = %hazard, "route refused by weather");
            record_weather_hazard(*hazard);
        }
        LibError::UnknownAirport { .. } | LibError::RouteNotFound { .. } => {
            info!(request_id = %request_id, error = %error, "no route");
        }
        _ => error!(request_id = %request_id, error = %error, "route planning failed"),
    }
    record_route_failed(failure_reason(error));
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use skyroute_lib::{Coordinate, WeatherProvider, WeatherSnapshot};
    use skyroute_service_shared::test_utils::{
        fixture_airports::{EQE, JFK, LHR, NUL, SIN},
        test_state, test_state_with, weather_at,
    };

    fn server(state: AppState) -> TestServer {
        TestServer::new(build_router(state, cors_layer(None))).expect("test server")
    }

    struct OfflineWeather;

    impl WeatherProvider for OfflineWeather {
        fn current(&self, _coordinate: Coordinate) -> skyroute_lib::Result<WeatherSnapshot> {
            Err(LibError::weather_unavailable("provider offline"))
        }
    }

    #[tokio::test]
    async fn shortest_path_query_returns_route() {
        let response = server(test_state())
            .get("/shortest_path")
            .add_query_param("start", LHR)
            .add_query_param("end", SIN)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["route"], json!(["LHR", "CDG", "FRA", "DXB", "SIN"]));
        assert_eq!(body["hops"], 4);
        assert_eq!(body["content_type"], "application/json");
        assert!(body["weighted_cost"].as_f64().unwrap() > body["distance_km"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn json_route_request_matches_query_form() {
        let response = server(test_state())
            .post("/api/v1/route")
            .json(&json!({ "start": NUL, "end": EQE }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["route"], json!(["NUL", "EQE"]));
        assert_eq!(body["hops"], 1);
    }

    #[tokio::test]
    async fn thunderstorm_is_refused_then_allowed_on_retry() {
        let storm = WeatherSnapshot::calm().with_condition(211);
        let server = server(test_state_with(weather_at(LHR, storm)));

        let refused = server
            .get("/shortest_path")
            .add_query_param("start", LHR)
            .add_query_param("end", JFK)
            .await;
        refused.assert_status(StatusCode::CONFLICT);
        let problem: Value = refused.json();
        assert_eq!(problem["type"], "/problems/weather-hazard");
        assert_eq!(
            problem["detail"],
            "No Flight Available Because of Thunderstorm alert"
        );

        let retried = server
            .get("/shortest_path")
            .add_query_param("start", LHR)
            .add_query_param("end", JFK)
            .add_query_param("int", "1")
            .await;
        retried.assert_status_ok();
        assert_eq!(retried.json::<Value>()["route"], json!(["LHR", "JFK"]));
    }

    #[tokio::test]
    async fn tornado_is_refused_even_on_retry() {
        let tornado = WeatherSnapshot::calm().with_condition(781);
        let response = server(test_state_with(weather_at(JFK, tornado)))
            .post("/api/v1/route")
            .json(&json!({ "start": LHR, "end": JFK, "retry": true }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["hazard"], "Tornado");
    }

    #[tokio::test]
    async fn unknown_and_disconnected_airports_are_not_found() {
        let server = server(test_state());

        let unknown = server
            .get("/shortest_path")
            .add_query_param("start", "XXX")
            .add_query_param("end", LHR)
            .await;
        unknown.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(unknown.json::<Value>()["type"], "/problems/route-not-found");

        let disconnected = server
            .get("/shortest_path")
            .add_query_param("start", LHR)
            .add_query_param("end", NUL)
            .await;
        disconnected.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn weather_outage_is_service_unavailable() {
        let response = server(test_state_with(OfflineWeather))
            .get("/shortest_path")
            .add_query_param("start", LHR)
            .add_query_param("end", JFK)
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.json::<Value>()["type"],
            "/problems/weather-unavailable"
        );
    }

    #[tokio::test]
    async fn missing_parameters_are_bad_requests() {
        let response = server(test_state())
            .get("/shortest_path")
            .add_query_param("start", LHR)
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-missing-end"),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let problem: Value = response.json();
        assert!(problem["detail"].as_str().unwrap().contains("'end'"));
        assert_eq!(problem["instance"], "req-missing-end");
    }

    #[tokio::test]
    async fn readiness_reports_graph_size() {
        let response = server(test_state()).get("/health/ready").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["airports_loaded"], 10);
        assert_eq!(body["connections_loaded"], 10);
    }

    #[tokio::test]
    async fn liveness_is_ok() {
        server(test_state()).get("/health/live").await.assert_status_ok();
    }

    #[test]
    fn invalid_cors_origin_falls_back_to_any() {
        // Building the layer must not panic on a header-invalid origin.
        let _ = cors_layer(Some("bad\norigin"));
        let _ = cors_layer(Some("https://example.com"));
    }
}
