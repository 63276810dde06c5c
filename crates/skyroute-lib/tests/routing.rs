use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use skyroute_lib::{
    find_shortest_path, load_route_graph, plan_route, Coordinate, DatasetPaths, Error,
    HazardSignal, PathOutcome, RouteGraph, RouteRequest, StaticWeatherProvider,
    WeatherProvider, WeatherReweighter, WeatherSnapshot,
};

fn fixture_graph() -> RouteGraph {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures");
    let paths = DatasetPaths::new(dir.join("airports.csv"), dir.join("routes.csv"));
    load_route_graph(&paths).expect("fixture loads").0
}

fn coordinate(graph: &RouteGraph, id: &str) -> Coordinate {
    graph.airport(id).expect("fixture airport").coordinate
}

/// Counts calls and fails every one of them.
#[derive(Default)]
struct OfflineProvider {
    calls: AtomicUsize,
}

impl WeatherProvider for OfflineProvider {
    fn current(&self, _coordinate: Coordinate) -> skyroute_lib::Result<WeatherSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::weather_unavailable("provider offline"))
    }
}

#[test]
fn calm_weather_route_plan_succeeds() {
    let graph = fixture_graph();
    let plan = plan_route(
        &graph,
        &StaticWeatherProvider::calm(),
        &RouteRequest::new("LHR", "SIN"),
    )
    .expect("route exists");

    assert_eq!(plan.steps, vec!["LHR", "CDG", "FRA", "DXB", "SIN"]);
    assert_eq!(plan.hop_count(), 4);
    assert!((plan.distance_km - 11486.0).abs() < 1.0, "{}", plan.distance_km);
    // LHR-CDG and DXB-SIN are touched and carry the adverse wind factor.
    assert!(
        (plan.weighted_cost - 12724.8).abs() < 1.0,
        "{}",
        plan.weighted_cost
    );
}

#[test]
fn single_hop_crosswind_example() {
    let graph = fixture_graph();
    let provider = StaticWeatherProvider::new(WeatherSnapshot::calm().with_wind(0.0, 6.0));
    let plan = plan_route(&graph, &provider, &RouteRequest::new("NUL", "EQE")).expect("route");

    assert_eq!(plan.steps, vec!["NUL", "EQE"]);
    assert!((plan.distance_km - 111.2).abs() < 0.05);
    assert!((plan.weighted_cost - 133.4).abs() < 0.05);
}

#[test]
fn disconnected_airports_report_no_route() {
    let graph = fixture_graph();
    let error = plan_route(
        &graph,
        &StaticWeatherProvider::calm(),
        &RouteRequest::new("LHR", "NUL"),
    )
    .expect_err("NUL is not connected to LHR");

    assert!(matches!(error, Error::RouteNotFound { .. }));
    assert!(format!("{error}").contains("no route found"));
}

#[test]
fn unknown_airport_is_empty_without_weather_lookup() {
    let graph = fixture_graph();
    let provider = OfflineProvider::default();

    let outcome = find_shortest_path(
        &graph,
        &provider,
        &WeatherReweighter::default(),
        "LHR",
        "XXX",
        false,
    )
    .expect("unknown airports are not an error");
    assert_eq!(outcome, PathOutcome::Empty);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

    let error = plan_route(&graph, &provider, &RouteRequest::new("XXX", "LHR"))
        .expect_err("unknown start");
    assert!(matches!(error, Error::UnknownAirport { id } if id == "XXX"));
}

#[test]
fn weather_outage_fails_the_query() {
    let graph = fixture_graph();
    let provider = OfflineProvider::default();

    let error = plan_route(&graph, &provider, &RouteRequest::new("LHR", "JFK"))
        .expect_err("weather unavailable");
    assert!(matches!(error, Error::WeatherUnavailable { .. }));
    assert!(error.is_retryable());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2, "both endpoints are fetched");
}

#[test]
fn tornado_at_destination_blocks_route() {
    let graph = fixture_graph();
    let provider = StaticWeatherProvider::calm().with_override(
        coordinate(&graph, "SIN"),
        WeatherSnapshot::calm().with_condition(781),
    );

    let error = plan_route(&graph, &provider, &RouteRequest::new("LHR", "SIN").retry())
        .expect_err("tornado blocks even retries");
    assert!(matches!(
        error,
        Error::HazardBlocked {
            hazard: HazardSignal::Tornado
        }
    ));
}

#[test]
fn thunderstorm_blocks_only_first_attempt() {
    let graph = fixture_graph();
    let provider = StaticWeatherProvider::calm().with_override(
        coordinate(&graph, "LHR"),
        WeatherSnapshot::calm().with_condition(202),
    );

    let outcome = find_shortest_path(
        &graph,
        &provider,
        &WeatherReweighter::default(),
        "LHR",
        "JFK",
        false,
    )
    .expect("static weather");
    assert_eq!(outcome, PathOutcome::Hazard(HazardSignal::Thunderstorm));

    let retry = plan_route(&graph, &provider, &RouteRequest::new("LHR", "JFK").retry())
        .expect("retry proceeds");
    assert_eq!(retry.steps, vec!["LHR", "JFK"]);
}

#[test]
fn weather_penalties_do_not_leak_between_queries() {
    let graph = fixture_graph();
    let before = graph.connection("LHR", "CDG").unwrap().distance_km;

    let ash = StaticWeatherProvider::new(WeatherSnapshot::calm().with_condition(762));
    let ash_plan = plan_route(&graph, &ash, &RouteRequest::new("LHR", "FRA")).expect("route");
    let calm_plan = plan_route(
        &graph,
        &StaticWeatherProvider::calm(),
        &RouteRequest::new("LHR", "FRA"),
    )
    .expect("route");

    assert_eq!(graph.connection("LHR", "CDG").unwrap().distance_km, before);
    assert!(ash_plan.weighted_cost > calm_plan.weighted_cost);
    assert_eq!(ash_plan.distance_km, calm_plan.distance_km);
}
