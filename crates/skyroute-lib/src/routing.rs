use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{AirportId, RouteGraph};
use crate::path::{route_cost, search, PathOutcome};
use crate::reweight::{WeatherReweighter, WeightOverrides};
use crate::weather::WeatherProvider;

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub start: String,
    pub goal: String,
    /// Set on a repeated attempt; skips the thunderstorm block.
    pub is_retry: bool,
}

impl RouteRequest {
    pub fn new(start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            is_retry: false,
        }
    }

    /// Mark the request as a repeated attempt.
    pub fn retry(mut self) -> Self {
        self.is_retry = true;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub start: AirportId,
    pub goal: AirportId,
    pub steps: Vec<AirportId>,
    /// Great-circle length of the route.
    pub distance_km: f64,
    /// Total weather-adjusted weight the search minimised.
    pub weighted_cost: f64,
}

impl RoutePlan {
    /// Number of flights in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Compute a weather-aware route with the default hazard taxonomy.
pub fn plan_route(
    graph: &RouteGraph,
    provider: &dyn WeatherProvider,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    plan_route_with(graph, provider, &WeatherReweighter::default(), request)
}

/// Compute a weather-aware route, reporting every failure as a typed error.
///
/// Unknown airports, disconnected airports, weather hazards, and weather
/// outages each map to their own [`Error`] variant.
pub fn plan_route_with(
    graph: &RouteGraph,
    provider: &dyn WeatherProvider,
    reweighter: &WeatherReweighter,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    for id in [&request.start, &request.goal] {
        if !graph.has_airport(id) {
            return Err(Error::UnknownAirport { id: id.clone() });
        }
    }

    let search = search(
        graph,
        provider,
        reweighter,
        &request.start,
        &request.goal,
        request.is_retry,
    )?;

    let steps = match search.outcome {
        PathOutcome::Route(steps) => steps,
        PathOutcome::Hazard(hazard) => return Err(Error::HazardBlocked { hazard }),
        PathOutcome::Empty => {
            return Err(Error::RouteNotFound {
                start: request.start.clone(),
                goal: request.goal.clone(),
            })
        }
    };

    // Every hop came out of the search, so both sums are defined.
    let distance_km = route_cost(graph, &steps, &WeightOverrides::new()).unwrap_or_default();
    let weighted_cost = route_cost(graph, &steps, &search.overrides).unwrap_or_default();

    Ok(RoutePlan {
        start: request.start.clone(),
        goal: request.goal.clone(),
        steps,
        distance_km,
        weighted_cost,
    })
}
