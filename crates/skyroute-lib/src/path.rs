use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, info};

use crate::error::Result;
use crate::graph::{AirportId, RouteGraph};
use crate::hazard::HazardSignal;
use crate::reweight::{WeatherReweighter, WeightOverrides};
use crate::weather::WeatherProvider;

/// Outcome of a single shortest-path query.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// Ordered airport ids from start to goal inclusive.
    Route(Vec<AirportId>),
    /// Weather blocked the query before the search ran.
    Hazard(HazardSignal),
    /// Unknown endpoint or disconnected airports.
    Empty,
}

impl PathOutcome {
    pub fn route(&self) -> Option<&[AirportId]> {
        match self {
            PathOutcome::Route(steps) => Some(steps),
            _ => None,
        }
    }
}

/// Path outcome together with the overrides the search ran against.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSearch {
    pub outcome: PathOutcome,
    pub overrides: WeightOverrides,
}

/// Screen the query against live weather, then search the reweighted graph.
///
/// Unknown airports return [`PathOutcome::Empty`] without contacting the
/// weather provider. Weather failures propagate as errors.
pub fn find_shortest_path(
    graph: &RouteGraph,
    provider: &dyn WeatherProvider,
    reweighter: &WeatherReweighter,
    start: &str,
    goal: &str,
    is_retry: bool,
) -> Result<PathOutcome> {
    search(graph, provider, reweighter, start, goal, is_retry).map(|search| search.outcome)
}

/// Like [`find_shortest_path`], also returning the per-query overrides.
pub fn search(
    graph: &RouteGraph,
    provider: &dyn WeatherProvider,
    reweighter: &WeatherReweighter,
    start: &str,
    goal: &str,
    is_retry: bool,
) -> Result<RouteSearch> {
    if !graph.has_airport(start) || !graph.has_airport(goal) {
        debug!(start, goal, "query references an unknown airport");
        return Ok(RouteSearch {
            outcome: PathOutcome::Empty,
            overrides: WeightOverrides::new(),
        });
    }

    let reweighting = reweighter.reweight(graph, provider, start, goal, is_retry)?;
    if reweighting.hazard.is_blocking() {
        info!(start, goal, hazard = %reweighting.hazard, "route blocked by weather");
        return Ok(RouteSearch {
            outcome: PathOutcome::Hazard(reweighting.hazard),
            overrides: reweighting.overrides,
        });
    }

    let outcome = match find_route_dijkstra(graph, start, goal, &reweighting.overrides) {
        Some(steps) => PathOutcome::Route(steps),
        None => PathOutcome::Empty,
    };
    Ok(RouteSearch {
        outcome,
        overrides: reweighting.overrides,
    })
}

/// Run Dijkstra's algorithm using each connection's effective weight.
pub fn find_route_dijkstra(
    graph: &RouteGraph,
    start: &str,
    goal: &str,
    overrides: &WeightOverrides,
) -> Option<Vec<AirportId>> {
    if !graph.has_airport(start) || !graph.has_airport(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start.to_string()]);
    }

    let mut distances: HashMap<&str, f64> = HashMap::new();
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        if entry.node == goal {
            return Some(reconstruct_path(&parents, start, goal));
        }

        for connection in graph.connections_from(entry.node) {
            let Some(next) = connection.other_end(entry.node) else {
                continue;
            };

            let next_cost = current_distance + overrides.effective_weight(connection);
            if next_cost < *distances.get(next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                parents.insert(next, entry.node);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    None
}

/// Sum of effective weights along `path`, or `None` if a hop is not a
/// connection in `graph`.
pub fn route_cost(graph: &RouteGraph, path: &[AirportId], overrides: &WeightOverrides) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, hop| {
        graph
            .connection(&hop[0], &hop[1])
            .map(|connection| total + overrides.effective_weight(connection))
    })
}

fn reconstruct_path(parents: &HashMap<&str, &str>, start: &str, goal: &str) -> Vec<AirportId> {
    let mut path = vec![goal.to_string()];
    let mut current = goal;
    while current != start {
        match parents.get(current) {
            Some(&parent) => {
                path.push(parent.to_string());
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry<'a> {
    node: &'a str,
    cost: FloatOrd,
}

impl<'a> QueueEntry<'a> {
    fn new(node: &'a str, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKey;

    fn diamond() -> RouteGraph {
        let mut graph = RouteGraph::new();
        for (id, lat, lon) in [
            ("AAA", 0.0, 0.0),
            ("BBB", 1.0, 1.0),
            ("CCC", -1.0, 1.0),
            ("DDD", 0.0, 2.0),
            ("EEE", 40.0, 40.0),
        ] {
            graph.add_airport(id, lat, lon, id);
        }
        graph.add_connection("AAA", "BBB", 10.0);
        graph.add_connection("BBB", "DDD", 10.0);
        graph.add_connection("AAA", "CCC", 12.0);
        graph.add_connection("CCC", "DDD", 12.0);
        graph
    }

    #[test]
    fn picks_cheapest_route() {
        let graph = diamond();
        let path = find_route_dijkstra(&graph, "AAA", "DDD", &WeightOverrides::new()).unwrap();
        assert_eq!(path, vec!["AAA", "BBB", "DDD"]);
        assert_eq!(
            route_cost(&graph, &path, &WeightOverrides::new()),
            Some(20.0)
        );
    }

    #[test]
    fn overrides_change_the_route_without_touching_the_graph() {
        let graph = diamond();
        let mut overrides = WeightOverrides::new();
        overrides.scale(EdgeKey::new("AAA", "BBB"), 2.0);

        let path = find_route_dijkstra(&graph, "AAA", "DDD", &overrides).unwrap();
        assert_eq!(path, vec!["AAA", "CCC", "DDD"]);
        assert_eq!(graph.connection("AAA", "BBB").unwrap().distance_km, 10.0);

        let fresh = find_route_dijkstra(&graph, "AAA", "DDD", &WeightOverrides::new()).unwrap();
        assert_eq!(fresh, vec!["AAA", "BBB", "DDD"]);
    }

    #[test]
    fn connections_are_traversable_both_ways() {
        let graph = diamond();
        let path = find_route_dijkstra(&graph, "DDD", "AAA", &WeightOverrides::new()).unwrap();
        assert_eq!(path, vec!["DDD", "BBB", "AAA"]);
    }

    #[test]
    fn disconnected_or_unknown_airports_have_no_route() {
        let graph = diamond();
        assert!(find_route_dijkstra(&graph, "AAA", "EEE", &WeightOverrides::new()).is_none());
        assert!(find_route_dijkstra(&graph, "AAA", "ZZZ", &WeightOverrides::new()).is_none());
    }

    #[test]
    fn same_start_and_goal() {
        let graph = diamond();
        let path = find_route_dijkstra(&graph, "AAA", "AAA", &WeightOverrides::new()).unwrap();
        assert_eq!(path, vec!["AAA"]);
    }

    #[test]
    fn equal_cost_ties_are_deterministic() {
        let mut graph = diamond();
        graph.add_connection("AAA", "CCC", 10.0);
        graph.add_connection("CCC", "DDD", 10.0);

        let first = find_route_dijkstra(&graph, "AAA", "DDD", &WeightOverrides::new()).unwrap();
        for _ in 0..16 {
            let again = find_route_dijkstra(&graph, "AAA", "DDD", &WeightOverrides::new()).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn route_cost_rejects_non_adjacent_hops() {
        let graph = diamond();
        let path = vec!["AAA".to_string(), "DDD".to_string()];
        assert_eq!(route_cost(&graph, &path, &WeightOverrides::new()), None);
    }
}
