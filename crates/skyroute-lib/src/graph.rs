use std::collections::HashMap;

use serde::Serialize;

use crate::geodesy::Coordinate;

/// IATA/ICAO-style airport identifier.
pub type AirportId = String;

/// Airport record held by the routing graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub id: AirportId,
    pub name: String,
    pub coordinate: Coordinate,
}

/// Undirected flight connection between two airports.
///
/// `departure`/`arrival` record the orientation of the route row that first
/// created the edge; the edge itself is traversable both ways.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub departure: AirportId,
    pub arrival: AirportId,
    pub distance_km: f64,
}

impl Connection {
    /// Key shared by both orientations of this connection.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(&self.departure, &self.arrival)
    }

    /// Endpoint opposite to `id`, if `id` is one of the endpoints.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.departure == id {
            Some(&self.arrival)
        } else if self.arrival == id {
            Some(&self.departure)
        } else {
            None
        }
    }
}

/// Unordered airport pair identifying a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(AirportId, AirportId);

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// Airports plus the undirected, distance-weighted connections between them.
///
/// Connection and adjacency storage keep insertion order so that searches over
/// a fixed dataset visit neighbours deterministically.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    airports: HashMap<AirportId, Airport>,
    connections: Vec<Connection>,
    index: HashMap<EdgeKey, usize>,
    adjacency: HashMap<AirportId, Vec<usize>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an airport, replacing any previous record with the same id.
    pub fn add_airport(&mut self, id: &str, latitude: f64, longitude: f64, name: &str) {
        self.airports.insert(
            id.to_string(),
            Airport {
                id: id.to_string(),
                name: name.to_string(),
                coordinate: Coordinate::new(latitude, longitude),
            },
        );
        self.adjacency.entry(id.to_string()).or_default();
    }

    /// Connect two known airports.
    ///
    /// Returns `false` without touching the graph when either endpoint is
    /// unknown or both ids are equal. A second connection for the same
    /// unordered pair replaces the stored weight.
    pub fn add_connection(&mut self, a: &str, b: &str, weight: f64) -> bool {
        if a == b || !self.has_airport(a) || !self.has_airport(b) {
            return false;
        }

        let key = EdgeKey::new(a, b);
        if let Some(&slot) = self.index.get(&key) {
            self.connections[slot].distance_km = weight;
            return true;
        }

        let slot = self.connections.len();
        self.connections.push(Connection {
            departure: a.to_string(),
            arrival: b.to_string(),
            distance_km: weight,
        });
        self.index.insert(key, slot);
        self.adjacency.entry(a.to_string()).or_default().push(slot);
        self.adjacency.entry(b.to_string()).or_default().push(slot);
        true
    }

    /// Connect two known airports weighted by their great-circle distance.
    pub fn add_route(&mut self, a: &str, b: &str) -> bool {
        let (Some(from), Some(to)) = (self.airports.get(a), self.airports.get(b)) else {
            return false;
        };
        let distance = from.coordinate.distance_to(&to.coordinate);
        self.add_connection(a, b, distance)
    }

    pub fn has_airport(&self, id: &str) -> bool {
        self.airports.contains_key(id)
    }

    pub fn airport(&self, id: &str) -> Option<&Airport> {
        self.airports.get(id)
    }

    pub fn airport_count(&self) -> usize {
        self.airports.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Iterate every connection in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Connection joining `a` and `b`, in either orientation.
    pub fn connection(&self, a: &str, b: &str) -> Option<&Connection> {
        self.index
            .get(&EdgeKey::new(a, b))
            .map(|&slot| &self.connections[slot])
    }

    /// Connections incident to `id`.
    pub fn connections_from<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.adjacency
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&slot| &self.connections[slot])
    }

    /// Connections that receive weather adjustments for a query.
    ///
    /// The origin matches on either end of a connection; the destination only
    /// matches on the arrival end.
    pub fn touched_connections<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |connection| {
            connection.departure == origin
                || connection.arrival == origin
                || connection.arrival == destination
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RouteGraph {
        let mut graph = RouteGraph::new();
        graph.add_airport("AAA", 0.0, 0.0, "Alpha");
        graph.add_airport("BBB", 0.0, 1.0, "Bravo");
        graph.add_airport("CCC", 1.0, 0.0, "Charlie");
        graph.add_connection("AAA", "BBB", 10.0);
        graph.add_connection("BBB", "CCC", 20.0);
        graph
    }

    #[test]
    fn dangling_connections_are_rejected() {
        let mut graph = triangle();
        assert!(!graph.add_connection("AAA", "ZZZ", 1.0));
        assert!(!graph.add_connection("ZZZ", "AAA", 1.0));
        assert!(!graph.add_route("AAA", "ZZZ"));
        assert_eq!(graph.connection_count(), 2);
        assert!(graph.connections_from("ZZZ").next().is_none());
    }

    #[test]
    fn duplicate_pair_replaces_weight() {
        let mut graph = triangle();
        assert!(graph.add_connection("BBB", "AAA", 42.0));
        assert_eq!(graph.connection_count(), 2);

        let connection = graph.connection("AAA", "BBB").unwrap();
        assert_eq!(connection.distance_km, 42.0);
        assert_eq!(connection.departure, "AAA", "first orientation is kept");
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut graph = triangle();
        assert!(!graph.add_connection("AAA", "AAA", 0.0));
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn airport_overwrite_keeps_connections() {
        let mut graph = triangle();
        graph.add_airport("AAA", 5.0, 5.0, "Alpha Renamed");
        assert_eq!(graph.airport_count(), 3);
        assert_eq!(graph.airport("AAA").unwrap().name, "Alpha Renamed");
        assert_eq!(graph.connections_from("AAA").count(), 1);
    }

    #[test]
    fn add_route_uses_great_circle_distance() {
        let mut graph = triangle();
        graph.add_route("AAA", "CCC");
        let distance = graph.connection("CCC", "AAA").unwrap().distance_km;
        assert!((distance - 111.195).abs() < 0.01);
    }

    #[test]
    fn touch_rule_matches_destination_only_on_arrival() {
        let mut graph = RouteGraph::new();
        graph.add_airport("ORG", 0.0, 0.0, "Origin");
        graph.add_airport("DST", 0.0, 2.0, "Destination");
        graph.add_airport("MID", 0.0, 1.0, "Middle");
        graph.add_airport("FAR", 5.0, 5.0, "Far");
        graph.add_connection("MID", "ORG", 1.0); // origin on arrival side
        graph.add_connection("MID", "DST", 1.0); // destination on arrival side
        graph.add_connection("DST", "FAR", 1.0); // destination on departure side
        graph.add_connection("MID", "FAR", 1.0); // untouched

        let touched: Vec<_> = graph
            .touched_connections("ORG", "DST")
            .map(Connection::key)
            .collect();
        assert_eq!(
            touched,
            vec![EdgeKey::new("MID", "ORG"), EdgeKey::new("MID", "DST")]
        );
    }
}
