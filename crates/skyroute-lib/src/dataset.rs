//! CSV ingestion for airport coordinates and scheduled routes.
//!
//! Airports file (header row): `name, id, latitude, longitude, ...`.
//! Routes file (header row, OpenFlights layout): the departure airport id is
//! column 2 and the arrival airport id column 4.

use std::env;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::RouteGraph;

const AIRPORTS_ENV: &str = "SKYROUTE_AIRPORTS_PATH";
const ROUTES_ENV: &str = "SKYROUTE_ROUTES_PATH";
const DEFAULT_AIRPORTS_PATH: &str = "datasets/airports.csv";
const DEFAULT_ROUTES_PATH: &str = "datasets/routes.csv";

const AIRPORT_NAME_COLUMN: usize = 0;
const AIRPORT_ID_COLUMN: usize = 1;
const AIRPORT_LAT_COLUMN: usize = 2;
const AIRPORT_LON_COLUMN: usize = 3;
const ROUTE_DEPARTURE_COLUMN: usize = 2;
const ROUTE_ARRIVAL_COLUMN: usize = 4;

/// Locations of the two dataset files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub airports: PathBuf,
    pub routes: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            airports: PathBuf::from(DEFAULT_AIRPORTS_PATH),
            routes: PathBuf::from(DEFAULT_ROUTES_PATH),
        }
    }
}

impl DatasetPaths {
    pub fn new(airports: impl Into<PathBuf>, routes: impl Into<PathBuf>) -> Self {
        Self {
            airports: airports.into(),
            routes: routes.into(),
        }
    }

    /// Resolve paths from `SKYROUTE_AIRPORTS_PATH` / `SKYROUTE_ROUTES_PATH`,
    /// falling back to `datasets/airports.csv` and `datasets/routes.csv`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            airports: env::var_os(AIRPORTS_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.airports),
            routes: env::var_os(ROUTES_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.routes),
        }
    }
}

/// One airport row.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One route row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub departure: String,
    pub arrival: String,
}

/// Row counts gathered while building a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub airport_rows: usize,
    pub airport_rows_skipped: usize,
    pub route_rows: usize,
    pub route_rows_skipped: usize,
    pub routes_dropped_unknown_airport: usize,
}

/// Load both dataset files and build the routing graph.
pub fn load_route_graph(paths: &DatasetPaths) -> Result<(RouteGraph, IngestReport)> {
    let (airports, airports_skipped) = load_airports(&paths.airports)?;
    let (routes, routes_skipped) = load_routes(&paths.routes)?;

    let (graph, mut report) = build_route_graph(&airports, &routes);
    report.airport_rows_skipped = airports_skipped;
    report.route_rows_skipped = routes_skipped;

    info!(
        airports = graph.airport_count(),
        connections = graph.connection_count(),
        dropped_routes = report.routes_dropped_unknown_airport,
        "route graph loaded"
    );
    Ok((graph, report))
}

/// Build a graph from parsed records.
///
/// Later airport records replace earlier ones with the same id. Routes whose
/// endpoints are not both known airports are dropped.
pub fn build_route_graph(
    airports: &[AirportRecord],
    routes: &[RouteRecord],
) -> (RouteGraph, IngestReport) {
    let mut graph = RouteGraph::new();
    let mut report = IngestReport {
        airport_rows: airports.len(),
        route_rows: routes.len(),
        ..IngestReport::default()
    };

    for airport in airports {
        graph.add_airport(&airport.id, airport.latitude, airport.longitude, &airport.name);
    }

    for route in routes {
        if !graph.has_airport(&route.departure) || !graph.has_airport(&route.arrival) {
            report.routes_dropped_unknown_airport += 1;
            continue;
        }
        graph.add_route(&route.departure, &route.arrival);
    }

    (graph, report)
}

/// Parse the airports file, returning the records and the number of rows
/// skipped for missing columns or unparseable coordinates.
pub fn load_airports(path: &Path) -> Result<(Vec<AirportRecord>, usize)> {
    let mut records = Vec::new();
    let mut skipped = 0;

    for (line, row) in open_reader(path)?.records().enumerate() {
        let row = row?;
        match parse_airport(&row) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                warn!(path = %path.display(), line = line + 2, "skipping malformed airport row");
            }
        }
    }

    debug!(path = %path.display(), rows = records.len(), skipped, "airports parsed");
    Ok((records, skipped))
}

/// Parse the routes file, returning the records and the number of rows
/// skipped for missing columns.
pub fn load_routes(path: &Path) -> Result<(Vec<RouteRecord>, usize)> {
    let mut records = Vec::new();
    let mut skipped = 0;

    for row in open_reader(path)?.records() {
        let row = row?;
        match (
            non_empty(&row, ROUTE_DEPARTURE_COLUMN),
            non_empty(&row, ROUTE_ARRIVAL_COLUMN),
        ) {
            (Some(departure), Some(arrival)) => records.push(RouteRecord {
                departure: departure.to_string(),
                arrival: arrival.to_string(),
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped route rows with missing airports");
    }
    Ok((records, skipped))
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    if reader.headers()?.is_empty() {
        return Err(Error::InvalidDataset {
            path: path.to_path_buf(),
            message: "missing header row".to_string(),
        });
    }
    Ok(reader)
}

fn parse_airport(row: &StringRecord) -> Option<AirportRecord> {
    let id = non_empty(row, AIRPORT_ID_COLUMN)?;
    let latitude: f64 = row.get(AIRPORT_LAT_COLUMN)?.parse().ok()?;
    let longitude: f64 = row.get(AIRPORT_LON_COLUMN)?.parse().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(AirportRecord {
        id: id.to_string(),
        name: row.get(AIRPORT_NAME_COLUMN).unwrap_or_default().to_string(),
        latitude,
        longitude,
    })
}

fn non_empty(row: &StringRecord, column: usize) -> Option<&str> {
    row.get(column).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn parses_airports_and_skips_bad_rows() {
        let file = csv_file(
            "Name,IATA,Latitude,Longitude\n\
             Heathrow,LHR,51.4706,-0.461941\n\
             Broken,BRK,not-a-number,0.0\n\
             ,,,\n\
             Far North,NTH,95.0,0.0\n\
             Kennedy,JFK,40.6398,-73.7789\n",
        );

        let (records, skipped) = load_airports(file.path()).expect("airports parse");
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 3);
        assert_eq!(records[0].id, "LHR");
        assert_eq!(records[0].name, "Heathrow");
        assert_eq!(records[1].longitude, -73.7789);
    }

    #[test]
    fn parses_openflights_route_columns() {
        let file = csv_file(
            "airline,airline_id,source,source_id,destination,destination_id,codeshare,stops,equipment\n\
             BA,1355,LHR,507,JFK,3797,,0,744\n\
             BA,1355,LHR,507\n",
        );

        let (records, skipped) = load_routes(file.path()).expect("routes parse");
        assert_eq!(
            records,
            vec![RouteRecord {
                departure: "LHR".into(),
                arrival: "JFK".into()
            }]
        );
        assert_eq!(skipped, 1);
    }

    #[test]
    fn build_drops_routes_to_unknown_airports() {
        let airports = vec![
            AirportRecord {
                id: "AAA".into(),
                name: "Alpha".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            AirportRecord {
                id: "BBB".into(),
                name: "Bravo".into(),
                latitude: 0.0,
                longitude: 1.0,
            },
        ];
        let routes = vec![
            RouteRecord {
                departure: "AAA".into(),
                arrival: "BBB".into(),
            },
            RouteRecord {
                departure: "BBB".into(),
                arrival: "AAA".into(),
            },
            RouteRecord {
                departure: "AAA".into(),
                arrival: "ZZZ".into(),
            },
        ];

        let (graph, report) = build_route_graph(&airports, &routes);
        assert_eq!(graph.connection_count(), 1, "duplicate pair collapses");
        assert_eq!(report.routes_dropped_unknown_airport, 1);
        assert!(!graph.has_airport("ZZZ"));
    }

    #[test]
    fn later_airport_rows_win() {
        let airports = vec![
            AirportRecord {
                id: "AAA".into(),
                name: "First".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            AirportRecord {
                id: "AAA".into(),
                name: "Second".into(),
                latitude: 1.0,
                longitude: 1.0,
            },
        ];
        let (graph, _) = build_route_graph(&airports, &[]);
        assert_eq!(graph.airport_count(), 1);
        assert_eq!(graph.airport("AAA").unwrap().name, "Second");
    }

    #[test]
    fn missing_file_is_dataset_not_found() {
        let error = load_airports(Path::new("/nonexistent/airports.csv")).expect_err("missing");
        assert!(matches!(error, Error::DatasetNotFound { .. }));
    }
}
