//! Weather-driven, query-scoped edge reweighting.
//!
//! Base connection weights are never modified. Each query instead produces a
//! [`WeightOverrides`] map of multipliers that the path search applies on top
//! of the stored distances.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::{Connection, EdgeKey, RouteGraph};
use crate::hazard::{
    temperature_multiplier, wind_multiplier, ConditionClass, HazardSignal, HazardTaxonomy,
    TORNADO_PENALTY_MULTIPLIER,
};
use crate::weather::{fetch_endpoints, WeatherProvider, WeatherSnapshot};

/// Per-query weight multipliers keyed by connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightOverrides {
    multipliers: HashMap<EdgeKey, f64>,
}

impl WeightOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiply the factor stored for `key` by `factor`.
    pub fn scale(&mut self, key: EdgeKey, factor: f64) {
        *self.multipliers.entry(key).or_insert(1.0) *= factor;
    }

    /// Combined multiplier for `key` (1.0 when untouched).
    pub fn multiplier(&self, key: &EdgeKey) -> f64 {
        self.multipliers.get(key).copied().unwrap_or(1.0)
    }

    /// Weight of `connection` as seen by this query.
    pub fn effective_weight(&self, connection: &Connection) -> f64 {
        connection.distance_km * self.multiplier(&connection.key())
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.multipliers.len()
    }
}

/// Result of screening a query against live weather.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reweighting {
    pub hazard: HazardSignal,
    pub overrides: WeightOverrides,
}

/// Applies weather penalties and hazard screening to a route query.
#[derive(Debug, Clone, Default)]
pub struct WeatherReweighter {
    taxonomy: HazardTaxonomy,
}

impl WeatherReweighter {
    pub fn new(taxonomy: HazardTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &HazardTaxonomy {
        &self.taxonomy
    }

    /// Fetch weather for both endpoints and derive the query's overrides.
    ///
    /// Both airports must exist in `graph`. Weather failures abort the query
    /// before any override is produced.
    pub fn reweight(
        &self,
        graph: &RouteGraph,
        provider: &dyn WeatherProvider,
        origin: &str,
        destination: &str,
        is_retry: bool,
    ) -> Result<Reweighting> {
        let origin_airport = graph.airport(origin).ok_or_else(|| Error::UnknownAirport {
            id: origin.to_string(),
        })?;
        let destination_airport =
            graph
                .airport(destination)
                .ok_or_else(|| Error::UnknownAirport {
                    id: destination.to_string(),
                })?;

        let (origin_wx, destination_wx) = fetch_endpoints(
            provider,
            origin_airport.coordinate,
            destination_airport.coordinate,
        )?;

        Ok(self.apply_weather(
            graph,
            origin,
            destination,
            &origin_wx,
            &destination_wx,
            is_retry,
        ))
    }

    /// Derive overrides from already-fetched weather.
    ///
    /// Thunderstorms block first attempts only; retries fall through to the
    /// regular penalties. A tornado at either endpoint penalizes every touched
    /// connection and then blocks the query.
    pub fn apply_weather(
        &self,
        graph: &RouteGraph,
        origin: &str,
        destination: &str,
        origin_wx: &WeatherSnapshot,
        destination_wx: &WeatherSnapshot,
        is_retry: bool,
    ) -> Reweighting {
        let origin_class = self.taxonomy.classify(origin_wx.condition_code);
        let destination_class = self.taxonomy.classify(destination_wx.condition_code);
        let mut overrides = WeightOverrides::new();

        let thunderstorm = origin_class == ConditionClass::Thunderstorm
            || destination_class == ConditionClass::Thunderstorm;
        if thunderstorm && !is_retry {
            warn!(origin, destination, "thunderstorm at route endpoint");
            return Reweighting {
                hazard: HazardSignal::Thunderstorm,
                overrides,
            };
        }

        if origin_class == ConditionClass::Tornado || destination_class == ConditionClass::Tornado
        {
            for connection in graph.touched_connections(origin, destination) {
                overrides.scale(connection.key(), TORNADO_PENALTY_MULTIPLIER);
            }
            warn!(
                origin,
                destination,
                penalized = overrides.len(),
                "tornado at route endpoint"
            );
            return Reweighting {
                hazard: HazardSignal::Tornado,
                overrides,
            };
        }

        let (Some(origin_airport), Some(destination_airport)) =
            (graph.airport(origin), graph.airport(destination))
        else {
            return Reweighting::default();
        };

        let bearing = origin_airport
            .coordinate
            .bearing_to(&destination_airport.coordinate);
        let wind = wind_multiplier(bearing, origin_wx.wind_direction_deg);
        let temperature = temperature_multiplier(origin_wx.temperature_k);
        let conditions = self.taxonomy.multiplier(origin_class);

        debug!(
            origin,
            destination,
            bearing,
            wind,
            temperature = temperature.unwrap_or(1.0),
            conditions = conditions.unwrap_or(1.0),
            "weather multipliers"
        );

        for connection in graph.touched_connections(origin, destination) {
            let key = connection.key();
            overrides.scale(key.clone(), wind);
            if let Some(factor) = temperature {
                overrides.scale(key.clone(), factor);
            }
            if let Some(factor) = conditions {
                overrides.scale(key, factor);
            }
        }

        Reweighting {
            hazard: HazardSignal::None,
            overrides,
        }
    }
}
