//! Current-weather lookups for airport coordinates.
//!
//! [`WeatherProvider`] is the seam between route planning and the outside
//! world. [`OpenWeatherMapProvider`] talks to the OpenWeatherMap
//! current-weather API over blocking HTTP; [`StaticWeatherProvider`] serves
//! fixed snapshots for offline runs and tests.

use std::env;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

/// Default endpoint for OpenWeatherMap's current-weather API.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Default upper bound for a single weather request.
pub const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(5);

const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
const BASE_URL_ENV: &str = "OPENWEATHER_BASE_URL";
const TIMEOUT_ENV: &str = "WEATHER_TIMEOUT_SECS";

/// Current conditions at a single coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Provider condition code (see [`crate::hazard::HazardTaxonomy`]).
    pub condition_code: u16,
    /// Direction the wind blows from, in degrees.
    pub wind_direction_deg: f64,
    pub wind_speed_ms: f64,
    pub temperature_k: f64,
}

impl WeatherSnapshot {
    /// Clear sky, still air, 15 °C.
    pub fn calm() -> Self {
        Self {
            condition_code: 800,
            wind_direction_deg: 0.0,
            wind_speed_ms: 0.0,
            temperature_k: 288.15,
        }
    }

    pub fn with_condition(mut self, code: u16) -> Self {
        self.condition_code = code;
        self
    }

    pub fn with_wind(mut self, direction_deg: f64, speed_ms: f64) -> Self {
        self.wind_direction_deg = direction_deg;
        self.wind_speed_ms = speed_ms;
        self
    }

    pub fn with_temperature(mut self, temperature_k: f64) -> Self {
        self.temperature_k = temperature_k;
        self
    }
}

/// Source of current weather conditions.
pub trait WeatherProvider: Send + Sync {
    /// Fetch the current conditions at `coordinate`.
    ///
    /// Any transport failure, timeout, or unparseable payload must surface as
    /// [`Error::WeatherUnavailable`].
    fn current(&self, coordinate: Coordinate) -> Result<WeatherSnapshot>;
}

/// Fetch weather for both query endpoints concurrently.
///
/// Both requests always run to completion; the first error (origin before
/// destination) is returned if either failed.
pub fn fetch_endpoints(
    provider: &dyn WeatherProvider,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<(WeatherSnapshot, WeatherSnapshot)> {
    let (origin_result, destination_result) = thread::scope(|scope| {
        let destination_handle = scope.spawn(|| provider.current(destination));
        let origin_result = provider.current(origin);
        let destination_result = destination_handle
            .join()
            .unwrap_or_else(|_| Err(Error::weather_unavailable("weather fetch panicked")));
        (origin_result, destination_result)
    });

    Ok((origin_result?, destination_result?))
}

/// Settings for [`OpenWeatherMapProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_WEATHER_TIMEOUT,
        }
    }
}

impl WeatherConfig {
    /// Create configuration from environment variables.
    ///
    /// - `OPENWEATHER_API_KEY`: API key (default: empty)
    /// - `OPENWEATHER_BASE_URL`: endpoint override
    /// - `WEATHER_TIMEOUT_SECS`: request timeout (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            base_url: env::var(BASE_URL_ENV).unwrap_or(defaults.base_url),
            api_key: env::var(API_KEY_ENV).unwrap_or(defaults.api_key),
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

/// Blocking client for OpenWeatherMap's current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    client: Client,
    config: WeatherConfig,
}

impl OpenWeatherMapProvider {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|err| Error::weather_unavailable(format!("failed to build client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }
}

impl WeatherProvider for OpenWeatherMapProvider {
    fn current(&self, coordinate: Coordinate) -> Result<WeatherSnapshot> {
        tracing::debug!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "fetching current weather"
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("appid", self.config.api_key.clone()),
            ])
            .send()
            .map_err(|err| transport_error(coordinate, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::weather_unavailable(format!(
                "provider returned {status} for ({}, {})",
                coordinate.latitude, coordinate.longitude
            )));
        }

        let body = response
            .text()
            .map_err(|err| transport_error(coordinate, err))?;
        parse_current_weather(&body)
    }
}

fn transport_error(coordinate: Coordinate, err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() { "timed out" } else { "failed" };
    Error::weather_unavailable(format!(
        "request for ({}, {}) {kind}: {err}",
        coordinate.latitude, coordinate.longitude
    ))
}

fn user_agent() -> String {
    format!("skyroute-lib/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    weather: Vec<ConditionEntry>,
    main: MainReadings,
    #[serde(default)]
    wind: WindReadings,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    id: u16,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WindReadings {
    #[serde(default)]
    speed: f64,
    // Omitted by the provider in calm air.
    #[serde(default)]
    deg: f64,
}

/// Parse an OpenWeatherMap current-weather payload.
pub fn parse_current_weather(body: &str) -> Result<WeatherSnapshot> {
    let payload: CurrentWeatherResponse = serde_json::from_str(body)
        .map_err(|err| Error::weather_unavailable(format!("malformed weather payload: {err}")))?;

    let condition = payload
        .weather
        .first()
        .ok_or_else(|| Error::weather_unavailable("weather payload has no conditions"))?;

    Ok(WeatherSnapshot {
        condition_code: condition.id,
        wind_direction_deg: payload.wind.deg,
        wind_speed_ms: payload.wind.speed,
        temperature_k: payload.main.temp,
    })
}

/// Provider returning fixed snapshots, optionally varied per coordinate.
#[derive(Debug, Clone)]
pub struct StaticWeatherProvider {
    default: WeatherSnapshot,
    overrides: Vec<(Coordinate, WeatherSnapshot)>,
}

impl StaticWeatherProvider {
    pub fn new(default: WeatherSnapshot) -> Self {
        Self {
            default,
            overrides: Vec::new(),
        }
    }

    pub fn calm() -> Self {
        Self::new(WeatherSnapshot::calm())
    }

    /// Serve `snapshot` for one specific coordinate.
    pub fn with_override(mut self, coordinate: Coordinate, snapshot: WeatherSnapshot) -> Self {
        self.overrides.push((coordinate, snapshot));
        self
    }

    /// Serve the conditions from an OpenWeatherMap-shaped JSON file everywhere.
    pub fn from_payload_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatasetNotFound {
                path: path.to_path_buf(),
            });
        }
        let body = fs::read_to_string(path)?;
        Ok(Self::new(parse_current_weather(&body)?))
    }
}

impl WeatherProvider for StaticWeatherProvider {
    fn current(&self, coordinate: Coordinate) -> Result<WeatherSnapshot> {
        Ok(self
            .overrides
            .iter()
            .find(|(candidate, _)| *candidate == coordinate)
            .map(|(_, snapshot)| *snapshot)
            .unwrap_or(self.default))
    }
}
