//! Route command handler.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use skyroute_lib::{
    load_route_graph, plan_route, DatasetPaths, OpenWeatherMapProvider, RouteRequest,
    StaticWeatherProvider, WeatherConfig, WeatherProvider,
};

use crate::output::{render_plan, OutputFormat};
use crate::terminal::ColorPalette;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Departure airport id.
    pub from: String,
    /// Arrival airport id.
    pub to: String,
    /// Repeated attempt after a thunderstorm refusal.
    pub retry: bool,
    /// OpenWeatherMap-shaped payload served for every airport instead of live weather.
    pub weather_file: Option<PathBuf>,
}

impl RouteCommandArgs {
    pub fn to_request(&self) -> RouteRequest {
        let request = RouteRequest::new(self.from.trim(), self.to.trim());
        if self.retry {
            request.retry()
        } else {
            request
        }
    }
}

/// Build the weather provider for this invocation.
pub fn weather_provider(weather_file: Option<&PathBuf>) -> Result<Box<dyn WeatherProvider>> {
    match weather_file {
        Some(path) => {
            debug!(path = %path.display(), "using fixed weather payload");
            let provider = StaticWeatherProvider::from_payload_file(path)
                .with_context(|| format!("failed to read weather payload {}", path.display()))?;
            Ok(Box::new(provider))
        }
        None => {
            let provider = OpenWeatherMapProvider::new(WeatherConfig::from_env())
                .context("failed to create weather client")?;
            Ok(Box::new(provider))
        }
    }
}

/// Plan a route and print it to stdout.
///
/// Library errors are passed through unchanged (wrapped in `anyhow`) so the
/// caller can pick an exit code per failure kind.
pub fn handle_route_command(
    paths: &DatasetPaths,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let (graph, report) = load_route_graph(paths).with_context(|| {
        format!(
            "failed to load dataset from {} and {}",
            paths.airports.display(),
            paths.routes.display()
        )
    })?;
    debug!(?report, "dataset loaded");

    let provider = weather_provider(args.weather_file.as_ref())?;
    let plan = plan_route(&graph, provider.as_ref(), &args.to_request())?;

    let stdout = io::stdout();
    render_plan(
        &mut stdout.lock(),
        &graph,
        &plan,
        args.retry,
        format,
        ColorPalette::detect(),
    )?;
    Ok(())
}
