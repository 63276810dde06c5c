//! Airport lookup command handler.

use std::io;

use anyhow::{Context, Result};

use skyroute_lib::{load_route_graph, DatasetPaths, Error as LibError};

use crate::output::{render_airport, OutputFormat};
use crate::terminal::ColorPalette;

/// Print an airport's details and its direct connections.
pub fn handle_airport_command(paths: &DatasetPaths, id: &str, format: OutputFormat) -> Result<()> {
    let (graph, _) = load_route_graph(paths).with_context(|| {
        format!(
            "failed to load dataset from {} and {}",
            paths.airports.display(),
            paths.routes.display()
        )
    })?;

    let id = id.trim();
    let airport = graph
        .airport(id)
        .ok_or_else(|| LibError::UnknownAirport { id: id.to_string() })?;

    let stdout = io::stdout();
    render_airport(
        &mut stdout.lock(),
        &graph,
        airport,
        format,
        ColorPalette::detect(),
    )?;
    Ok(())
}
