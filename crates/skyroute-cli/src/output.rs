//! Output formatting for route plans and airport lookups.
//!
//! Renderers take any `Write` so tests can capture their output.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use skyroute_lib::{Airport, HazardSignal, RouteGraph, RoutePlan};

use crate::terminal::{format_with_separators, supports_unicode, ColorPalette};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Annotated route listing.
    #[default]
    Text,
    /// One airport id per line.
    Basic,
    /// Machine-readable JSON.
    Json,
}

#[derive(Serialize)]
struct RouteJson<'a> {
    route: &'a [String],
    hops: usize,
    distance_km: f64,
    weighted_cost: f64,
    retry: bool,
}

#[derive(Serialize)]
struct AirportJson<'a> {
    #[serde(flatten)]
    airport: &'a Airport,
    connections: Vec<ConnectionJson<'a>>,
}

#[derive(Serialize)]
struct ConnectionJson<'a> {
    airport: &'a str,
    distance_km: f64,
}

/// Render a planned route.
pub fn render_plan<W: Write>(
    out: &mut W,
    graph: &RouteGraph,
    plan: &RoutePlan,
    retry: bool,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let view = RouteJson {
                route: &plan.steps,
                hops: plan.hop_count(),
                distance_km: plan.distance_km,
                weighted_cost: plan.weighted_cost,
                retry,
            };
            serde_json::to_writer_pretty(&mut *out, &view)?;
            writeln!(out)
        }
        OutputFormat::Basic => {
            for id in &plan.steps {
                writeln!(out, "{}", id)?;
            }
            Ok(())
        }
        OutputFormat::Text => render_plan_text(out, graph, plan, palette),
    }
}

fn render_plan_text<W: Write>(
    out: &mut W,
    graph: &RouteGraph,
    plan: &RoutePlan,
    p: ColorPalette,
) -> io::Result<()> {
    let arrow = if supports_unicode() { "→" } else { "->" };
    writeln!(
        out,
        "Route from {}{}{} to {}{}{} ({} flights):",
        p.white_bold,
        plan.start,
        p.reset,
        p.white_bold,
        plan.goal,
        p.reset,
        plan.hop_count()
    )?;

    let last = plan.steps.len().saturating_sub(1);
    for (i, id) in plan.steps.iter().enumerate() {
        let tag = match i {
            0 => format!("{}STRT{} ", p.tag_start, p.reset),
            _ if i == last => format!("{}GOAL{} ", p.tag_goal, p.reset),
            _ => format!("{}  {}  ", p.gray, arrow),
        };
        let name = graph
            .airport(id)
            .map(|airport| airport.name.as_str())
            .unwrap_or("<unknown>");
        let hop = plan
            .steps
            .get(i + 1)
            .and_then(|next| graph.connection(id, next))
            .map(|connection| {
                format!(
                    " {}({} km){}",
                    p.green,
                    format_with_separators(connection.distance_km.round() as u64),
                    p.reset
                )
            })
            .unwrap_or_default();
        writeln!(
            out,
            "{}{}{}{} {}{}{}{}",
            tag, p.reset, p.white_bold, id, p.gray, name, p.reset, hop
        )?;
    }

    writeln!(
        out,
        "\nGreat-circle distance: {}{} km{}",
        p.green,
        format_with_separators(plan.distance_km.round() as u64),
        p.reset
    )?;
    writeln!(
        out,
        "Weather-adjusted cost: {}{:.1}{}",
        p.yellow, plan.weighted_cost, p.reset
    )
}

/// Message shown when weather refuses a query.
pub fn hazard_message(hazard: HazardSignal) -> String {
    format!("No Flight Available Because of {}", hazard)
}

/// Render an airport and its direct connections, nearest first.
pub fn render_airport<W: Write>(
    out: &mut W,
    graph: &RouteGraph,
    airport: &Airport,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    let mut connections: Vec<ConnectionJson<'_>> = graph
        .connections_from(&airport.id)
        .filter_map(|connection| {
            connection
                .other_end(&airport.id)
                .map(|other| ConnectionJson {
                    airport: other,
                    distance_km: connection.distance_km,
                })
        })
        .collect();
    connections.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.airport.cmp(b.airport))
    });

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(
                &mut *out,
                &AirportJson {
                    airport,
                    connections,
                },
            )?;
            writeln!(out)
        }
        OutputFormat::Basic => {
            for connection in &connections {
                writeln!(out, "{}", connection.airport)?;
            }
            Ok(())
        }
        OutputFormat::Text => {
            let p = palette;
            writeln!(
                out,
                "{}{}{} {}",
                p.white_bold, airport.id, p.reset, airport.name
            )?;
            writeln!(
                out,
                "{}lat {:.4}, lon {:.4}{}",
                p.gray, airport.coordinate.latitude, airport.coordinate.longitude, p.reset
            )?;
            if connections.is_empty() {
                return writeln!(out, "No direct connections.");
            }
            writeln!(out, "Direct connections ({}):", connections.len())?;
            for connection in &connections {
                writeln!(
                    out,
                    " - {}{}{} {}({} km){}",
                    p.white_bold,
                    connection.airport,
                    p.reset,
                    p.green,
                    format_with_separators(connection.distance_km.round() as u64),
                    p.reset
                )?;
            }
            Ok(())
        }
    }
}
