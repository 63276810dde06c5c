use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skyroute_cli::commands::airport::handle_airport_command;
use skyroute_cli::commands::route::{handle_route_command, RouteCommandArgs};
use skyroute_cli::output::{hazard_message, OutputFormat};
use skyroute_cli::terminal::ColorPalette;
use skyroute_lib::{DatasetPaths, Error as LibError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather-aware flight route planner")]
struct Cli {
    /// Airports CSV (name, id, latitude, longitude, ...).
    #[arg(long, env = "SKYROUTE_AIRPORTS_PATH", default_value = "datasets/airports.csv")]
    airports: PathBuf,

    /// Routes CSV in OpenFlights layout.
    #[arg(long, env = "SKYROUTE_ROUTES_PATH", default_value = "datasets/routes.csv")]
    routes: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a weather-aware route between two airports.
    Route {
        /// Departure airport id.
        #[arg(long = "from")]
        from: String,
        /// Arrival airport id.
        #[arg(long = "to")]
        to: String,
        /// Retry after a thunderstorm refusal.
        #[arg(long)]
        retry: bool,
        /// Serve this OpenWeatherMap JSON payload for every airport instead of live weather.
        #[arg(long, env = "SKYROUTE_WEATHER_FILE")]
        weather_file: Option<PathBuf>,
    },
    /// Show an airport and its direct connections.
    Airport {
        /// Airport id.
        id: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(&error),
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = DatasetPaths::new(cli.airports, cli.routes);

    match cli.command {
        Command::Route {
            from,
            to,
            retry,
            weather_file,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                retry,
                weather_file,
            };
            handle_route_command(&paths, &args, cli.format)
        }
        Command::Airport { id } => handle_airport_command(&paths, &id, cli.format),
    }
}

/// Print `error` and pick an exit code: 2 for no route, 3 for a weather
/// hazard, 4 for a weather outage, 1 otherwise.
fn report(error: &anyhow::Error) -> ExitCode {
    let p = ColorPalette::detect();
    match error.downcast_ref::<LibError>() {
        Some(LibError::HazardBlocked { hazard }) => {
            eprintln!("{}{}{}", p.red, hazard_message(*hazard), p.reset);
            if matches!(hazard, skyroute_lib::HazardSignal::Thunderstorm) {
                eprintln!("Re-run with --retry to fly through the thunderstorm alert.");
            }
            ExitCode::from(3)
        }
        Some(LibError::UnknownAirport { .. } | LibError::RouteNotFound { .. }) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(2)
        }
        Some(LibError::WeatherUnavailable { .. }) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(4)
        }
        _ => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
