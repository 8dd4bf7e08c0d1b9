use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_sms::command::CommandParser;
use transit_sms::config::{Args, TransportMode};
use transit_sms::handler::{Collaborators, Handler};
use transit_sms::stations::StationIndex;
use transit_sms::transport::{AppState, run_console, serve};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let stations = match StationIndex::load(&args.stations) {
        Ok(stations) => stations,
        Err(e) => {
            error!(path = %args.stations.display(), error = %e, "Failed to load stations");
            return ExitCode::FAILURE;
        }
    };
    info!(count = stations.len(), "Loaded station names");

    let services = match Collaborators::from_credentials(&args.credentials()) {
        Ok(services) => services,
        Err(e) => {
            error!(error = %e, "Failed to create provider clients");
            return ExitCode::FAILURE;
        }
    };
    let handler = Handler::new(CommandParser::new(Arc::new(stations)), services);

    let result = match args.mode {
        TransportMode::Console => run_console(Arc::new(handler)).await,
        TransportMode::Http => serve(AppState::new(handler), args.listen).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Transport failed");
            ExitCode::FAILURE
        }
    }
}
