mod aggregate;
mod call;
mod cli;
mod error;
mod health;
mod logging;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use service_proxy::{GatewayConfig, ServiceRegistry};
use std::process;

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Health { json } => health::execute(cli.config, json),
        Commands::Call {
            service,
            path,
            method,
            query,
            body,
            timeout_ms,
            retries,
        } => call::execute(
            cli.config,
            call::CallArgs {
                service,
                path,
                method,
                query,
                body,
                timeout_ms,
                retries,
            },
        ),
        Commands::Aggregate { legs } => aggregate::execute(cli.config, legs),
    };

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        process::exit(1);
    }
}

/// Build the registry from a TOML file, or from `GATEWAY_*` environment variables.
pub fn load_registry(config: Option<&str>) -> error::Result<ServiceRegistry> {
    let config = match config {
        Some(path) => {
            tracing::debug!(path, "Loading gateway configuration file");
            GatewayConfig::load_from_file(path)?
        }
        None => {
            tracing::debug!("Loading gateway configuration from environment");
            GatewayConfig::from_env()?
        }
    };

    Ok(ServiceRegistry::from_config(&config)?)
}
