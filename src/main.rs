// src/main.rs
mod cli;
mod config;
mod edit;
mod encoding;
mod error;
mod interact;
mod listing;
mod models;
mod repository;
#[cfg(test)]
mod testing;
mod tui;

use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting passman-remote");

    let cli_args = cli::Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;

    let services = match cli::build_services(cli_args.api_url.clone()) {
        Ok(services) => services,
        Err(e) => {
            log::error!("Failed to set up services: {:#?}", e);
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    };

    match cli::handle_cli_command(cli_args.command, &services, &runtime) {
        Ok(should_run_tui) => {
            if should_run_tui {
                if let Err(e) = tui::run_tui(&services, runtime.handle().clone()) {
                    log::error!("Application TUI error: {:#?}", e);
                    eprintln!("Error: {}", e);
                    return Err(e.into());
                }
            } else {
                log::info!("CLI command processed.");
            }
        }
        Err(e) => {
            log::error!("Application failed: {:#?}", e);
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    }

    log::info!("passman-remote finished successfully.");
    Ok(())
}
