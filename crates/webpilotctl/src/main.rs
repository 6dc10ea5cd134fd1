//! webpilotctl - CLI entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;

use webpilotctl::cli::{Cli, Commands};
use webpilotctl::{commands, output};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Plan { text, json, date } => commands::plan(config_path, &text, json, date),
        Commands::Config { json } => commands::config(config_path, json),
        Commands::Check => commands::check(config_path),
    };

    if let Err(err) = result {
        output::display_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
