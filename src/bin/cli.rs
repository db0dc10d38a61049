//! Graft CLI - run migration commands against a project snapshot.

use clap::Parser;
use graft::cli::{self, Cli};
use graft::GraftConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = GraftConfig::load(&cli.config);

    // Logs go to stderr; stdout carries JSON envelopes and the MCP transport
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli::run(cli, config).await {
        Ok(Some(body)) => {
            match serde_json::to_string_pretty(&body) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
            if body["success"] == false {
                std::process::exit(1);
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
