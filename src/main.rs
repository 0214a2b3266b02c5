//! Main entry point for the realestate-data-downloader CLI

use clap::Parser;
use realestate_data_downloader::cli::{Cli, Commands};
use realestate_data_downloader::shutdown::HaltSignal;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("realestate_data_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    // Ctrl+C requests a halt at the next period boundary so no partially
    // written spreadsheet or unsaved progress is left behind.
    let halt = HaltSignal::shared();
    tokio::spawn({
        let halt = halt.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing the current period, then stopping");
                halt.request_halt();
            }
        }
    });

    let result = match cli.command {
        Commands::Download(ref args) => match args.execute(halt.clone()).await {
            Ok(summary) => {
                // A quota halt is a normal ending: the next scheduled run
                // resumes from the persisted progress.
                println!("{summary}");
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!(e)),
        },
        Commands::Status(ref cmd) => cmd.execute().map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
