use jam_board::cli::Cli;
use jam_board::config::Settings;
use jam_board::server::{self, LeaderboardResponse};
use jam_board::service::LeaderboardService;

use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(&cli)?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    let service = LeaderboardService::from_settings(&settings)?;

    if settings.once {
        let (data, source) = service.leaderboard().await?;
        let body = serde_json::to_string_pretty(&LeaderboardResponse { source, data })?;
        println!("{body}");
        return Ok(());
    }

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Serving leaderboard on {addr}");

    axum::serve(listener, server::router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for shutdown signal. {e}");
    }
}
