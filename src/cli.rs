use clap::Parser;
use serde::Serialize;

fn is_false(b: &bool) -> bool {
    !b
}

#[derive(Debug, Parser, Serialize)]
#[command(about = "Study jam leaderboard aggregated from public profile badges")]
pub struct Cli {
    /// Port to serve the leaderboard on
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Build the leaderboard once, print it as JSON and exit
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub once: bool,
}
