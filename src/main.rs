mod config;
mod lidarr;
mod logging;
mod musicbrainz;
mod openai;
mod pipeline;
mod ports;

use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::Context;

use crate::{
    config::Config, lidarr::LidarrClient, logging::setup_logging,
    musicbrainz::MusicBrainzResolver, openai::OpenAiClient,
};

/// Recommend new artists based on the current Lidarr library and add them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OpenAI API key for the recommendation request
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_api_key: String,

    /// Lidarr API key
    #[arg(long, env = "LIDARR_API_KEY")]
    lidarr_api_key: String,

    /// Lidarr hostname, without a scheme
    #[arg(long, env = "LIDARR_HOST")]
    lidarr_host: String,

    /// Root folder Lidarr stores new artists under
    #[arg(long, env = "ROOT_FOLDER_PATH")]
    root_folder_path: String,

    /// Instruction text sent ahead of the artist list
    #[arg(long, env = "PROMPT")]
    prompt: String,

    /// Console log level (default: warn)
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: log::LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level)?;

    let config = Config {
        lidarr_host: args.lidarr_host,
        lidarr_api_key: args.lidarr_api_key,
        openai_api_key: args.openai_api_key,
        root_folder_path: args.root_folder_path,
        prompt: args.prompt,
    };

    log::debug!("Artist scout starting against {}", config.lidarr_host);

    // A hung request should not block the run forever; success-path
    // behavior is unchanged.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .wrap_err("Failed to build HTTP client")?;

    let library = LidarrClient::new(client.clone(), &config);
    let recommender = OpenAiClient::new(client.clone(), &config);
    let resolver = MusicBrainzResolver::new(client);

    pipeline::run(&library, &recommender, &resolver).await
}
