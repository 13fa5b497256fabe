mod crawl;
mod export;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::crawl::CrawlArgs;

#[derive(Debug, Parser)]
#[command(name = "hkfood-cli")]
#[command(about = "Collect Hong Kong restaurant listings around search coordinates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl listings around each coordinate and export the deduplicated dataset
    Crawl(CrawlArgs),
    /// Check whether coordinate text parses to a usable search point
    Check {
        /// e.g. "114.1578,22.2842,Central" or "114.1578 22.2842"
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = hkfood_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Crawl(args) => crawl::run_crawl(&config, &args).await,
        Commands::Check { text } => check_coordinate(&config, &text),
    }
}

fn check_coordinate(config: &hkfood_core::AppConfig, text: &str) -> anyhow::Result<()> {
    match hkfood_core::parse_coordinate_text(text, &config.bounds) {
        Some(coordinate) => {
            println!("ok: {coordinate}");
            Ok(())
        }
        None => anyhow::bail!(
            "'{text}' is not a usable coordinate: expected \"longitude,latitude[,label]\" \
             inside longitude {}..={} and latitude {}..={}",
            config.bounds.min_longitude,
            config.bounds.max_longitude,
            config.bounds.min_latitude,
            config.bounds.max_latitude,
        ),
    }
}
