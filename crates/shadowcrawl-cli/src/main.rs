mod crawl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shadowcrawl")]
#[command(about = "Fingerprint storefronts and extract their product catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the stores listed in the stores file and print records as JSON lines
    Crawl {
        /// Stores file to read instead of `SHADOWCRAWL_STORES_PATH`
        #[arg(long)]
        stores: Option<PathBuf>,
        /// Crawl only the store with this slug
        #[arg(long)]
        store: Option<String>,
        /// List the stores that would be crawled without making requests
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Detect which platform powers a single storefront
    Fingerprint {
        /// Storefront URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = shadowcrawl_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Some(Commands::Crawl {
            stores,
            store,
            dry_run,
        }) => {
            crawl::run_crawl(&config, stores.as_deref(), store.as_deref(), dry_run).await?;
        }
        Some(Commands::Fingerprint { url }) => {
            crawl::run_fingerprint(&config, &url).await?;
        }
        None => println!("shadowcrawl: no command given, see `shadowcrawl --help`"),
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only the record stream.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
