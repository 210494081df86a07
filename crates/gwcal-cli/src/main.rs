mod cache;
mod dataset;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gwcal")]
#[command(about = "Fetch the gravel race calendar, geocode each event, and write a JSON snapshot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, extract, geocode and write the dataset (the default)
    Run(RunArgs),
    /// Inspect the geocode cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Calendar page to scrape (overrides GWCAL_SOURCE_URL)
    #[arg(long)]
    source_url: Option<String>,

    /// Snapshot path (overrides GWCAL_OUTPUT_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Geocode cache directory (overrides GWCAL_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Minimum delay between remote geocode calls (overrides GWCAL_GEOCODE_DELAY_MS)
    #[arg(long)]
    geocode_delay_ms: Option<u64>,

    /// Print the extracted events without geocoding or writing the snapshot
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut gwcal_core::AppConfig) {
        if let Some(url) = &self.source_url {
            config.source_url.clone_from(url);
        }
        if let Some(path) = &self.output {
            config.output_path.clone_from(path);
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir.clone_from(dir);
        }
        if let Some(ms) = self.geocode_delay_ms {
            config.geocode_delay_ms = ms;
        }
    }
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// List cached queries with their coordinates
    List {
        /// Geocode cache directory (overrides GWCAL_CACHE_DIR)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = gwcal_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    {
        Commands::Run(args) => {
            args.apply(&mut config);
            if args.dry_run {
                pipeline::run_dry(&config).await?;
            } else {
                pipeline::run_pipeline(&config).await?;
            }
        }
        Commands::Cache {
            command: CacheCommands::List { cache_dir },
        } => {
            let dir = cache_dir.unwrap_or_else(|| config.cache_dir.clone());
            cache::run_cache_list(&dir).await?;
        }
    }

    Ok(())
}
