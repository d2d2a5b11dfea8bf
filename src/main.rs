use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use stagelog_ingest::apis::factory::{create_adapter, supported_venues};
use stagelog_ingest::catalog::{CatalogStore, InMemoryCatalog, JsonFileCatalog};
use stagelog_ingest::common::constants::CAVEAT_API;
use stagelog_ingest::config::{Config, RendererBackend, DEFAULT_CONFIG_PATH};
use stagelog_ingest::logging;
use stagelog_ingest::render::{FixtureRenderer, HttpRenderer, PageRenderer};
use stagelog_ingest::{Pipeline, PipelineOptions};

#[derive(Parser)]
#[command(name = "stagelog_ingest")]
#[command(about = "Scrape venue listings into the Stagelog performance catalog")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for rotated JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingestion pipeline for one venue
    Run {
        /// Identity recorded as the author of catalog writes
        #[arg(long)]
        actor: String,
        /// Venue adapter to run
        #[arg(long, default_value = CAVEAT_API)]
        venue: String,
        /// Parse a saved listing page instead of rendering the live site
        #[arg(long)]
        html_file: Option<PathBuf>,
        /// JSON catalog file (overrides pipeline.catalog_path)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List available venue adapters
    Venues,
}

fn build_renderer(config: &Config, html_file: Option<PathBuf>) -> anyhow::Result<Arc<dyn PageRenderer>> {
    if let Some(path) = html_file {
        let renderer = FixtureRenderer::from_file(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(Arc::new(renderer));
    }

    match config.renderer.backend {
        RendererBackend::Http => Ok(Arc::new(HttpRenderer::new())),
        #[cfg(feature = "browser")]
        RendererBackend::Chromium => Ok(Arc::new(stagelog_ingest::render::ChromiumRenderer::new())),
        #[cfg(not(feature = "browser"))]
        RendererBackend::Chromium => Err(anyhow!(
            "renderer.backend = \"chromium\" requires building with --features browser"
        )),
    }
}

fn build_store(config: &Config, catalog: Option<PathBuf>) -> Arc<dyn CatalogStore> {
    match catalog.or_else(|| config.pipeline.catalog_path.clone()) {
        Some(path) => {
            info!("Using JSON catalog at {}", path.display());
            Arc::new(JsonFileCatalog::new(path))
        }
        None => {
            warn!("No catalog path configured; results are kept in memory only");
            Arc::new(InMemoryCatalog::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(&cli.log_dir);

    match cli.command {
        Commands::Venues => {
            for name in supported_venues() {
                println!("{}", name);
            }
        }
        Commands::Run {
            actor,
            venue,
            html_file,
            catalog,
        } => {
            let config = Config::load_or_default(&cli.config)?;
            let adapter = create_adapter(&venue).ok_or_else(|| {
                anyhow!(
                    "unknown venue '{}'; available: {}",
                    venue,
                    supported_venues().join(", ")
                )
            })?;

            let renderer = build_renderer(&config, html_file)?;
            let store = build_store(&config, catalog);
            let pipeline =
                Pipeline::new(renderer, store).with_options(PipelineOptions::from(&config));

            let report = pipeline.run(adapter.as_ref(), &actor).await;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.errors.is_empty() {
                warn!("{} errors encountered during pipeline run", report.errors.len());
            }
        }
    }
    Ok(())
}
