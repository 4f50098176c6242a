//! Lookout - command-line front-end.
//!
//! Wires configuration, the result cache, the HTTP client and the system
//! resolver into an [`Orchestrator`] and prints results as JSON.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use lookout_cache::{CacheStore, SqliteCache};
use lookout_core::{AppConfig, QueryType};
use lookout_fetch::{ReqwestFetcher, SystemResolver};
use lookout_scanner::{extract_images, Orchestrator, ProbeContext, ProbeRegistry};
use std::sync::Arc;
use tracing::info;

/// Filter used while the configuration itself is loading.
const BOOTSTRAP_FILTER: &str = "info";

/// `RUST_LOG` when set, otherwise `default_filter`.
fn env_filter(default_filter: &str) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

fn subscriber<W>(
    filter: tracing_subscriber::EnvFilter,
    writer: W,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::{fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(writer))
        .with(filter)
}

/// Initialize tracing with `RUST_LOG`, falling back to the configured filter.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::util::SubscriberInitExt;

    subscriber(env_filter(default_filter), std::io::stderr).init();
}

/// Load the configuration, logging through `bootstrap` since the global
/// subscriber depends on the result.
fn load_config<S>(cli: &Cli, bootstrap: S) -> Result<AppConfig>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(bootstrap, || read_config(cli))
}

fn read_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    config.apply_env_overrides();
    if cli.no_cache {
        config.cache.enabled = false;
    }
    config.validate()?;
    Ok(config)
}

async fn open_cache(config: &AppConfig) -> Result<Option<Arc<dyn CacheStore>>> {
    if !config.cache.enabled {
        return Ok(None);
    }
    let path = config.cache_db_path()?;
    let cache = SqliteCache::open(&path, config.cache.ttl())
        .await
        .with_context(|| format!("failed to open cache at {}", path.display()))?;
    info!(path = %path.display(), "Cache ready");
    Ok(Some(Arc::new(cache)))
}

fn build_orchestrator(
    config: &AppConfig,
    cache: Option<Arc<dyn CacheStore>>,
) -> Result<Orchestrator> {
    let fetcher = ReqwestFetcher::from_config(&config.probing)?;
    let context = ProbeContext::new(Arc::new(fetcher), Arc::new(SystemResolver));
    Ok(Orchestrator::from_config(
        &config.probing,
        Arc::new(ProbeRegistry::with_defaults()),
        context,
        cache,
    ))
}

async fn lookup(
    config: &AppConfig,
    query_type: QueryType,
    query: &str,
    refresh: bool,
    images_only: bool,
) -> Result<()> {
    let cache = open_cache(config).await?;
    let orchestrator = build_orchestrator(config, cache)?;

    let result = if refresh {
        orchestrator.resolve_fresh(query_type, query).await
    } else {
        orchestrator.resolve(query_type, query).await
    };

    let output = if images_only {
        serde_json::to_string_pretty(&extract_images(&result))?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{output}");

    if let Some(error) = &result.error {
        anyhow::bail!("{error}");
    }
    Ok(())
}

async fn clear(config: &AppConfig, query_type: Option<QueryType>) -> Result<()> {
    let Some(cache) = open_cache(config).await? else {
        println!("cache disabled");
        return Ok(());
    };
    let removed = cache.clear(query_type).await;
    info!(removed, ?query_type, "Cache cleared");
    println!("{removed}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let bootstrap = subscriber(env_filter(BOOTSTRAP_FILTER), std::io::stderr);
    let config = load_config(&cli, bootstrap)?;

    init_tracing(&config.logging.filter);
    info!("Starting Lookout v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Lookup {
            query_type,
            query,
            refresh,
            images,
        } => lookup(&config, query_type, &query, refresh, images).await,
        Commands::Clear { query_type } => clear(&config, query_type).await,
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
