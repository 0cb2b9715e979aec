//! Taxograph CLI: crawl species pages, serve the read API, show stats.
//!
//! Usage:
//!   taxograph crawl [--config path] [--db path] [--seed url]
//!   taxograph serve [--config path] [--db path] [--bind addr]
//!   taxograph stats [--config path] [--db path]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taxograph::config::{default_database_path, CONFIG_FILE_NAME};
use taxograph::server::{self, AppState};
use taxograph::{
    Crawler, HttpFetcher, IngestCoordinator, IngestSettings, OpenStore, SqliteStore,
    TaxographConfig, TaxonStore, UrlFilter,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "taxograph",
    version,
    about = "Taxonomic classification graph crawler and read API"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,
    /// Path to SQLite database file (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl from the seed URL and ingest every species chain found
    Crawl {
        /// Seed URL (overrides the config)
        #[arg(long)]
        seed: Option<String>,
    },
    /// Serve the read API
    Serve {
        /// Listen address (overrides the config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print node and edge counts
    Stats,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &TaxographConfig, db: Option<PathBuf>) -> Result<Arc<SqliteStore>, String> {
    let path = db
        .or_else(|| config.database.path.clone())
        .unwrap_or_else(default_database_path);
    let store = SqliteStore::open(&path, &config.graph.name)
        .map_err(|e| format!("Failed to open database '{}': {}", path.display(), e))?;
    Ok(Arc::new(store))
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start async runtime: {}", e))
}

fn cmd_crawl(config: &TaxographConfig, store: Arc<SqliteStore>, seed: Option<String>) -> i32 {
    let seed = seed.unwrap_or_else(|| config.crawler.seed_url.clone());
    let seed = match Url::parse(&seed) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: invalid seed URL '{}': {}", seed, e);
            return 1;
        }
    };

    let filter = match UrlFilter::new(
        config.crawler.allowed_domain.clone(),
        &config.crawler.url_filter,
        config.crawler.max_depth,
    ) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: invalid URL filter: {}", e);
            return 1;
        }
    };
    let fetcher = match HttpFetcher::new(&config.crawler.user_agent, config.crawler.request_timeout()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let coordinator = IngestCoordinator::new(store, config.graph.root_kingdom.clone()).with_settings(
        IngestSettings {
            max_attempts: config.ingest.max_attempts,
            retry_backoff: Duration::from_millis(config.ingest.retry_backoff_ms),
        },
    );
    let crawler = Crawler::new(Arc::new(fetcher), Arc::new(coordinator), filter)
        .with_parallelism(config.crawler.parallelism);

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match rt.block_on(crawler.run(seed)) {
        Ok(report) => {
            println!(
                "Visited {} pages, ingested {} chains ({} nodes, {} edges created)",
                report.pages_visited,
                report.chains_ingested,
                report.nodes_created,
                report.edges_created
            );
            0
        }
        Err(e) => {
            eprintln!("Error: crawl aborted: {}", e);
            2
        }
    }
}

fn cmd_serve(config: &TaxographConfig, store: Arc<SqliteStore>, bind: Option<String>) -> i32 {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let result = rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(&bind).await?;
        server::serve(listener, AppState::new(store)).await
    });
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: server on '{}' failed: {}", bind, e);
            1
        }
    }
}

fn cmd_stats(store: &SqliteStore) -> i32 {
    let stats = match store.stats() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    println!("Graph '{}'", store.graph_name());
    println!("{:<10}  {:>10}", "RANK", "NODES");
    println!("{}", "-".repeat(22));
    for (rank, count) in &stats.nodes_by_rank {
        println!("{:<10}  {:>10}", rank, count);
    }
    println!("{}", "-".repeat(22));
    println!("{:<10}  {:>10}", "total", stats.total_nodes());
    println!("{:<10}  {:>10}", "edges", stats.edges);
    0
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match TaxographConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let store = match open_store(&config, cli.db) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Crawl { seed } => cmd_crawl(&config, store, seed),
        Commands::Serve { bind } => cmd_serve(&config, store, bind),
        Commands::Stats => cmd_stats(&store),
    };
    std::process::exit(code);
}
