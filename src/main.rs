use clap::Parser;
use dexsim_api::{AppState, RestApi};
use dexsim_core::Distance;
use dexsim_similarity::{EngineConfig, Family};
use dexsim_storage::{DataSources, DataStore};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Combined vector similarity search over the Pokémon catalog
#[derive(Parser, Debug)]
#[command(name = "dexsim")]
#[command(about = "Find similar Pokémon by weighted attributes and embeddings", long_about = None)]
struct Args {
    /// Catalog feed (JSON array of entity records)
    #[arg(long, default_value = "./data/pokemon.json")]
    catalog: PathBuf,

    /// Image embedding feed (JSON array of {name, vector})
    #[arg(long)]
    image_vectors: Option<PathBuf>,

    /// Text embedding feed (JSON array of {name, vector, genus?})
    #[arg(long)]
    text_vectors: Option<PathBuf>,

    /// Normalization constants; derived from the catalog when omitted
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Required image embedding width
    #[arg(long)]
    image_dim: Option<usize>,

    /// Required text embedding width
    #[arg(long)]
    text_dim: Option<usize>,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Composite indexes kept for reuse (0 disables the cache)
    #[arg(long, default_value_t = 0)]
    cache_capacity: usize,

    /// Drop the query entity from its own results
    #[arg(long)]
    exclude_self: bool,

    /// Distance of the single-family indexes (euclidean or cosine)
    #[arg(long, default_value = "euclidean")]
    family_distance: Distance,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting dexsim v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("HTTP API port: {}", args.http_port);

    let sources = DataSources {
        catalog: args.catalog,
        image_vectors: args.image_vectors,
        text_vectors: args.text_vectors,
        constants: args.constants,
        image_dim: args.image_dim,
        text_dim: args.text_dim,
    };
    let config = EngineConfig {
        include_self: !args.exclude_self,
        cache_capacity: args.cache_capacity,
        family_distance: args.family_distance,
    };

    let store = tokio::task::spawn_blocking(move || DataStore::open(&sources)).await??;
    let (engine, labels) = store.into_engine(config)?;
    for family in Family::ALL {
        info!("{} family: {} entities", family, engine.family_len(family));
    }
    info!("Engine ready: {:?}", engine);

    let state = AppState::new(engine, labels);
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("dexsim started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
