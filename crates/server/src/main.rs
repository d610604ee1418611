use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vecsearch_core::{config, HnswConfig, SearchEngine};
use vecsearch_server::api::create_router;
use vecsearch_server::api::handlers::AppState;

#[derive(Parser)]
#[command(name = "vecsearch", about = "In-memory vector similarity search service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Vector dimensions (default: 384 for all-MiniLM-L6-v2)
    #[arg(short, long, default_value_t = config::DEFAULT_DIMENSIONS)]
    dimensions: usize,

    /// HNSW links per node per layer
    #[arg(long, default_value_t = config::HNSW_DEFAULT_M)]
    m: usize,

    /// HNSW beam width during construction
    #[arg(long, default_value_t = config::HNSW_DEFAULT_EF_CONSTRUCTION)]
    ef_construction: usize,

    /// HNSW beam width during search
    #[arg(long, default_value_t = config::HNSW_DEFAULT_EF_SEARCH)]
    ef_search: usize,

    /// Seed for the HNSW level RNG
    #[arg(long, default_value_t = config::HNSW_DEFAULT_SEED)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "vecsearch_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "vecsearch_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let mut args = Args::parse();

    // Environment overrides, matching the deployment convention of the
    // surrounding document-intelligence stack.
    if let Ok(port) = std::env::var("VECTOR_SERVICE_PORT") {
        match port.parse() {
            Ok(p) => args.port = p,
            Err(_) => tracing::warn!("Ignoring invalid VECTOR_SERVICE_PORT={port}"),
        }
    }
    if let Ok(dim) = std::env::var("VECTOR_DIMENSIONS") {
        match dim.parse() {
            Ok(d) => args.dimensions = d,
            Err(_) => tracing::warn!("Ignoring invalid VECTOR_DIMENSIONS={dim}"),
        }
    }

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    if args.dimensions == 0 || args.dimensions > config::MAX_DIMENSION {
        eprintln!(
            "Error: dimensions must be 1-{}, got {}",
            config::MAX_DIMENSION,
            args.dimensions
        );
        std::process::exit(1);
    }

    let hnsw_config = HnswConfig {
        ef_construction: args.ef_construction,
        ef_search: args.ef_search,
        seed: args.seed,
        ..HnswConfig::with_m(args.m)
    };
    let engine = Arc::new(SearchEngine::new(args.dimensions, hnsw_config)?);

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let state = AppState {
        engine,
        prometheus_handle,
    };
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        dimensions = args.dimensions,
        m = args.m,
        ef_construction = args.ef_construction,
        ef_search = args.ef_search,
        "vecsearch ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
