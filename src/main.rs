use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use snapfeed::auth::session;
use snapfeed::config::{Cli, Config};
use snapfeed::db;
use snapfeed::labeling::{Labeler, NoopLabeler, VisionLabeler};
use snapfeed::routes;
use snapfeed::state::AppState;
use snapfeed::storage::FsBucket;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;
    let purged = session::purge_expired(&pool)?;
    if purged > 0 {
        tracing::info!("Purged {} expired sessions", purged);
    }

    let bucket = FsBucket::open(
        &config.buckets_path(),
        &config.storage.bucket,
        routes::MEDIA_PREFIX,
    )?;

    let labeler: Arc<dyn Labeler> = match config.labeling.api_key.clone() {
        Some(key) => {
            tracing::info!("Labeling via {}", config.labeling.endpoint);
            Arc::new(VisionLabeler::new(&config.labeling, key)?)
        }
        None => {
            tracing::warn!("No labeling API key configured; posts will have no labels");
            Arc::new(NoopLabeler)
        }
    };

    let state = AppState {
        db: pool,
        config: config.clone(),
        storage: Arc::new(bucket),
        labeler,
    };

    let app = routes::app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
