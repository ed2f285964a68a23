use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use placement_scanner::api::{router, ApiState};
use placement_scanner::config::Config;
use placement_scanner::db::Store;
use placement_scanner::error::Result;
use placement_scanner::{Catalog, DetectionPipeline};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Term catalog, loaded once and shared read-only ---
    let catalog = Catalog::load_shared(cfg.catalog_path.as_deref())?;
    let source = cfg
        .catalog_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    info!(terms = catalog.len(), source = %source, "Term catalog ready");
    let pipeline = DetectionPipeline::new(catalog);

    // --- Database setup ---
    let store = Store::connect(&cfg.db_path).await?;

    // --- HTTP API server ---
    let app = router(ApiState::new(store, pipeline));
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
