use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocrapi::api::{create_router, AppState};
use ocrapi::config::Config;
use ocrapi::ocr::OcrProvider;

#[derive(Parser)]
#[command(name = "ocrapi")]
#[command(about = "REST API server for local OCR")]
struct Args {
    /// Address to bind (overrides OCR_HOST)
    #[arg(long)]
    ip: Option<String>,

    /// Port to listen on (overrides OCR_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of runtime worker threads (overrides OCR_WORKERS)
    #[arg(short, long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocrapi=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    config.server = config.server.with_overrides(args.ip, args.port, args.workers);

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    match &config.engine_source {
        Some(path) => tracing::info!("Engine config loaded from {}", path.display()),
        None => tracing::info!("Engine config: built-in defaults"),
    }

    tracing::info!("Initializing OCR engine...");
    let ocr = OcrProvider::new(&config.engine);
    if !ocr.is_available() {
        tracing::warn!("OCR unavailable - recognition requests will return 503");
    }

    let addr = config.server.bind_addr();
    let workers = config.server.workers;
    let app = create_router(AppState::new(config, ocr));

    tracing::info!("RapidOCR API starting on http://{} ({} workers)", addr, workers);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
