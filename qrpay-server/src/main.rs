//! Payment QR job server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory, optional)
//! cargo run -p qrpay-server --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p qrpay-server
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p qrpay-server
//! ```
//!
//! See [`qrpay_server::config`] for every environment variable.

use axum::http::Method;
use qrpay::job::{FailedJobPolicy, JobOrchestrator};
use qrpay::pipeline::PaymentRequestPipeline;
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use qrpay_server::config::ServerConfig;
use qrpay_server::util::{SigDown, bind_with_fallback};
use qrpay_server::{AppState, app_router};

/// Ports tried after the configured one when it is already taken.
const PORT_ATTEMPTS: u16 = 10;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        max_jobs = config.max_concurrent_jobs,
        retention_ms = config.job_timeout_ms,
        "Loaded configuration"
    );

    let job_config = config.job_config();
    if job_config.failed_policy == FailedJobPolicy::Retain {
        tracing::warn!(
            "Failed jobs are retained until restart; set EXPIRE_FAILED_JOBS=true to expire them"
        );
    }

    let pipeline = PaymentRequestPipeline::builtin();
    tracing::info!(chains = pipeline.registry().len(), "Chain registry ready");

    let listener = bind_with_fallback(config.host, config.port, PORT_ATTEMPTS).await?;
    let addr = listener.local_addr()?;

    let state = AppState {
        jobs: JobOrchestrator::new(pipeline, job_config),
        host: addr.ip(),
        port: addr.port(),
    };

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(cors::Any),
        );

    let sig_down = SigDown::try_new()?;
    tracing::info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(sig_down.recv())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}
