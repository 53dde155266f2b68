//! Demo server wrapped by the observer layer.

use std::path::PathBuf;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use http_observer::config::{load_config, ObserverConfig};
use http_observer::observability::{logging, metrics};
use http_observer::publish::transport_from_config;
use http_observer::{CorrelationContext, Observer};

#[derive(Parser, Debug)]
#[command(name = "http-observer", version, about = "Observed demo HTTP server")]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ObserverConfig {
            project_id: Some("local".to_string()),
            ..ObserverConfig::default()
        },
    };

    logging::init_tracing(&config.observability)?;
    tracing::info!("http-observer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let transport = transport_from_config(&config.publisher, &config.api_key)?;
    let observer = Observer::bootstrap(&config, transport).await?;

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/users/{id}", get(show_user))
        .route("/echo", post(echo))
        .layer(observer.layer())
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn show_user(Path(id): Path<u64>, ctx: CorrelationContext) -> Result<Json<Value>, StatusCode> {
    if id == 0 {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "user 0 does not exist");
        ctx.report_error(&err);
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "id": id, "name": format!("user-{id}") })))
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

