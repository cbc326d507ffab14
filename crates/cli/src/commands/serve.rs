//! HTTP service: `POST /ask` and `GET /health`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use baseera_core::{config::AppConfig, AppResult};
use baseera_pipeline::{handle_query, AnswerEnvelope, AppContext};
use clap::Args;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Run the HTTP service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5001", env = "BASEERA_ADDR")]
    pub addr: SocketAddr,
}

#[derive(Debug, Deserialize)]
pub struct AskBody {
    #[serde(default)]
    pub topic: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        if let Err(e) = config.validate() {
            // Requests still get a not-ready envelope until this is fixed
            warn!(error = %e, "Configuration incomplete");
        }

        let context = Arc::new(AppContext::from_config(config));
        let app = create_router(context);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Listening on {}", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }
}

pub fn create_router(context: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(context)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// A malformed body is answered like a missing topic.
async fn ask(
    State(context): State<Arc<AppContext>>,
    body: Result<Json<AskBody>, JsonRejection>,
) -> (StatusCode, Json<AnswerEnvelope>) {
    let topic = body.ok().and_then(|Json(b)| b.topic);
    respond(&context, topic).await
}

async fn respond(context: &AppContext, topic: Option<String>) -> (StatusCode, Json<AnswerEnvelope>) {
    let response = handle_query(context, topic.as_deref().unwrap_or_default()).await;

    let status = StatusCode::from_u16(response.disposition.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.envelope))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
