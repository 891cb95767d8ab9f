//! docmeta-server: HTTP front end for the metadata pipeline.
//!
//! - `GET  /health`: server status and OCR availability
//! - `POST /upload`: multipart form with a `file` field; responds with the
//!   sanitised filename and the metadata report as JSON
//!
//! Bind address and port come from `DOCMETA_SERVER_BIND` (default `0.0.0.0`)
//! and `DOCMETA_SERVER_PORT` (default `8300`).
//!
//! Build and run: `cargo run --features server --bin docmeta-server`

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use docmeta::config::DocmetaConfig;
use docmeta::ocr;
use docmeta::upload::{UploadError, UploadOutcome, UploadPolicy, process_upload};

/// Uploads larger than this are rejected by axum before reaching a handler.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

struct ServerState {
    config: DocmetaConfig,
    policy: UploadPolicy,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    ocr_available: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_available: ocr::global().is_available(),
    })
}

async fn upload(State(state): State<Arc<ServerState>>, mut multipart: Multipart) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((filename, bytes.to_vec())),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }

    let Some((filename, bytes)) = file else {
        return error_response(StatusCode::BAD_REQUEST, UploadError::Missing.to_string());
    };
    if filename.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, UploadError::Missing.to_string());
    }
    if !state.policy.is_allowed(&filename) {
        tracing::info!(%filename, "rejected upload");
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("file type not allowed: {filename}"),
        );
    }

    let task_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        process_upload(&filename, &bytes, &task_state.config, ocr::global())
    })
    .await;

    match result {
        Ok(Ok(outcome)) => (StatusCode::OK, Json::<UploadOutcome>(outcome)).into_response(),
        Ok(Err(e @ (UploadError::Missing | UploadError::Disallowed { .. }))) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "upload failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "extraction task panicked");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "extraction task failed")
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("DOCMETA_SERVER_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("DOCMETA_SERVER_PORT").unwrap_or_else(|_| "8300".to_string());
    let addr = format!("{bind}:{port}");

    let config_path = std::env::var_os("DOCMETA_CONFIG").map(std::path::PathBuf::from);
    let config = DocmetaConfig::resolve(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!("failed to load config: {e}");
        std::process::exit(1);
    });

    // Probe tesseract once, before the first request.
    ocr::install_global(&config.ocr);

    let state = Arc::new(ServerState {
        policy: UploadPolicy::new(&config.upload),
        config,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("docmeta-server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("docmeta-server shutting down");
        })
        .await;
    if let Err(e) = served {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
