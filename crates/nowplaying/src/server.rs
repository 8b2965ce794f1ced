//! HTTP server for now-playing endpoints
//!
//! Provides /health, /{user} and the legacy /{user}/latest-song endpoints.

use crate::error::{NowPlayingError, Result};
use crate::source::TrackCache;
use crate::types::{HealthResponse, MessageResponse, ShieldsResponse, TrackResponse, TrackView};
use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// How long in-flight requests may run after a shutdown signal
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: TrackCache,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: TrackCache) -> Self {
        Self {
            cache,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Output format query parameter
#[derive(Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    format: Option<String>,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(missing_user))
        .route("/health", get(health))
        .route("/{user}", get(latest_track))
        .route("/{user}/latest-song", get(latest_track))
        .layer(cors)
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests for at most
/// [`SHUTDOWN_GRACE`]
pub async fn start_server<S>(state: SharedState, port: u16, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten_server_result(result),
        _ = shutdown => {}
    }

    info!("Shutting down server...");
    let _ = stop_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(result) => flatten_server_result(result),
        Err(_) => Err(NowPlayingError::ShutdownTimeout(SHUTDOWN_GRACE)),
    }
}

fn flatten_server_result(
    result: std::result::Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<()> {
    match result {
        Ok(served) => served.map_err(NowPlayingError::from),
        Err(e) => Err(NowPlayingError::Server(e.to_string())),
    }
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok",
        uptime_secs,
        cache,
    })
}

async fn missing_user() -> Response {
    (StatusCode::BAD_REQUEST, Json(MessageResponse::BAD_REQUEST)).into_response()
}

/// Latest track for a user, as track JSON or a shields.io badge
async fn latest_track(
    State(state): State<SharedState>,
    Path(user): Path<String>,
    Query(params): Query<FormatQuery>,
) -> Response {
    let user = user.trim();
    if user.is_empty() {
        return missing_user().await;
    }
    let user = user.to_string();

    let track = match state.cache.lookup(&user).await {
        Ok(Some(track)) => track,
        Ok(None) => return Json(MessageResponse::NO_TRACKS_FOUND).into_response(),
        Err(e) => {
            warn!(user = %user, error = %e, "Track lookup failed");
            return (StatusCode::BAD_GATEWAY, Json(MessageResponse::UPSTREAM_ERROR))
                .into_response();
        }
    };

    if params.format.as_deref() == Some("shields.io") {
        return Json(ShieldsResponse::from_track(&track)).into_response();
    }

    Json(TrackResponse {
        track: TrackView::from(track.as_ref()),
    })
    .into_response()
}
