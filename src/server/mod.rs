//! HTTP surface
//!
//! Routes:
//!
//! - `GET /geoip/` - look up the caller's own address
//! - `GET /geoip/{ip_address}` - look up the given address
//!
//! Success and not-found both answer 200 with a JSON body. Invalid input is
//! a 400 and an unavailable database a 503, both with the not-found body
//! shape.

pub mod service;

pub use service::GeoIpService;

use crate::database::DatabaseManager;
use crate::download::Downloader;
use crate::error::{GeoIpError, Result};
use crate::response::ErrorDocument;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    service: Arc<GeoIpService>,
    pretty: bool,
}

impl AppState {
    pub fn new(service: Arc<GeoIpService>, pretty: bool) -> Self {
        Self { service, pretty }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/geoip", get(geoip_self))
        .route("/geoip/", get(geoip_self))
        .route("/geoip/{ip_address}", get(geoip_address))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

async fn geoip_self(State(state): State<AppState>, ConnectInfo(peer): ConnectInfo<SocketAddr>) -> Response {
    let ip = peer.ip().to_canonical().to_string();
    respond(&state, &ip).await
}

async fn geoip_address(State(state): State<AppState>, Path(ip_address): Path<String>) -> Response {
    respond(&state, &ip_address).await
}

async fn respond(state: &AppState, ip: &str) -> Response {
    match state.service.geoip(ip).await {
        Ok(document) => {
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "returning response: \n{}",
                    serde_json::to_string_pretty(&document).unwrap_or_default()
                );
            }
            json_response(StatusCode::OK, &document, state.pretty)
        }
        Err(e) => {
            let status = error_status(&e);
            if e.is_not_found() {
                log::warn!("Unable find ip address: {}", e);
            } else {
                log::error!("Lookup of {} failed: {}", ip, e);
            }
            json_response(status, &ErrorDocument::new(e.to_string()), state.pretty)
        }
    }
}

/// Transport status for a failed lookup
fn error_status(err: &GeoIpError) -> StatusCode {
    match err {
        GeoIpError::AddressNotFound(_) => StatusCode::OK,
        GeoIpError::InvalidIp(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T, pretty: bool) -> Response {
    let encoded = if pretty {
        serde_json::to_vec_pretty(body)
    } else {
        serde_json::to_vec(body)
    };

    match encoded {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            log::error!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Provision a fresh database and swap it into service
///
/// If provisioning fails the file on disk is unchanged and the current
/// handle keeps serving.
pub async fn refresh(downloader: &Downloader, database: &Arc<DatabaseManager>) -> Result<()> {
    downloader.provision(false).await?;

    let database = Arc::clone(database);
    tokio::task::spawn_blocking(move || database.reload())
        .await
        .map_err(|e| GeoIpError::query(format!("Reload task failed: {}", e)))?
}

/// Refresh the database whenever the process receives SIGHUP
#[cfg(unix)]
pub fn spawn_refresh_on_sighup(downloader: Downloader, database: Arc<DatabaseManager>) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            log::info!("SIGHUP received, refreshing database");
            match refresh(&downloader, &database).await {
                Ok(()) => log::info!("Database refresh complete"),
                Err(e) => log::error!("Database refresh failed, keeping current database: {}", e),
            }
        }
    });

    Ok(())
}
