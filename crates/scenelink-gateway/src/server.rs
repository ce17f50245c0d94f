//! [`GatewayServer`] – the HTTP surface the tracking process talks to.
//!
//! | Route | Body |
//! |---|---|
//! | `GET /update_obj/{id}/{x},{y},{theta},{visible}` | `OK`, or `ERROR_UNKNOWN_OBJECT` (404) |
//! | `GET /data/{x},{y},{theta}` | empty; reports the data object as visible |
//! | `GET /data/{x},{y},{height}` | same, when the data object is a point |
//! | `GET /get_waypoint` | `"<z>,<x>"` or `NONE` |
//! | `GET /reset_waypoint` | `OK` |
//! | `GET /health` | `OK` |
//!
//! Unparseable reports get `400` with an `ERROR_MALFORMED_REPORT: ...` body.
//! The `/data` target is [`RelayConfig::data_target`]; its role decides the
//! field layout and the published rotation.
//!
//! [`RelayConfig::data_target`]: scenelink_runtime::RelayConfig::data_target

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use scenelink_runtime::Relay;
use scenelink_types::{ObjectRole, RelayError};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::report::{PoseReport, parse_legacy_report, parse_point_report, parse_report};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

const UNKNOWN_OBJECT: &str = "ERROR_UNKNOWN_OBJECT";
const NO_WAYPOINT: &str = "NONE";

type Reply = (StatusCode, String);

/// HTTP server exposing a [`Relay`] to the tracker.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use scenelink_gateway::GatewayServer;
/// use scenelink_middleware::RecordingScene;
/// use scenelink_runtime::{Relay, RelayConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let relay = Arc::new(Relay::new(RelayConfig::default(), Arc::new(RecordingScene::new())));
///     let (_tx, rx) = tokio::sync::watch::channel(false);
///     GatewayServer::new(relay).with_port(8080).run(rx).await.expect("gateway failed");
/// }
/// ```
pub struct GatewayServer {
    relay: Arc<Relay>,
    port: u16,
}

impl GatewayServer {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self {
            relay,
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Bind `0.0.0.0:port` and serve until `shutdown` flips to `true`.
    ///
    /// # Errors
    ///
    /// [`RelayError::Transport`] if the port cannot be bound or the server
    /// fails.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), RelayError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RelayError::Transport(format!("bind error on {addr}: {e}")))?;
        info!(%addr, "gateway listening");
        serve(listener, self.relay, shutdown).await
    }
}

/// Serve on an already-bound listener.
///
/// # Errors
///
/// [`RelayError::Transport`] if the server fails.
pub async fn serve(
    listener: TcpListener,
    relay: Arc<Relay>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), RelayError> {
    axum::serve(listener, router(relay))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| RelayError::Transport(format!("gateway: {e}")))?;
    info!("gateway stopped");
    Ok(())
}

/// The gateway's routes, bound to `relay`.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/update_obj/{id}/{report}", get(update_object))
        .route("/data/{report}", get(legacy_report))
        .route("/get_waypoint", get(get_waypoint))
        .route("/reset_waypoint", get(reset_waypoint))
        .route("/health", get(health))
        .with_state(relay)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn update_object(
    State(relay): State<Arc<Relay>>,
    Path((id, raw)): Path<(String, String)>,
) -> Reply {
    match parse_report(&raw, relay.config().units) {
        Ok(report) => apply(&relay, &id, report, "OK"),
        Err(e) => malformed(e),
    }
}

async fn legacy_report(State(relay): State<Arc<Relay>>, Path(raw): Path<String>) -> Reply {
    let Some(target) = relay.config().data_target() else {
        warn!("single-object report received but no data object is configured");
        return (StatusCode::NOT_FOUND, UNKNOWN_OBJECT.to_string());
    };
    let units = relay.config().units;
    let parsed = match target.role {
        ObjectRole::Point => parse_point_report(&raw, units),
        ObjectRole::Primary | ObjectRole::Marker => parse_legacy_report(&raw, units),
    };
    match parsed {
        Ok(report) => apply(&relay, &target.id, report, ""),
        Err(e) => malformed(e),
    }
}

async fn get_waypoint(State(relay): State<Arc<Relay>>) -> Reply {
    let body = match relay.negotiator().poll_waypoint() {
        Some((z, x)) => format!("{z},{x}"),
        None => NO_WAYPOINT.to_string(),
    };
    (StatusCode::OK, body)
}

async fn reset_waypoint(State(relay): State<Arc<Relay>>) -> Reply {
    relay.negotiator().acknowledge().await;
    (StatusCode::OK, "OK".to_string())
}

async fn health() -> Reply {
    (StatusCode::OK, "OK".to_string())
}

fn apply(relay: &Relay, id: &str, r: PoseReport, ok_body: &str) -> Reply {
    match relay.report(id, r.into()) {
        Ok(()) => {
            debug!(object_id = id, x = r.x, y = r.y, theta = r.theta, visible = r.visible, "report");
            (StatusCode::OK, ok_body.to_string())
        }
        Err(RelayError::UnknownObject(_)) => {
            warn!(object_id = id, "report for unknown object");
            (StatusCode::NOT_FOUND, UNKNOWN_OBJECT.to_string())
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn malformed(err: RelayError) -> Reply {
    let detail = match err {
        RelayError::MalformedReport(m) => m,
        other => other.to_string(),
    };
    warn!(%detail, "malformed report");
    (StatusCode::BAD_REQUEST, format!("ERROR_MALFORMED_REPORT: {detail}"))
}
