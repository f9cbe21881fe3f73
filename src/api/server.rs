//! HTTP control surface with SSE support
//!
//! Serves the dashboard page and turns browser actions into
//! [`ControlEvent`]s for the dashboard task.

use super::{
    events::{Event, EventBroadcaster},
    handle::DashboardHandle,
};
use crate::chart::ChartDescription;
use crate::config::Settings;
use crate::dashboard::{ControlEvent, ControlState, Dashboard};
use crate::error::{LiveChartError, Result};
use crate::generator::SampleGenerator;
use crate::types::{Mode, UpdateInterval};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive},
        Html, IntoResponse, Response, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::{wrappers::BroadcastStream, StreamExt as _};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Dashboard page
const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Period of the SSE heartbeat
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(10);

/// Extra ports tried when the configured one is taken
const PORT_FALLBACK_ATTEMPTS: u16 = 10;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Dashboard owner
    dashboard: DashboardHandle,
    /// Event broadcaster
    events: EventBroadcaster,
    /// Instance ID
    instance_id: String,
}

impl AppState {
    pub fn new(dashboard: DashboardHandle, events: EventBroadcaster, instance_id: String) -> Self {
        Self {
            dashboard,
            events,
            instance_id,
        }
    }

    /// State around a fresh dashboard built from `settings`
    pub fn from_settings(settings: &Settings, instance_id: String) -> Result<Self> {
        let events = EventBroadcaster::new(settings.event_capacity);
        let generator = match settings.seed {
            Some(seed) => SampleGenerator::with_seed(seed),
            None => SampleGenerator::new(),
        };
        let dashboard = Dashboard::new(settings.max_points, settings.interval()?, generator);
        let handle = DashboardHandle::spawn(dashboard, events.clone());
        Ok(Self::new(handle, events, instance_id))
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }
}

/// Live chart server
pub struct ApiServer {
    addr: SocketAddr,
    state: AppState,
    /// Shutdown signal for background tasks
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
    /// Heartbeat task handle for cleanup
    heartbeat_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ApiServer {
    /// Create the server and spawn the dashboard task
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        let state = AppState::from_settings(settings, instance_id)?;
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

        Ok(Self {
            addr: settings.addr,
            state,
            shutdown_tx,
            heartbeat_handle: None,
        })
    }

    /// Get event broadcaster
    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.state.events
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.state.instance_id
    }

    /// Bind the listening socket
    ///
    /// Tries the configured address first, then the next ports if it is
    /// already in use. Returns the address actually bound.
    pub async fn bind(&self) -> Result<(tokio::net::TcpListener, SocketAddr)> {
        bind_with_fallback(self.addr).await
    }

    /// Bind and serve until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let (listener, _) = self.bind().await?;
        self.serve_with_listener(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve_with_listener(mut self, listener: tokio::net::TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        let router = build_router(self.state.clone());

        let _ = self
            .state
            .events
            .broadcast(Event::session_started(self.state.instance_id.clone()));

        let events = self.state.events.clone();
        let instance_id = self.state.instance_id.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        self.heartbeat_handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEARTBEAT_PERIOD);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = events.broadcast(Event::heartbeat(instance_id.clone()));
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Heartbeat task received shutdown signal");
                        break;
                    }
                }
            }
        }));

        info!(
            "Live chart [{}] listening on http://{}",
            self.state.instance_id, addr
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Live chart [{}] stopped", self.state.instance_id);
        Ok(())
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.heartbeat_handle.take() {
            handle.abort();
            debug!("ApiServer dropped - heartbeat task aborted");
        }
    }
}

/// Bind `addr`, or one of the following ports if it is taken
async fn bind_with_fallback(addr: SocketAddr) -> Result<(tokio::net::TcpListener, SocketAddr)> {
    for offset in 0..=PORT_FALLBACK_ATTEMPTS {
        let Some(port) = addr.port().checked_add(offset) else {
            break;
        };
        let candidate = SocketAddr::new(addr.ip(), port);

        match tokio::net::TcpListener::bind(candidate).await {
            Ok(listener) => {
                let bound = listener.local_addr()?;
                return Ok((listener, bound));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!("Port {} in use, trying next port...", port);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(LiveChartError::Other(format!(
        "All ports ({}-{}) are in use",
        addr.port(),
        addr.port().saturating_add(PORT_FALLBACK_ATTEMPTS)
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Build router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Page
        .route("/", get(index_handler))
        // Control events
        .route("/api/tick", post(tick_handler))
        .route("/api/mode", post(mode_handler))
        .route("/api/interval", post(interval_handler))
        // Read-only views
        .route("/api/chart", get(chart_handler))
        .route("/api/controls", get(controls_handler))
        // Event streaming
        .route("/events", get(events_handler))
        // Health check
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for LiveChartError {
    fn into_response(self) -> Response {
        let status = match &self {
            LiveChartError::InvalidInterval(_) => StatusCode::BAD_REQUEST,
            LiveChartError::DashboardUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize)]
struct TickRequest {
    #[serde(default)]
    n_intervals: u64,
}

/// Tick handler: generate, append, render
async fn tick_handler(
    State(state): State<AppState>,
    body: Option<Json<TickRequest>>,
) -> Result<Json<ChartDescription>> {
    let n_intervals = body.map_or(0, |Json(req)| req.n_intervals);
    let outcome = state
        .dashboard
        .dispatch(ControlEvent::Tick { n_intervals })
        .await?;
    Ok(Json(outcome.chart))
}

#[derive(Debug, Deserialize)]
struct ModeRequest {
    /// Missing, null or unrecognised values select random-walk
    #[serde(default)]
    mode: Mode,
}

async fn mode_handler(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<ChartDescription>> {
    let outcome = state
        .dashboard
        .dispatch(ControlEvent::ModeChanged(req.mode))
        .await?;
    Ok(Json(outcome.chart))
}

#[derive(Debug, Serialize, Deserialize)]
struct IntervalBody {
    interval_ms: u64,
}

async fn interval_handler(
    State(state): State<AppState>,
    Json(req): Json<IntervalBody>,
) -> Result<Json<IntervalBody>> {
    let interval = UpdateInterval::new(req.interval_ms)?;
    let outcome = state
        .dashboard
        .dispatch(ControlEvent::IntervalChanged(interval))
        .await?;
    let applied = outcome.interval.unwrap_or(interval);
    Ok(Json(IntervalBody {
        interval_ms: applied.as_millis(),
    }))
}

async fn chart_handler(State(state): State<AppState>) -> Result<Json<ChartDescription>> {
    Ok(Json(state.dashboard.chart().await?))
}

async fn controls_handler(State(state): State<AppState>) -> Result<Json<ControlState>> {
    Ok(Json(state.dashboard.controls().await?))
}

/// SSE events handler
///
/// Sends the current chart first so late subscribers start from the same
/// picture, then streams live events.
async fn events_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl tokio_stream::Stream<Item = std::result::Result<SseEvent, Infallible>>>> {
    debug!("New SSE client connected, sending snapshot");

    // Subscribe before reading the snapshot so nothing falls in between
    let rx = state.events.subscribe();
    let current = state.dashboard.snapshot().await?;
    let snapshot = Event::snapshot(
        current.controls.mode,
        current.controls.interval_ms,
        current.chart,
    );

    let snapshot_stream = tokio_stream::iter(to_sse(&snapshot).map(Ok::<_, Infallible>));
    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => to_sse(&event).map(Ok::<_, Infallible>),
        Err(_) => None, // Skip lagged messages
    });

    Ok(Sse::new(snapshot_stream.chain(live_stream)).keep_alive(KeepAlive::default()))
}

fn to_sse(event: &Event) -> Option<SseEvent> {
    let data = serde_json::to_string(event).ok()?;
    Some(SseEvent::default().data(data).id(event.id.clone()))
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    instance_id: String,
    subscribers: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        subscribers: state.events.subscriber_count(),
    })
}
