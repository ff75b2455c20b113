use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast, time};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    commands::Command,
    error::{CommandError, PersistenceError},
    events::SimEvent,
    scenario::Scenario,
    session::{Control, Gate, Session},
    world::WorldSnapshot,
};

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub paused: bool,
    pub speed_ms: u64,
    pub gate: Option<Gate>,
    pub snapshot: WorldSnapshot,
}

impl StateEnvelope {
    fn of(session: &Session) -> Self {
        Self {
            scenario: session.scenario_name().to_string(),
            paused: session.is_paused(),
            speed_ms: session.speed_ms(),
            gate: session.gate(),
            snapshot: session.snapshot(),
        }
    }
}

#[derive(Clone, Serialize)]
struct StreamFrame<'a> {
    tick: u64,
    events: &'a [SimEvent],
    snapshot: WorldSnapshot,
}

#[derive(Serialize)]
struct CommandResponse {
    events: Vec<SimEvent>,
}

#[derive(Serialize)]
struct SaveResponse {
    path: String,
    tick: u64,
}

struct AppState {
    session: Arc<Mutex<Session>>,
    broadcaster: broadcast::Sender<String>,
    save_path: PathBuf,
}

impl AppState {
    fn session(&self) -> Result<MutexGuard<'_, Session>, ApiError> {
        self.session
            .lock()
            .map_err(|_| ApiError::internal("session lock poisoned"))
    }

    fn publish(&self, session: &Session, tick: u64, events: &[SimEvent]) {
        let frame = StreamFrame {
            tick,
            events,
            snapshot: session.snapshot(),
        };
        if let Ok(payload) = serde_json::to_string(&frame) {
            // No subscribers is fine.
            let _ = self.broadcaster.send(payload);
        }
    }
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub snapshot_dir: Option<PathBuf>,
    pub save_path: PathBuf,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        snapshot_dir,
        save_path,
        host,
        port,
    } = config;

    let session = Session::from_scenario(&scenario, snapshot_dir);
    let (tx, _) = broadcast::channel::<String>(512);
    let state = Arc::new(AppState {
        session: Arc::new(Mutex::new(session)),
        broadcaster: tx,
        save_path,
    });

    tokio::spawn(drive(state.clone()));

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/command", post(post_command))
        .route("/api/control", post(post_control))
        .route("/api/events", get(stream_events))
        .route("/api/history.csv", get(history))
        .route("/api/save", post(save))
        .route("/api/load", post(load))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, scenario = %scenario.name, "village server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Ticks the session at its selected speed, re-arming the interval when the
/// speed changes.
async fn drive(state: Arc<AppState>) {
    let mut speed_ms = match state.session() {
        Ok(session) => session.speed_ms(),
        Err(_) => return,
    };
    let mut ticker = time::interval(Duration::from_millis(speed_ms));
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let current_speed = {
            let Ok(mut session) = state.session() else {
                error!("session lock poisoned, stopping driver");
                return;
            };
            match session.step() {
                Ok(Some(report)) => state.publish(&session, report.tick, &report.events),
                Ok(None) => {}
                Err(err) => {
                    error!(?err, "tick failed, pausing");
                    session.pause();
                }
            }
            session.speed_ms()
        };
        if current_speed != speed_ms {
            speed_ms = current_speed;
            ticker = time::interval(Duration::from_millis(speed_ms));
            ticker.tick().await;
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down village server");
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Result<Json<StateEnvelope>, ApiError> {
    let session = state.session()?;
    Ok(Json(StateEnvelope::of(&session)))
}

async fn post_command(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<Json<CommandResponse>, ApiError> {
    let mut session = state.session()?;
    let events = session.apply(command)?;
    let tick = session.world().tick();
    state.publish(&session, tick, &events);
    Ok(Json(CommandResponse { events }))
}

async fn post_control(
    State(state): State<Arc<AppState>>,
    Json(control): Json<Control>,
) -> Result<Json<StateEnvelope>, ApiError> {
    let mut session = state.session()?;
    session.control(control);
    Ok(Json(StateEnvelope::of(&session)))
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}

async fn history(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let csv = state.session()?.history_csv();
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
}

async fn save(State(state): State<Arc<AppState>>) -> Result<Json<SaveResponse>, ApiError> {
    let session = state.session()?;
    session.save(&state.save_path)?;
    Ok(Json(SaveResponse {
        path: state.save_path.display().to_string(),
        tick: session.world().tick(),
    }))
}

async fn load(State(state): State<Arc<AppState>>) -> Result<Json<StateEnvelope>, ApiError> {
    let mut session = state.session()?;
    session.load(&state.save_path)?;
    Ok(Json(StateEnvelope::of(&session)))
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        warn!(%err, "persistence request failed");
        let status = match err {
            PersistenceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PersistenceError::Json(_) | PersistenceError::SchemaMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
