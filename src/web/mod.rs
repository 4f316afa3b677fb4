use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast, time::MissedTickBehavior};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info};

use crate::{
    actions::{Action, Outcome},
    breeding::{self, BreedingPreview},
    catalog::Strain,
    engine::{Engine, TickSummary},
    state::{EntityId, GameState},
};

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub summary: TickSummary,
    pub state: GameState,
}

#[derive(Clone, Serialize)]
pub struct ActionResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub state: GameState,
}

pub struct AppState {
    engine: Mutex<Engine>,
    broadcaster: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(engine: Engine) -> Arc<Self> {
        let (broadcaster, _) = broadcast::channel::<String>(256);
        Arc::new(Self {
            engine: Mutex::new(engine),
            broadcaster,
        })
    }

    fn engine(&self) -> MutexGuard<'_, Engine> {
        // Actions validate before mutating, so a poisoned lock still guards a
        // consistent state.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn envelope(engine: &Engine) -> StateEnvelope {
        StateEnvelope {
            summary: engine.summary(),
            state: engine.state().clone(),
        }
    }

    fn publish(&self, envelope: &StateEnvelope) {
        if let Ok(payload) = serde_json::to_string(envelope) {
            // No subscribers is not an error.
            let _ = self.broadcaster.send(payload);
        }
    }

    /// One timer firing: advance the clock and push the new state out.
    pub fn tick(&self) -> Result<TickSummary> {
        let envelope = {
            let mut engine = self.engine();
            engine.tick()?;
            Self::envelope(&engine)
        };
        self.publish(&envelope);
        Ok(envelope.summary)
    }
}

pub struct WebServerConfig {
    pub engine: Engine,
    pub host: String,
    pub port: u16,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/catalog", get(catalog))
        .route("/api/preview/:first/:second", get(preview))
        .route("/api/actions", post(apply_action))
        .route("/api/events", get(stream_events))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig { engine, host, port } = config;
    let interval = engine.config().tick.interval();
    let state = AppState::new(engine);

    let ticker_state = state.clone();
    let ticker = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval fires immediately.
        timer.tick().await;
        loop {
            timer.tick().await;
            if let Err(err) = ticker_state.tick() {
                error!(?err, "tick failed");
            }
        }
    });

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, tick_ms = interval.as_millis() as u64, "greenhouse API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    ticker.abort();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

type HandlerError = (StatusCode, String);

fn internal(err: anyhow::Error) -> HandlerError {
    error!(?err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}

fn not_found(message: String) -> HandlerError {
    (StatusCode::NOT_FOUND, message)
}

pub async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let engine = state.engine();
    Json(AppState::envelope(&engine))
}

pub async fn catalog(State(state): State<Arc<AppState>>) -> Json<Vec<Strain>> {
    Json(state.engine().config().catalog.clone())
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path((first, second)): Path<(u64, u64)>,
) -> Result<Json<BreedingPreview>, HandlerError> {
    let engine = state.engine();
    let game = engine.state();
    let lookup = |raw: u64| {
        game.seed(EntityId::new(raw))
            .map(|seed| seed.genotype)
            .ok_or_else(|| not_found(format!("no seed stack with id {raw}")))
    };
    let (a, b) = (lookup(first)?, lookup(second)?);
    Ok(Json(breeding::breeding_preview(&a, &b)))
}

pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    Json(action): Json<Action>,
) -> Result<Json<ActionResponse>, HandlerError> {
    let (result, envelope) = {
        let mut engine = state.engine();
        let result = engine.apply(&action).map_err(internal)?;
        (result, AppState::envelope(&engine))
    };
    let response = match result {
        Ok(outcome) => {
            state.publish(&envelope);
            ActionResponse {
                applied: true,
                outcome: Some(outcome),
                reason: None,
                state: envelope.state,
            }
        }
        Err(rejection) => ActionResponse {
            applied: false,
            outcome: None,
            reason: Some(rejection.to_string()),
            state: envelope.state,
        },
    };
    Ok(Json(response))
}

pub async fn stream_events(
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
