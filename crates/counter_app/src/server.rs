//! HTTP surface: static page, status snapshot, ad-hoc evaluation and the
//! server-sent status stream.

use std::convert::Infallible;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use counter_core::{EvaluationView, StatusView, TitleResolver};
use counter_logging::{engine_debug, engine_info, engine_warn};
use futures::stream::Stream;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::{ServeDir, ServeFile};

use crate::hub::StatusHub;

const INDEX_FILE: &str = "counter.html";

#[derive(Clone)]
pub struct ServerState {
    hub: Arc<StatusHub>,
    resolver: Arc<TitleResolver>,
    observers: Arc<AtomicUsize>,
}

impl ServerState {
    pub fn new(hub: Arc<StatusHub>) -> Self {
        Self {
            hub,
            resolver: Arc::new(TitleResolver::new()),
            observers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.load(Ordering::SeqCst)
    }
}

pub fn build_router(state: ServerState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/evaluate", get(evaluate))
        .route("/events", get(events))
        .route_service("/", ServeFile::new(static_dir.join(INDEX_FILE)))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

async fn status(State(state): State<ServerState>) -> Json<StatusView> {
    Json(state.hub.current().await)
}

#[derive(Debug, Deserialize)]
struct EvaluateParams {
    #[serde(default)]
    expr: String,
}

/// Resolves one expression without touching the sequence state.
async fn evaluate(
    State(state): State<ServerState>,
    Query(params): Query<EvaluateParams>,
) -> Json<EvaluationView> {
    let value = state.resolver.resolve(&params.expr);
    let view = EvaluationView::new(params.expr, value);
    engine_debug!("Evaluated {:?}: {}", view.expression, view.message());
    Json(view)
}

/// Current status on connect, then every published one.
async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = ObserverGuard::register(state.observers.clone());
    let initial = state.hub.current().await;
    let mut updates = state.hub.subscribe();

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(status_event(&initial));
        loop {
            match updates.recv().await {
                Ok(view) => {
                    yield Ok(status_event(&view));
                }
                Err(RecvError::Lagged(skipped)) => {
                    engine_warn!("Observer lagged, skipped {} status updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn status_event(view: &StatusView) -> Event {
    Event::default()
        .event("status")
        .json_data(view)
        .unwrap_or_else(|_| Event::default().comment("unserializable status"))
}

/// Counts an open event stream for as long as it lives.
struct ObserverGuard {
    observers: Arc<AtomicUsize>,
}

impl ObserverGuard {
    fn register(observers: Arc<AtomicUsize>) -> Self {
        let total = observers.fetch_add(1, Ordering::SeqCst) + 1;
        engine_info!("New observer connected. Total: {}", total);
        Self { observers }
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let total = self.observers.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        engine_info!("Observer disconnected. Total: {}", total);
    }
}
