//! HTTP transport for the control commands
//!
//! Observers poll `/crawl/state` or follow `/crawl/events` as server-sent
//! events. There is no replay: a client that connects late polls the state.

use std::convert::Infallible;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use super::commands::{ControlError, ControlMessage, ControlReply, CrawlController, TabInfo};
use crate::content_saver::{render_csv, render_json};
use crate::crawl_engine::{CrawlSettings, LogEntry};
use crate::crawl_events::{EventKind, StreamItem, event_stream};

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::TabNotFound(_) | Self::NoAdminTab => StatusCode::NOT_FOUND,
            Self::NotAdminPage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Browser(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest {
    #[serde(default)]
    settings: CrawlSettings,
    #[serde(default)]
    tab_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    kind: Option<EventKind>,
}

pub fn router(controller: CrawlController) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/message", post(message))
        .route("/crawl/start", post(start))
        .route("/crawl/state", get(crawl_state))
        .route("/crawl/stop", post(stop))
        .route("/crawl/clear", post(clear))
        .route("/crawl/events", get(events))
        .route("/crawl/export/json", get(export_json))
        .route("/crawl/export/csv", get(export_csv))
        .route("/crawl/logs", get(logs))
        .route("/tabs", get(tabs))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}

/// Bind `addr` and serve until ctrl-c
pub async fn serve(addr: &str, controller: CrawlController) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("Control server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(controller))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
            log::info!("Shutting down control server");
        })
        .await
        .context("Control server failed")
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn message(
    State(controller): State<CrawlController>,
    Json(message): Json<ControlMessage>,
) -> Result<Json<ControlReply>, ControlError> {
    controller.handle(message).await.map(Json)
}

async fn start(
    State(controller): State<CrawlController>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ControlReply>, ControlError> {
    controller
        .start_crawl(request.settings, request.tab_id.as_deref())
        .await
        .map(Json)
}

async fn crawl_state(State(controller): State<CrawlController>) -> Json<ControlReply> {
    Json(controller.get_state())
}

async fn stop(State(controller): State<CrawlController>) -> Json<ControlReply> {
    Json(controller.stop_crawl())
}

async fn clear(State(controller): State<CrawlController>) -> Json<ControlReply> {
    Json(controller.clear_state())
}

async fn events(
    State(controller): State<CrawlController>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = controller.orchestrator().subscribe();

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });
    let events = event_stream(receiver, query.kind).filter_map(|item| async move {
        let event = match item {
            StreamItem::Event(event) => Event::default().event(event.kind().as_str()).json_data(&event),
            StreamItem::Lagged(missed) => Event::default()
                .event("lagged")
                .json_data(json!({ "missed": missed })),
        };
        match event {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                log::warn!("Failed to encode crawl event: {e}");
                None
            }
        }
    });

    Sse::new(connected.chain(events)).keep_alive(KeepAlive::default())
}

async fn export_json(State(controller): State<CrawlController>) -> Response {
    let posts = controller.orchestrator().get_state().posts;
    match render_json(&posts) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn export_csv(State(controller): State<CrawlController>) -> Response {
    let posts = controller.orchestrator().get_state().posts;
    match render_csv(&posts) {
        Ok(body) => ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn logs(State(controller): State<CrawlController>) -> Json<Vec<LogEntry>> {
    Json(controller.orchestrator().get_state().logs)
}

async fn tabs(State(controller): State<CrawlController>) -> Result<Json<Vec<TabInfo>>, ControlError> {
    controller.list_tabs().await.map(Json)
}

fn internal_error(err: anyhow::Error) -> Response {
    log::error!("Export failed: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("{err:#}") })),
    )
        .into_response()
}
