//! HTTP surface of the dispatcher, built on axum
//!
//! - `POST /api/commands` form `cmd`, `referer` → JSON action or HTML transcript
//! - `GET /api/search?q=&context=` → body search hits as JSON
//! - `GET /api/content` → metadata for every content item
//! - `GET /health`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::html;
use crate::protocol::{CommandForm, CommandResponse, SearchQuery};

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            CommandResponse::Action(action) => Json(action).into_response(),
            CommandResponse::Html(html) => Html(html).into_response(),
        }
    }
}

/// Build the router over a shared dispatcher
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/api/commands", post(run_command))
        .route("/api/search", get(search))
        .route("/api/content", get(list_content))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

/// Malformed bodies render as an error line, never an HTTP error
async fn run_command(
    State(dispatcher): State<Arc<Dispatcher>>,
    form: Result<Form<CommandForm>, FormRejection>,
) -> CommandResponse {
    match form {
        Ok(Form(form)) => dispatcher.dispatch(&form.cmd, &form.referer).await,
        Err(rejection) => {
            warn!(status = %rejection.status(), "rejected command form: {}", rejection.body_text());
            CommandResponse::Html(html::error("invalid command request"))
        }
    }
}

async fn search(
    State(dispatcher): State<Arc<Dispatcher>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match dispatcher.site().search.search(&query.q, query.context).await {
        Ok(hits) => Json(hits).into_response(),
        Err(e) => {
            warn!(term = %query.q, "search endpoint failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "failed to search content" })),
            )
                .into_response()
        }
    }
}

async fn list_content(State(dispatcher): State<Arc<Dispatcher>>) -> Response {
    Json(dispatcher.site().index.all()).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Bind and serve until the process exits
pub async fn serve(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "command endpoint listening");
    axum::serve(listener, router(dispatcher)).await?;
    Ok(())
}
