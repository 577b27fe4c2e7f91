//! HTTP surface: a single chat page plus a small JSON API
//!
//! Every browser tab gets its own session. Sessions are independent; a
//! turn holds only its own session's lock while the model is working.

use crate::chain::ConversationalChain;
use crate::config::Config;
use crate::error::{LawaidError, Result};
use crate::intake::{Complaint, Probability, SubmissionOutcome};
use crate::session::{ChatMessage, SessionStore};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// The chat page served at `/`
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<ConversationalChain>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(chain: ConversationalChain, memory_window: usize) -> Self {
        Self {
            chain: Arc::new(chain),
            sessions: Arc::new(SessionStore::new(memory_window)),
        }
    }
}

// ── Error mapping ─────────────────────────────────────────────────────────

/// Error returned by handlers, carrying the status it maps to
pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        let status = match error.downcast_ref::<LawaidError>() {
            Some(LawaidError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            Some(
                LawaidError::Provider(_)
                | LawaidError::Embedding(_)
                | LawaidError::Authentication(_)
                | LawaidError::Http(_),
            ) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("request failed: {}", self.error);
        } else {
            tracing::debug!("request rejected: {}", self.error);
        }
        (self.status, Json(json!({ "error": self.error.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// ── Request and response bodies ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct AskBody {
    pub content: String,
}

#[derive(Serialize)]
struct ComplaintResponse {
    status: &'static str,
    message: String,
    probability: Probability,
}

fn parse_session_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| LawaidError::SessionNotFound(raw.to_string()).into())
}

// ── Router ────────────────────────────────────────────────────────────────

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(end_session))
        .route("/api/sessions/:id/messages", get(list_messages).post(ask))
        .route("/api/sessions/:id/reset", post(reset_session))
        .route("/api/complaints", post(submit_complaint))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C
///
/// # Errors
///
/// Returns error if the address is invalid or cannot be bound
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("LawAid listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let index = state.chain.retriever().index();
    Json(json!({
        "status": "ok",
        "index_documents": index.len(),
        "embedding_model": index.embedding_model(),
        "sessions": state.sessions.len().await,
    }))
}

async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let id = state.sessions.create().await;
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let handle = state.sessions.get(parse_session_id(&id)?).await?;
    let session = handle.lock().await;
    let messages: &[ChatMessage] = session.messages();
    Ok(Json(json!({ "messages": messages })))
}

async fn ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AskBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let question = body.content.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("Question must not be empty"));
    }

    let handle = state.sessions.get(parse_session_id(&id)?).await?;
    let mut session = handle.lock().await;
    let outcome = state.chain.answer(&mut session, question).await?;
    Ok(Json(json!(outcome)))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let handle = state.sessions.get(parse_session_id(&id)?).await?;
    handle.lock().await.reset();
    Ok(StatusCode::NO_CONTENT)
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sessions.remove(parse_session_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_complaint(Json(complaint): Json<Complaint>) -> Json<ComplaintResponse> {
    let outcome = complaint.submit();
    let status = match outcome {
        SubmissionOutcome::Success(_) => "success",
        SubmissionOutcome::Warning(_) => "warning",
    };
    Json(ComplaintResponse {
        status,
        message: outcome.message().to_string(),
        probability: complaint.probability(),
    })
}
