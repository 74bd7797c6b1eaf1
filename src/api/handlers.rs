//! HTTP request handlers

use super::types::{
    ErrorResponse, HealthResponse, HistoryResponse, ListQuery, MessageRequest, MessageResponse,
    NoticeResponse, SessionListResponse, SessionResponse,
};
use super::AppState;
use crate::chat::{ChatError, ChatSession, SessionStats};
use crate::pokeapi::{CacheStats, PokeApiError, PokemonPage, SEARCH_INDEX_SIZE};
use crate::sessions::SharedSession;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

const SESSION_NOT_FOUND: &str = "Sessão não encontrada.";
const SESSION_DELETED: &str = "Sessão encerrada com sucesso.";
const INVALID_MESSAGE_REQUEST: &str = "sessionId e message são obrigatórios.";
const MESSAGE_PROCESSING_FAILED: &str = "Erro ao processar a mensagem.";
const CACHE_CLEARED: &str = "Cache limpo com sucesso.";
const UPSTREAM_FAILED: &str = "Erro ao consultar a PokéAPI.";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat sessions
        .route("/api/chat/start", post(start_session))
        .route("/api/chat/message", post(send_message))
        .route("/api/chat/history/:session_id", get(get_history))
        .route("/api/chat/stats/:session_id", get(get_stats))
        .route("/api/chat/reset/:session_id", post(reset_session))
        .route("/api/chat/session/:session_id", delete(delete_session))
        .route("/api/chat/sessions", get(list_sessions))
        // Pokémon listing and response cache
        .route("/api/pokemon", get(list_pokemon))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache", delete(clear_cache))
        .route("/health", get(health))
        .with_state(state)
}

async fn find_session(state: &AppState, session_id: &str) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(SESSION_NOT_FOUND.to_string()))
}

// ============================================================
// Chat
// ============================================================

async fn start_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let (session, message) = ChatSession::start(Arc::clone(&state.data)).await?;
    let session_id = session.session_id().to_string();

    state
        .sessions
        .set(session_id.clone(), Arc::new(Mutex::new(session)))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            message,
        }),
    ))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn send_message(
    State(state): State<AppState>,
    req: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = req.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected message body");
        AppError::BadRequest(INVALID_MESSAGE_REQUEST.to_string())
    })?;
    let (Some(session_id), Some(text)) = (non_blank(req.session_id), non_blank(req.message))
    else {
        return Err(AppError::BadRequest(INVALID_MESSAGE_REQUEST.to_string()));
    };

    let session = find_session(&state, &session_id).await?;
    // Held for the whole turn so concurrent messages to one session queue up
    let mut session = session.lock().await;
    let response = session.process_message(&text).await?;

    Ok(Json(MessageResponse { response }))
}

async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = find_session(&state, &session_id).await?;
    let session = session.lock().await;

    Ok(Json(HistoryResponse {
        session_id,
        messages: session.history().to_vec(),
    }))
}

async fn get_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStats>, AppError> {
    let session = find_session(&state, &session_id).await?;
    let stats = session.lock().await.stats();
    Ok(Json(stats))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, &session_id).await?;
    let message = session.lock().await.reset().await?;

    Ok(Json(SessionResponse {
        session_id,
        message,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<NoticeResponse>, AppError> {
    if !state.sessions.delete(&session_id).await {
        return Err(AppError::NotFound(SESSION_NOT_FOUND.to_string()));
    }
    tracing::info!(session_id = %session_id, "Session deleted");
    Ok(Json(NoticeResponse::new(SESSION_DELETED)))
}

async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.sessions.list().await,
    })
}

// ============================================================
// Pokémon data, cache and health
// ============================================================

async fn list_pokemon(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PokemonPage>, AppError> {
    let limit = query.limit.clamp(1, SEARCH_INDEX_SIZE);
    let page = state.data.list_pokemon(limit, query.offset).await?;
    Ok(Json(page))
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.cache_stats())
}

async fn clear_cache(State(state): State<AppState>) -> Json<NoticeResponse> {
    state.cache.clear_cache();
    Json(NoticeResponse::new(CACHE_CLEARED))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        if err.is_fatal() {
            tracing::error!(error = %err, "Chat session corrupted");
        } else {
            tracing::warn!(error = %err, "Chat operation failed");
        }
        AppError::Internal(MESSAGE_PROCESSING_FAILED.to_string())
    }
}

impl From<PokeApiError> for AppError {
    fn from(err: PokeApiError) -> Self {
        match err {
            PokeApiError::PokemonNotFound => AppError::NotFound(err.to_string()),
            PokeApiError::InvalidIdentifier | PokeApiError::InvalidIdentifiers => {
                AppError::BadRequest(err.to_string())
            }
            PokeApiError::Network(_) => {
                tracing::warn!(error = %err, "Upstream lookup failed");
                AppError::Internal(UPSTREAM_FAILED.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
