use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::document::UploadedFile;
use crate::error::RagError;
use crate::providers::OllamaProvider;
use crate::session::{Answer, RagContext, Session, SessionStatus, UploadReport};

pub const DEFAULT_SESSION: &str = "default";
pub const SESSION_HEADER: &str = "x-session-id";
const MAX_CONCURRENT_REQUESTS: usize = 64;

#[derive(Clone)]
pub struct AppState {
    ctx: Arc<RagContext>,
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
    probe: Option<Arc<OllamaProvider>>,
}

impl AppState {
    async fn session(&self, id: Option<&str>) -> Result<Arc<Mutex<Session>>, ApiError> {
        let id = id.unwrap_or(DEFAULT_SESSION);
        if let Some(session) = self.sessions.read().await.get(id) {
            return Ok(Arc::clone(session));
        }
        if id != DEFAULT_SESSION {
            return Err(ApiError(StatusCode::NOT_FOUND, format!("Unknown session: {}", id)));
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(self.ctx.new_session())));
        Ok(Arc::clone(session))
    }
}

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000))]
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ApiResponse {
    status: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    model_service: String,
    chat_model: String,
    embedding_model: String,
}

#[derive(Serialize)]
pub struct SessionCreated {
    session_id: String,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, message.into())
    }
}

impl From<RagError> for ApiError {
    fn from(e: RagError) -> Self {
        let status = match &e {
            RagError::InvalidUpload(_) | RagError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RagError::Session(_) => StatusCode::CONFLICT,
            RagError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RagError::Model(_) => StatusCode::BAD_GATEWAY,
            RagError::Io(_) | RagError::Config(_) | RagError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", e);
        } else {
            log::warn!("Request rejected: {}", e);
        }
        Self(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ApiResponse { status: self.1 })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create and configure the API router. `probe` is used by `/health` to
/// check that the model service answers.
pub fn create_api(ctx: Arc<RagContext>, probe: Option<OllamaProvider>) -> Router {
    let body_limit = ctx.config().max_upload_bytes + 1024 * 1024;
    let state = AppState {
        ctx,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        probe: probe.map(Arc::new),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/upload", post(upload_handler))
        .route("/chat", post(chat_handler))
        .route("/status", get(status_handler))
        .route("/reset", post(reset_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(GlobalConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(cors)
        .with_state(state)
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_service = match &state.probe {
        Some(probe) => match probe.health_check().await {
            Ok(()) => "reachable".to_string(),
            Err(e) => {
                log::warn!("Model service health check failed: {}", e);
                "unreachable".to_string()
            }
        },
        None => "not configured".to_string(),
    };
    let config = state.ctx.config();
    let chat_model = state
        .ctx
        .generator()
        .model_info()
        .await
        .unwrap_or_else(|_| config.chat_model.clone());

    Json(HealthResponse {
        status: "Server is running and healthy".to_string(),
        model_service,
        chat_model,
        embedding_model: config.embedding_model.clone(),
    })
}

async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let id = uuid::Uuid::new_v4().to_string();
    state
        .sessions
        .write()
        .await
        .insert(id.clone(), Arc::new(Mutex::new(state.ctx.new_session())));
    log::info!("Created session {}", id);
    Json(SessionCreated { session_id: id })
}

async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<UploadReport> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {}", e)))?
    {
        let Some(name) = field.file_name().map(|n| n.to_string()) else {
            continue;
        };
        if upload.is_some() {
            return Err(ApiError::bad_request("Upload exactly one PDF file"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
        upload = Some(UploadedFile::new(name, bytes.to_vec()));
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let session = state.session(session_header(&headers)).await?;
    let mut session = session.lock().await;

    let report = session.upload(upload).await?;
    Ok(Json(report))
}

async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Answer> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;
    request
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid request: {}", e)))?;

    let id = request.session_id.as_deref().or_else(|| session_header(&headers));
    let session = state.session(id).await?;
    let mut session = session.lock().await;

    if !session.is_indexed() {
        return Err(ApiError(
            StatusCode::CONFLICT,
            "No document indexed yet. Upload a PDF first.".to_string(),
        ));
    }

    let answer = session.ask(&request.message).await?;
    Ok(Json(answer))
}

async fn status_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionStatus> {
    let session = state.session(session_header(&headers)).await?;
    let status = session.lock().await.status();
    Ok(Json(status))
}

async fn reset_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<ApiResponse> {
    let session = state.session(session_header(&headers)).await?;
    session.lock().await.reset();
    Ok(Json(ApiResponse {
        status: "Session cleared".to_string(),
    }))
}
