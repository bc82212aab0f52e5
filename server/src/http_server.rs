use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use mentoria_tutor::{
    AnalyzeRequest, ChatMessage, ChatRequest, ChatSession, ChatSessionStoreRef, ContentKind,
    GenerateRequest, QuizRequest, TutorError, TutorService,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    service: TutorService,
    sessions: ChatSessionStoreRef,
    session_idle_timeout: chrono::Duration,
}

impl AppState {
    pub fn new(
        service: TutorService,
        sessions: ChatSessionStoreRef,
        session_idle_timeout: chrono::Duration,
    ) -> Self {
        Self {
            service,
            sessions,
            session_idle_timeout,
        }
    }
}

/// `{ success, data?, error? }` envelope used by every route
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    fn done() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }

    fn failure(message: String) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message),
        })
    }
}

/// The generate route echoes what was asked for next to the text.
#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    data: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    topic: String,
}

#[derive(Deserialize)]
pub struct SessionMessageRequest {
    message: Option<String>,
    context: Option<String>,
}

#[derive(Serialize)]
struct SessionCreated {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    id: String,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
}

impl From<&ChatSession> for SessionView {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id().to_string(),
            created_at: session.created_at(),
            last_active: session.last_active(),
            messages: session.messages(),
            last_error: session.last_error(),
        }
    }
}

/// Error type for HTTP server
#[derive(Debug)]
pub enum ApiError {
    Tutor(TutorError),
    MalformedBody(String),
}

impl From<TutorError> for ApiError {
    fn from(e: TutorError) -> Self {
        Self::Tutor(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MalformedBody(message) => {
                warn!(error = %message, "Rejected malformed request body");
                (StatusCode::BAD_REQUEST, message)
            }
            Self::Tutor(e @ TutorError::SessionNotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            Self::Tutor(e) if e.is_client_error() => {
                warn!(error = %e, "Rejected invalid request");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            Self::Tutor(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, ApiResponse::failure(message)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Build the router with every tutor route
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/ai/generate", post(handle_generate))
        .route("/api/ai/quiz", post(handle_quiz))
        .route("/api/ai/chat", post(handle_chat))
        .route("/api/ai/analyze", post(handle_analyze))
        .route("/api/ai/chat/sessions", post(create_session))
        .route("/api/ai/chat/sessions/:id", get(get_session).delete(delete_session))
        .route(
            "/api/ai/chat/sessions/:id/messages",
            post(send_session_message).delete(clear_session),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server and serve until ctrl-c
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Starting HTTP server on {}", addr);

    axum::Server::bind(&addr)
        .serve(router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start HTTP server: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "MentorIA is running"
}

async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let Json(request) = payload?;
    let content = state.service.generate(request).await?;
    Ok(Json(GenerateResponse {
        success: true,
        data: content.content,
        kind: content.kind,
        topic: content.topic,
    }))
}

async fn handle_quiz(
    State(state): State<AppState>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    Ok(ApiResponse::ok(state.service.generate_quiz(request).await?))
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    Ok(ApiResponse::ok(state.service.chat(request).await?))
}

async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    Ok(ApiResponse::ok(state.service.analyze(request).await?))
}

async fn create_session(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let evicted = state
        .sessions
        .cleanup_idle_sessions(state.session_idle_timeout)
        .await?;
    if evicted > 0 {
        info!(evicted, "Evicted idle chat sessions");
    }

    let session = state.sessions.create_session().await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(SessionCreated {
            id: session.id().to_string(),
        }),
    ))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let session = state.sessions.get_session(&id).await?;
    Ok(ApiResponse::ok(SessionView::from(session.as_ref())))
}

async fn send_session_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SessionMessageRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let session = state.sessions.get_session(&id).await?;
    let reply = state
        .service
        .send_in_session(
            &session,
            request.message.as_deref().unwrap_or_default(),
            request.context.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(reply))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.sessions.get_session(&id).await?.clear();
    Ok(ApiResponse::done())
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.sessions.delete_session(&id).await?;
    Ok(ApiResponse::done())
}
