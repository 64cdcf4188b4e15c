//! HTTP gateway for ScoutClaw.
//!
//! Routes:
//! - `GET /`: embedded single-page frontend
//! - `GET /health`: liveness, version and provider reachability
//! - `POST /run`: run one task, optionally inside a session
//!
//! Sessions are a presentation concern: earlier turns are rendered in front
//! of the task before the run, and the new turn is appended afterwards. The
//! agent loop itself is stateless across requests.
//!
//! Built on Axum.

pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use scoutclaw_agent::AgentLoop;
use scoutclaw_config::AppConfig;
use scoutclaw_core::provider::Provider;
use scoutclaw_memory::{KeyValueStore, SessionStore, SessionTurn, VectorIndex, render_context};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<AgentLoop>,
    pub provider: Arc<dyn Provider>,
    /// `None` when sessions are disabled.
    pub sessions: Option<SessionStore>,
    /// Earlier turns rendered in front of a session task.
    pub history_turns: usize,
}

impl GatewayState {
    /// Wire the default tools and an agent loop around `provider`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let tools = Arc::new(scoutclaw_tools::default_registry(
            provider.clone(),
            Arc::new(KeyValueStore::new()),
            Arc::new(VectorIndex::new()),
            config,
        ));
        let agent = AgentLoop::from_config(provider.clone(), tools, config)
            .with_max_steps(config.gateway.max_steps);

        Self {
            agent: Arc::new(agent),
            provider,
            sessions: config
                .sessions
                .enabled
                .then(|| SessionStore::new(config.sessions.resolved_dir())),
            history_turns: config.sessions.history_turns,
        }
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/run", post(run_handler))
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Fails before binding when the configured provider has no API key.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let providers = scoutclaw_providers::build_from_config(&config)?;
    let provider = providers.default().ok_or_else(|| {
        format!(
            "default provider '{}' is not available",
            config.default_provider
        )
    })?;

    let state = Arc::new(GatewayState::from_config(provider, &config));
    if let Some(sessions) = &state.sessions {
        info!(dir = %sessions.dir().display(), "Sessions enabled");
    }

    // Same-origin by default; the embedded page is served from this address.
    let mut cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);
    if let Ok(origin) = format!("http://{addr}").parse::<axum::http::HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    let app = build_router(state).layer(cors);

    info!(addr = %addr, model = %config.default_model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: ProviderHealth,
}

#[derive(Serialize)]
struct ProviderHealth {
    name: String,
    reachable: bool,
}

/// The gateway itself is up whenever this answers; an unreachable
/// provider is reported, not turned into an error status.
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let reachable = match state.provider.health_check().await {
        Ok(up) => up,
        Err(e) => {
            warn!(provider = %state.provider.name(), error = %e, "Provider health check failed");
            false
        }
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: ProviderHealth {
            name: state.provider.name().to_string(),
            reachable,
        },
    })
}

#[derive(Deserialize)]
struct RunRequest {
    task: String,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    reset: bool,
}

#[derive(Serialize)]
struct RunResponse {
    result: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

async fn run_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    let task = payload.task.trim();
    if task.is_empty() {
        return Err(bad_request("'task' must not be empty"));
    }

    let run_id = uuid::Uuid::new_v4();
    let session = match (&state.sessions, payload.session_id.as_deref()) {
        (Some(store), Some(id)) if !id.is_empty() => {
            SessionStore::validate_id(id).map_err(|e| bad_request(e.to_string()))?;
            Some((store, id))
        }
        _ => None,
    };

    info!(
        run_id = %run_id,
        task_len = task.len(),
        session = session.map(|(_, id)| id).unwrap_or("-"),
        "Run requested"
    );

    let prompt_task = match session {
        Some((store, id)) => {
            if payload.reset {
                if let Err(e) = store.reset(id).await {
                    warn!(run_id = %run_id, error = %e, "Session reset failed");
                }
            }
            let turns = store.load(id).await.unwrap_or_else(|e| {
                warn!(run_id = %run_id, error = %e, "Session load failed, continuing without history");
                Vec::new()
            });
            render_context(&turns, task, state.history_turns)
        }
        None => task.to_string(),
    };

    let outcome = state.agent.run(&prompt_task).await;
    info!(
        run_id = %run_id,
        termination = outcome.termination.as_str(),
        llm_calls = outcome.llm_calls,
        "Run finished"
    );

    if let Some((store, id)) = session {
        if let Err(e) = store.append(id, &SessionTurn::new(task, &outcome.answer)).await {
            error!(run_id = %run_id, error = %e, "Failed to record session turn");
        }
    }

    Ok(Json(RunResponse {
        result: outcome.answer,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use scoutclaw_core::error::ProviderError;
    use scoutclaw_core::message::Message;
    use scoutclaw_core::provider::{ProviderRequest, ProviderResponse};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Replies with a fixed script and records the user messages it saw.
    struct ScriptedProvider {
        replies: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: replies.iter().map(|s| s.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn user_prompts(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(request.messages[1].content.clone());
            let reply = self.replies[(seen.len() - 1) % self.replies.len()].clone();
            Ok(ProviderResponse {
                message: Message::assistant(reply),
                usage: None,
                model: request.model,
            })
        }
    }

    /// A provider whose endpoint cannot be reached.
    struct DownProvider;

    #[async_trait]
    impl Provider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }

        async fn health_check(&self) -> Result<bool, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    fn test_state(provider: Arc<dyn Provider>, sessions_dir: &std::path::Path) -> SharedState {
        let mut config = AppConfig::default();
        config.sessions.dir = Some(sessions_dir.to_path_buf());
        config.agent.auto_preflight = false;
        Arc::new(GatewayState::from_config(provider, &config))
    }

    fn post_run(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/run")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedProvider::new(&["{}"]), dir.path()));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["provider"]["name"], "scripted");
        assert_eq!(body["provider"]["reachable"], true);
    }

    #[tokio::test]
    async fn unreachable_provider_is_reported_by_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(Arc::new(DownProvider), dir.path()));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"]["name"], "down");
        assert_eq!(body["provider"]["reachable"], false);
    }

    #[tokio::test]
    async fn index_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedProvider::new(&["{}"]), dir.path()));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn run_returns_result() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ScriptedProvider::new(&[
            "{\"tool\": \"calculator\", \"args\": {\"expression\": \"3*7+2\"}}",
            "{\"final\": \"23\"}",
        ]);
        let app = build_router(test_state(provider, dir.path()));

        let response = app
            .oneshot(post_run(serde_json::json!({"task": "Compute 3*7+2"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({"result": "23"}));
    }

    #[tokio::test]
    async fn session_history_is_prepended_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ScriptedProvider::new(&["{\"final\": \"noted\"}"]);
        let app = build_router(test_state(provider.clone(), dir.path()));

        for body in [
            serde_json::json!({"task": "My topic is RLHF", "session_id": "s1"}),
            serde_json::json!({"task": "Summarize my topic", "session_id": "s1"}),
            serde_json::json!({"task": "Start over", "session_id": "s1", "reset": true}),
        ] {
            let response = app.clone().oneshot(post_run(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let prompts = provider.user_prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with("Task: My topic is RLHF"));
        assert!(prompts[1].contains("User: My topic is RLHF\nAgent: noted"));
        assert!(prompts[1].contains("Current task: Summarize my topic"));
        assert!(prompts[2].starts_with("Task: Start over"));

        // Only the post-reset turn remains on disk.
        let turns = SessionStore::new(dir.path()).load("s1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].task, "Start over");
    }

    #[tokio::test]
    async fn invalid_session_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ScriptedProvider::new(&["{\"final\": \"x\"}"]);
        let app = build_router(test_state(provider.clone(), dir.path()));

        let response = app
            .oneshot(post_run(serde_json::json!({"task": "hi", "session_id": "../../etc"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("Invalid session id"));
        assert!(provider.user_prompts().is_empty());
    }

    #[tokio::test]
    async fn empty_task_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedProvider::new(&["{}"]), dir.path()));
        let response = app
            .oneshot(post_run(serde_json::json!({"task": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedProvider::new(&["{}"]), dir.path()));
        let huge = "x".repeat(MAX_BODY_BYTES + 1);
        let response = app
            .oneshot(post_run(serde_json::json!({"task": huge})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
