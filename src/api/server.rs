//! # HTTP Server
//!
//! Axum-based server exposing the core engines. Caller identity arrives
//! pre-authenticated in `x-actor-id` / `x-actor-role` headers; this layer
//! runs the role gate and forwards to the engines, stamping `now` at the
//! boundary for the operations whose time the client does not supply.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use super::errors::{ApiError, ApiResult};
use super::request::{
    CreateTestRequest, EnterRequest, HistoryQuery, ReplaceBatchesRequest, RollbackRequest,
    TransitionRequest,
};
use super::response::{EnterResponse, HistoryResponse, PromoteResponse, TransitionResponse};
use crate::audit::{PromotionLedger, TransitionLog};
use crate::catalog::{Test, TestStatus, TestStore};
use crate::gate::{require_any_role, require_role, Actor, Role};
use crate::lifecycle::LifecycleController;
use crate::promotion::{PromoteRequest, PromotionEngine};
use crate::roster::RosterStore;
use crate::scheduler::BatchScheduler;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    pub host: String,
    /// Port to bind to (default: 7400)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7400,
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared engines and stores behind the routes.
pub struct AppState {
    pub store: Arc<TestStore>,
    pub roster: Arc<RosterStore>,
    pub ledger: Arc<PromotionLedger>,
    pub lifecycle: LifecycleController,
    pub scheduler: BatchScheduler,
    pub promotions: PromotionEngine,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Wire every engine over fresh in-memory stores.
    pub fn new() -> Self {
        Self::with_stores(
            Arc::new(TestStore::new()),
            Arc::new(RosterStore::new()),
            Arc::new(PromotionLedger::new()),
            Arc::new(TransitionLog::new()),
        )
    }

    /// Wire the engines over caller-provided stores (file-backed audit
    /// sinks, pre-seeded rosters).
    pub fn with_stores(
        store: Arc<TestStore>,
        roster: Arc<RosterStore>,
        ledger: Arc<PromotionLedger>,
        transitions: Arc<TransitionLog>,
    ) -> Self {
        Self {
            lifecycle: LifecycleController::new(store.clone(), transitions),
            scheduler: BatchScheduler::new(store.clone()),
            promotions: PromotionEngine::new(roster.clone(), ledger.clone()),
            store,
            roster,
            ledger,
        }
    }
}

/// HTTP server wrapping the router and bind address.
pub struct ApiServer {
    config: ServerConfig,
    router: Router,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self::with_config(state, ServerConfig::default())
    }

    pub fn with_config(state: Arc<AppState>, config: ServerConfig) -> Self {
        Self {
            config,
            router: router(state),
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .expect("invalid socket address");

        println!("Starting examhall HTTP server on {}", addr);
        println!("Health check: http://{}/health", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Build the router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tests", post(create_test))
        .route("/tests/:id/batches", put(replace_batches))
        .route("/tests/:id/transition", post(transition))
        .route("/tests/:id/enter", post(enter))
        .route("/promotions", post(promote))
        .route("/promotions/rollback", post(rollback))
        .route("/promotions/history", get(history))
        .layer(cors)
        .with_state(state)
}

/// Resolve the pre-authenticated caller from headers.
fn actor_from_headers(headers: &HeaderMap) -> ApiResult<Actor> {
    let id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingIdentity)?;
    let role = headers
        .get("x-actor-role")
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse)
        .ok_or(ApiError::MissingIdentity)?;
    Ok(Actor::new(id, role))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_test(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateTestRequest>,
) -> ApiResult<(StatusCode, Json<Test>)> {
    let actor = actor_from_headers(&headers)?;
    require_any_role(&actor, &[Role::Admin, Role::Teacher])?;

    let test = Test::draft(req.title, actor.id, Utc::now());
    state.store.insert(test.clone());
    Ok((StatusCode::CREATED, Json(test)))
}

async fn replace_batches(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<ReplaceBatchesRequest>,
) -> ApiResult<Json<Test>> {
    let actor = actor_from_headers(&headers)?;
    require_any_role(&actor, &[Role::Admin, Role::Teacher])?;

    let batches = req.batches.into_iter().map(|b| b.into_batch()).collect();
    let updated = state.store.replace_batches(id, batches)?;
    Ok(Json(updated))
}

async fn transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<Json<TransitionResponse>> {
    let actor = actor_from_headers(&headers)?;
    // Archiving is admin-only; every other transition is open to teachers.
    if req.to == TestStatus::Archived {
        require_role(&actor, Role::Admin)?;
    } else {
        require_any_role(&actor, &[Role::Admin, Role::Teacher])?;
    }

    let updated = state.lifecycle.transition(
        id,
        req.to,
        &actor,
        Utc::now(),
        req.force,
        req.expected_version,
    )?;
    Ok(Json(TransitionResponse {
        id: updated.id,
        status: updated.status,
        version: updated.version,
    }))
}

async fn enter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<EnterRequest>,
) -> ApiResult<Json<EnterResponse>> {
    let actor = actor_from_headers(&headers)?;
    require_role(&actor, Role::Student)?;

    let token = state
        .scheduler
        .authorize_entry(id, &req.student_id, req.now)?;
    Ok(Json(EnterResponse {
        token: token.token,
        batch_id: token.batch_id,
        expires_at: token.expires_at,
    }))
}

async fn promote(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PromoteRequest>,
) -> ApiResult<Json<PromoteResponse>> {
    let actor = actor_from_headers(&headers)?;
    require_role(&actor, Role::Admin)?;

    let record_ids = state.promotions.promote(&req, &actor, Utc::now())?;
    Ok(Json(PromoteResponse { record_ids }))
}

async fn rollback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RollbackRequest>,
) -> ApiResult<(StatusCode, Json<crate::promotion::RollbackReport>)> {
    let actor = actor_from_headers(&headers)?;
    require_role(&actor, Role::Admin)?;

    let report = state
        .promotions
        .rollback(&req.selector, &actor, Utc::now())?;
    // Per-record outcomes: full success is a plain 200, anything mixed is
    // a 207 so the caller inspects each entry.
    let status = if report.is_full_success() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}

async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let actor = actor_from_headers(&headers)?;
    require_any_role(&actor, &[Role::Admin, Role::Teacher])?;

    Ok(Json(HistoryResponse {
        records: state.ledger.history_for(&query.student_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_uses_default_port() {
        let server = ApiServer::new(Arc::new(AppState::new()));
        assert_eq!(server.socket_addr(), "0.0.0.0:7400");
    }

    #[test]
    fn test_actor_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-actor-id", "admin1".parse().unwrap());
        headers.insert("x-actor-role", "admin".parse().unwrap());

        let actor = actor_from_headers(&headers).unwrap();
        assert_eq!(actor.id, "admin1");
        assert_eq!(actor.role, Role::Admin);
    }

    #[test]
    fn test_actor_from_headers_rejects_missing_or_bad_role() {
        let headers = HeaderMap::new();
        assert!(matches!(
            actor_from_headers(&headers),
            Err(ApiError::MissingIdentity)
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-actor-id", "u1".parse().unwrap());
        headers.insert("x-actor-role", "superuser".parse().unwrap());
        assert!(matches!(
            actor_from_headers(&headers),
            Err(ApiError::MissingIdentity)
        ));
    }
}
