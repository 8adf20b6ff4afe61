//! HTTP surface of the graph store.
//!
//! # Responsibility
//! - Map the node, edge and network RPCs onto `GraphService`.
//! - Translate service errors into status codes with a `{"message"}` body.
//!
//! # Invariants
//! - Creates answer 201, deletes answer 204 with no body.
//! - Deletes are idempotent and never report cascade details.
//! - Store calls run on the blocking pool; handlers never hold store locks
//!   across an await.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use evinet_core::{
    core_version, Edge, EdgePatch, GraphError, GraphRepository, GraphResult, GraphService,
    InMemoryGraphRepository, Network, NetworkSummary, Node, NodeId, NodePatch,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Repository type erased behind the HTTP state.
pub type DynGraphRepository = Box<dyn GraphRepository + Send + Sync>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<GraphService<DynGraphRepository>>,
}

impl AppState {
    pub fn new(repo: DynGraphRepository) -> Self {
        Self {
            service: Arc::new(GraphService::new(repo)),
        }
    }

    /// State backed by a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryGraphRepository::new()))
    }

    pub fn service(&self) -> &GraphService<DynGraphRepository> {
        &self.service
    }

    async fn call<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&GraphService<DynGraphRepository>) -> GraphResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || op(&service))
            .await
            .map_err(|err| ApiError::internal(format!("store task failed: {err}")))?
            .map_err(ApiError::from)
    }
}

/// Error response: status plus human-readable reason.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        let status = match &err {
            GraphError::Validation(_) => StatusCode::BAD_REQUEST,
            GraphError::NotFound(_) => StatusCode::NOT_FOUND,
            GraphError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_response module=http status=error code={} error={}",
                self.status.as_u16(),
                self.message
            );
        } else {
            warn!(
                "event=http_response module=http status=rejected code={}",
                self.status.as_u16()
            );
        }
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Ids are opaque to clients; one that does not parse names no record.
fn record_id(kind: &str, path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id).map_err(|_| ApiError {
        status: StatusCode::NOT_FOUND,
        message: format!("{kind} not found"),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    pub description: String,
    pub prior_probability: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateEdgeRequest {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

/// Body of network create and overwrite.
#[derive(Debug, Deserialize)]
pub struct NetworkRequest {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/nodes", get(list_nodes).post(create_node))
        .route("/nodes/:id", patch(update_node).delete(delete_node))
        .route("/edges", get(list_edges).post(create_edge))
        .route("/edges/:id", patch(update_edge).delete(delete_edge))
        .route("/api/networks", get(list_networks).post(save_network))
        .route("/api/networks/:id", get(load_network).put(update_network))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: core_version(),
    })
}

async fn list_nodes(State(state): State<AppState>) -> ApiResult<Json<Vec<Node>>> {
    Ok(Json(state.call(|service| service.list_nodes()).await?))
}

async fn create_node(
    State(state): State<AppState>,
    body: Result<Json<CreateNodeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Node>)> {
    let Json(request) = body?;
    let node = state
        .call(move |service| service.create_node(request.description, request.prior_probability))
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn update_node(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<NodePatch>, JsonRejection>,
) -> ApiResult<Json<Node>> {
    let id = record_id("node", path)?;
    let Json(patch) = body?;
    Ok(Json(
        state
            .call(move |service| service.update_node(id, &patch))
            .await?,
    ))
}

async fn delete_node(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = record_id("node", path)?;
    state.call(move |service| service.delete_node(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_edges(State(state): State<AppState>) -> ApiResult<Json<Vec<Edge>>> {
    Ok(Json(state.call(|service| service.list_edges()).await?))
}

async fn create_edge(
    State(state): State<AppState>,
    body: Result<Json<CreateEdgeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Edge>)> {
    let Json(request) = body?;
    let edge = state
        .call(move |service| service.create_edge(request.source, request.target, request.weight))
        .await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

async fn update_edge(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<EdgePatch>, JsonRejection>,
) -> ApiResult<Json<Edge>> {
    let id = record_id("edge", path)?;
    let Json(patch) = body?;
    Ok(Json(
        state
            .call(move |service| service.update_edge(id, &patch))
            .await?,
    ))
}

async fn delete_edge(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = record_id("edge", path)?;
    state.call(move |service| service.delete_edge(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_networks(State(state): State<AppState>) -> ApiResult<Json<Vec<NetworkSummary>>> {
    Ok(Json(state.call(|service| service.list_networks()).await?))
}

async fn save_network(
    State(state): State<AppState>,
    body: Result<Json<NetworkRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Network>)> {
    let Json(request) = body?;
    let network = state
        .call(move |service| service.save_network(request.name, request.nodes, request.edges))
        .await?;
    Ok((StatusCode::CREATED, Json(network)))
}

async fn load_network(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Network>> {
    let id = record_id("network", path)?;
    Ok(Json(state.call(move |service| service.load_network(id)).await?))
}

async fn update_network(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<NetworkRequest>, JsonRejection>,
) -> ApiResult<Json<Network>> {
    let id = record_id("network", path)?;
    let Json(request) = body?;
    Ok(Json(
        state
            .call(move |service| {
                service.update_network(id, request.name, request.nodes, request.edges)
            })
            .await?,
    ))
}
