use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use evinet_core::db::open_db;
use evinet_server::{open_repository, router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_node(app: &Router, description: &str, prior: f64) -> Value {
    let (status, node) = send(
        app,
        Method::POST,
        "/nodes",
        Some(json!({"description": description, "prior_probability": prior})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    node
}

fn memory_app() -> Router {
    router(AppState::in_memory())
}

#[tokio::test]
async fn health_reports_version() {
    let (status, body) = send(&memory_app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], evinet_core::core_version());
}

#[tokio::test]
async fn node_lifecycle_with_cascade() {
    let app = memory_app();
    let a = create_node(&app, "A", 0.5).await;
    let b = create_node(&app, "B", 0.25).await;
    assert_eq!(a["description"], "A");
    assert!(a["id"].is_string());

    let (status, edge) = send(
        &app,
        Method::POST,
        "/edges",
        Some(json!({"source": a["id"], "target": b["id"], "weight": 0.7})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(edge["weight"], 0.7);

    let uri = format!("/nodes/{}", a["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, again) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(again, Value::Null);

    let (_, nodes) = send(&app, Method::GET, "/nodes", None).await;
    assert_eq!(nodes, json!([b]));
    let (_, edges) = send(&app, Method::GET, "/edges", None).await;
    assert_eq!(edges, json!([]));
}

#[tokio::test]
async fn patch_merges_and_ignores_id() {
    let app = memory_app();
    let node = create_node(&app, "Rain", 0.125).await;
    let uri = format!("/nodes/{}", node["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"description": "Storm", "id": "00000000-0000-0000-0000-000000000000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], node["id"]);
    assert_eq!(updated["description"], "Storm");
    assert_eq!(updated["prior_probability"], 0.125);

    let missing = format!("/nodes/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::PATCH, &missing, Some(json!({"description": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("not found"));

    let (status, _) = send(&app, Method::PATCH, "/nodes/not-a-uuid", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_input_is_rejected_with_reason() {
    let app = memory_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/nodes",
        Some(json!({"description": "x", "prior_probability": 1.5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("prior_probability"));

    let a = create_node(&app, "A", 0.5).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/edges",
        Some(json!({"source": a["id"], "target": a["id"], "weight": "heavy"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/edges",
        Some(json!({"source": a["id"], "target": uuid::Uuid::new_v4(), "weight": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, nodes) = send(&app, Method::GET, "/nodes", None).await;
    assert_eq!(nodes.as_array().unwrap().len(), 1);
    let (_, edges) = send(&app, Method::GET, "/edges", None).await;
    assert_eq!(edges, json!([]));
}

#[tokio::test]
async fn edge_patch_and_delete() {
    let app = memory_app();
    let a = create_node(&app, "A", 0.5).await;
    let b = create_node(&app, "B", 0.5).await;
    let (_, edge) = send(
        &app,
        Method::POST,
        "/edges",
        Some(json!({"source": a["id"], "target": b["id"], "weight": 1.0})),
    )
    .await;
    let uri = format!("/edges/{}", edge["id"].as_str().unwrap());

    let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({"weight": -2.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["weight"], -2.5);
    assert_eq!(updated["source"], a["id"]);

    assert_eq!(send(&app, Method::DELETE, &uri, None).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, Method::DELETE, &uri, None).await.0, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"weight": 1.0}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn network_snapshots() {
    let app = memory_app();
    let a = create_node(&app, "A", 0.5).await;
    let payload = json!({"name": "Flood", "nodes": [a], "edges": []});

    let (status, saved) = send(&app, Method::POST, "/api/networks", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/networks/{}", saved["id"].as_str().unwrap());

    let (status, summaries) = send(&app, Method::GET, "/api/networks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summaries[0]["name"], "Flood");
    assert_eq!(summaries[0]["node_count"], 1);

    let (status, loaded) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["nodes"], json!([a]));

    let (status, replaced) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "Flood v2", "nodes": [], "edges": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["name"], "Flood v2");
    assert_eq!(send(&app, Method::GET, &uri, None).await.1["nodes"], json!([]));

    let missing = format!("/api/networks/{}", uuid::Uuid::new_v4());
    assert_eq!(send(&app, Method::GET, &missing, None).await.0, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::PUT,
        &missing,
        Some(json!({"name": "x", "nodes": [], "edges": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/networks",
        Some(json!({"name": "  ", "nodes": [], "edges": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sqlite_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        db_path: Some(dir.path().join("data").join("graph.db")),
        ..ServerConfig::default()
    };

    let first = router(AppState::new(open_repository(&config).unwrap()));
    let node = create_node(&first, "Persisted", 0.9).await;
    drop(first);

    let second = router(AppState::new(open_repository(&config).unwrap()));
    let (_, nodes) = send(&second, Method::GET, "/nodes", None).await;
    assert_eq!(nodes, json!([node]));

    // The file is a regular migrated database.
    assert!(open_db(dir.path().join("data").join("graph.db")).is_ok());
}
