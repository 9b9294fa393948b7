use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::{Value, json};

use super::*;
use crate::config::{BridgeTimeouts, LayoutKeying};

// =========================================================================
// Fake layout service
// =========================================================================

#[derive(Clone, Default)]
struct FakeStore {
    layouts: Arc<Mutex<HashMap<String, Value>>>,
    posts: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeStore {
    fn seed(&self, key: &str, body: Value) {
        self.layouts.lock().unwrap().insert(key.to_owned(), body);
    }

    fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

fn respond(store: &FakeStore, key: &str) -> Response {
    match key {
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "html" => (StatusCode::OK, "<html></html>").into_response(),
        "empty" => StatusCode::OK.into_response(),
        _ => match store.layouts.lock().unwrap().get(key) {
            Some(body) => Json(body.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
    }
}

fn record(store: &FakeStore, key: String, body: Value) -> Response {
    if key == "broken" {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    store.posts.lock().unwrap().push((key.clone(), body.clone()));
    store.layouts.lock().unwrap().insert(key, body);
    Json(json!({ "ok": true })).into_response()
}

async fn get_unit(State(store): State<FakeStore>, Path(id): Path<String>) -> Response {
    respond(&store, &id)
}

async fn post_unit(State(store): State<FakeStore>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record(&store, id, body)
}

async fn get_project(State(store): State<FakeStore>, Path(id): Path<String>) -> Response {
    respond(&store, &format!("{id}/layout"))
}

async fn post_project(State(store): State<FakeStore>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record(&store, format!("{id}/layout"), body)
}

/// Serve the fake on an ephemeral port and return its API base URL.
async fn spawn_fake(store: FakeStore) -> String {
    let app = Router::new()
        .route("/api/admin/plot-units/{id}", get(get_unit).post(post_unit))
        .route("/api/admin/plot-units/{id}/layout", get(get_project).post(post_project))
        .with_state(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/admin")
}

fn client(base_url: &str, keying: LayoutKeying) -> HttpLayoutService {
    HttpLayoutService::new(BridgeConfig::new(base_url, keying, BridgeTimeouts::default())).unwrap()
}

fn stored_layout() -> Value {
    json!({
        "property_id": 17,
        "layout": [
            {
                "element_id": "E-1", "plot_project_id": "17", "type": "plot",
                "x": "100", "y": "100", "width": "60", "height": "80",
                "status": "booked", "name": "A-1", "plot_number": "1", "visible": true
            },
            {
                "plot_unit_id": "UNIT-2", "type": "road",
                "x": 0, "y": 200, "width": 400, "height": 40, "rotation": null, "name": "Main Road"
            }
        ]
    })
}

// =========================================================================
// Load
// =========================================================================

#[tokio::test]
async fn load_property_keyed_layout() {
    let store = FakeStore::default();
    store.seed("17", stored_layout());
    let base = spawn_fake(store).await;

    let elements = client(&base, LayoutKeying::Property).load_layout("17").await.unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].id, "E-1");
    assert!((elements[0].x - 100.0).abs() < f64::EPSILON);
    assert_eq!(elements[1].id, "UNIT-2");
    assert!(elements[1].rotation.abs() < f64::EPSILON);
}

#[tokio::test]
async fn load_project_keyed_layout() {
    let store = FakeStore::default();
    store.seed("9/layout", json!([{ "plot_unit_id": "UNIT-1", "type": "text", "name": "North" }]));
    let base = spawn_fake(store).await;

    let elements = client(&base, LayoutKeying::Project).load_layout("9").await.unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].label, "North");

    // The property-keyed resource does not exist for this id.
    let err = client(&base, LayoutKeying::Property).load_layout("9").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn load_empty_body_is_empty_layout() {
    let base = spawn_fake(FakeStore::default()).await;
    let elements = client(&base, LayoutKeying::Property).load_layout("empty").await.unwrap();
    assert!(elements.is_empty());
}

#[tokio::test]
async fn load_missing_layout_is_not_found() {
    let base = spawn_fake(FakeStore::default()).await;
    let err = client(&base, LayoutKeying::Property).load_layout("404").await.unwrap_err();
    assert!(matches!(err, BridgeError::Status { status: 404, .. }));
}

#[tokio::test]
async fn load_server_error_carries_body() {
    let base = spawn_fake(FakeStore::default()).await;
    let err = client(&base, LayoutKeying::Property).load_layout("broken").await.unwrap_err();
    match err {
        BridgeError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn load_non_json_is_parse_error() {
    let base = spawn_fake(FakeStore::default()).await;
    let err = client(&base, LayoutKeying::Property).load_layout("html").await.unwrap_err();
    assert!(matches!(err, BridgeError::Parse(_)));
}

#[tokio::test]
async fn load_wrong_shape_is_shape_error() {
    let store = FakeStore::default();
    store.seed("3", json!({ "name": "Green Valley" }));
    let base = spawn_fake(store).await;
    let err = client(&base, LayoutKeying::Property).load_layout("3").await.unwrap_err();
    assert!(matches!(err, BridgeError::Shape(_)));
}

#[tokio::test]
async fn unreachable_service_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/api/admin"), LayoutKeying::Property)
        .load_layout("1")
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Request(_)));
}

// =========================================================================
// Save
// =========================================================================

#[tokio::test]
async fn save_posts_whole_layout() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    let svc = client(&base, LayoutKeying::Property);

    let elements = crate::wire::parse_layout(json!([
        { "plot_unit_id": "b", "type": "plot" },
        { "plot_unit_id": "a", "type": "road" }
    ]))
    .unwrap();
    svc.save_layout("17", &elements).await.unwrap();

    let posts = store.posts();
    assert_eq!(posts.len(), 1);
    let (key, body) = &posts[0];
    assert_eq!(key, "17");
    let ids: Vec<&str> = body["elements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["plot_unit_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["b", "a"]);
}

#[tokio::test]
async fn save_uses_project_layout_path() {
    let store = FakeStore::default();
    let base = spawn_fake(store.clone()).await;
    client(&base, LayoutKeying::Project).save_layout("9", &[]).await.unwrap();

    let posts = store.posts();
    assert_eq!(posts[0].0, "9/layout");
    assert_eq!(posts[0].1, json!({ "elements": [] }));
}

#[tokio::test]
async fn save_failure_is_status_error() {
    let base = spawn_fake(FakeStore::default()).await;
    let err = client(&base, LayoutKeying::Property).save_layout("broken", &[]).await.unwrap_err();
    assert!(matches!(err, BridgeError::Status { status: 502, .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn load_then_save_round_trips() {
    let store = FakeStore::default();
    store.seed("17", stored_layout());
    let base = spawn_fake(store.clone()).await;
    let svc = client(&base, LayoutKeying::Property);

    let loaded = svc.load_layout("17").await.unwrap();
    svc.save_layout("17", &loaded).await.unwrap();

    let saved = &store.posts()[0].1["elements"];
    assert_eq!(saved[0]["plot_unit_id"], "E-1");
    assert_eq!(saved[0]["plot_project_id"], "17");
    assert_eq!(saved[0]["status"], "booked");
    assert_eq!(saved[0]["name"], "A-1");
    assert_eq!(saved[0]["x"], 100.0);
    assert_eq!(saved[1]["rotation"], 0.0);

    // The stored layout now loads back to the same elements.
    let reloaded = svc.load_layout("17").await.unwrap();
    assert_eq!(reloaded, loaded);
}
