use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{sync::RwLock, task::JoinHandle};

// base64("admin:secret"), what reqwest sends for the test credentials
const EXPECTED_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

pub struct StoreState {
    pub snapshot: Value,
    pub listing: Vec<Value>,
    pub players: HashMap<u32, String>,
    pub fail_posts: bool,
    pub updates: Vec<Value>,
}

/// Mock of the remote content store. GETs serve the in-memory
/// snapshot/roster; authorized POSTs are deep-merged into the snapshot
/// the way the real store merges partial updates.
pub struct RemoteStore {
    port: u16,
    handles: Vec<JoinHandle<()>>,
}

impl Drop for RemoteStore {
    fn drop(&mut self) {
        for e in &self.handles {
            e.abort();
        }
    }
}

impl RemoteStore {
    pub fn new(port: u16) -> RemoteStore {
        RemoteStore { port, handles: vec![] }
    }

    pub fn get_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub async fn start(&mut self, snapshot: Value) -> Arc<RwLock<StoreState>> {
        let state = Arc::new(RwLock::new(StoreState {
            snapshot,
            listing: vec![],
            players: HashMap::new(),
            fail_posts: false,
            updates: vec![],
        }));

        let handle = {
            let state = state.clone();
            let port = self.port;
            tokio::spawn(async move { RemoteStore::serve(state, port).await })
        };
        self.handles.push(handle);

        tokio::time::sleep(Duration::from_millis(500)).await; // wait for mock to start
        state
    }

    async fn serve(state: Arc<RwLock<StoreState>>, port: u16) {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let app = Router::new()
            .route("/events", get(RemoteStore::get_events))
            .route("/events/:id", get(RemoteStore::get_event).post(RemoteStore::post_event))
            .route("/players", get(RemoteStore::get_players))
            .route("/players/:id", get(RemoteStore::get_player))
            .with_state(state);

        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .unwrap();
    }

    async fn get_events(State(state): State<Arc<RwLock<StoreState>>>) -> impl IntoResponse {
        Json(Value::Array(state.read().await.listing.clone()))
    }

    async fn get_event(
        Path(_id): Path<String>,
        State(state): State<Arc<RwLock<StoreState>>>,
    ) -> impl IntoResponse {
        Json(state.read().await.snapshot.clone())
    }

    async fn post_event(
        Path(_id): Path<String>,
        State(state): State<Arc<RwLock<StoreState>>>,
        headers: HeaderMap,
        Json(payload): Json<Value>,
    ) -> impl IntoResponse {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == EXPECTED_AUTH)
            .unwrap_or(false);
        if !authorized {
            return StatusCode::UNAUTHORIZED;
        }

        let mut safe_state = state.write().await;
        if safe_state.fail_posts {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        safe_state.updates.push(payload.clone());
        let mut merged = safe_state.snapshot.clone();
        deep_merge(&mut merged, payload);
        safe_state.snapshot = merged;
        StatusCode::OK
    }

    async fn get_players(State(state): State<Arc<RwLock<StoreState>>>) -> impl IntoResponse {
        let players: Vec<Value> = state
            .read()
            .await
            .players
            .iter()
            .map(|(id, name)| json!({ "id": id, "title": { "rendered": name } }))
            .collect();
        Json(Value::Array(players))
    }

    async fn get_player(
        Path(id): Path<u32>,
        State(state): State<Arc<RwLock<StoreState>>>,
    ) -> impl IntoResponse {
        match state.read().await.players.get(&id) {
            Some(name) => Ok(Json(json!({ "id": id, "title": { "rendered": name } }))),
            None => Err(StatusCode::NOT_FOUND),
        }
    }
}

// objects merge key by key, everything else is replaced
fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                deep_merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}
