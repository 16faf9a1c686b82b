//! In-process stand-in for the public catalog, served by axum on a loopback
//! port so the real client code path is exercised end to end.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use dex_proto::{encode_record_json, CreatureRecord};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const RECORD_PATH: &str = "/api/v2/pokemon";
pub const SPRITE_PATH: &str = "/sprites";

/// Canned responses for the stub server.
#[derive(Debug, Default, Clone)]
pub struct StubScript {
    records: HashMap<u32, String>,
    malformed: HashSet<u32>,
    delays: HashMap<u32, Duration>,
    sprites: HashSet<u32>,
}

impl StubScript {
    pub fn record(mut self, id: u32, body: serde_json::Value) -> Self {
        self.records.insert(id, body.to_string());
        self
    }

    /// Serve an already-built record under its own id.
    pub fn encoded(mut self, record: &CreatureRecord) -> Result<Self> {
        self.records.insert(record.id, encode_record_json(record)?);
        Ok(self)
    }

    /// Answer `id` with a 200 whose body is not a record.
    pub fn malformed(mut self, id: u32) -> Self {
        self.malformed.insert(id);
        self
    }

    pub fn delay(mut self, id: u32, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Serve an animated sprite for `id`; every other sprite is a 404.
    pub fn sprite(mut self, id: u32) -> Self {
        self.sprites.insert(id);
        self
    }
}

pub struct StubCatalog {
    addr: SocketAddr,
    record_requests: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl StubCatalog {
    pub async fn start(script: StubScript) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let record_requests = Arc::new(AtomicUsize::new(0));
        let script = Arc::new(script);

        let app = router(StubState {
            script,
            record_requests: Arc::clone(&record_requests),
        });
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            record_requests,
            task,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{RECORD_PATH}", self.addr)
    }

    pub fn sprite_url(&self) -> String {
        format!("http://{}{SPRITE_PATH}", self.addr)
    }

    pub fn record_requests(&self) -> usize {
        self.record_requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubCatalog {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Catalog-shaped record body, including keys the viewer ignores.
pub fn creature_json(
    id: u32,
    name: &str,
    types: &[&str],
    abilities: &[&str],
    height: u32,
    weight: u32,
) -> serde_json::Value {
    let types: Vec<_> = types
        .iter()
        .enumerate()
        .map(|(idx, name)| json!({"slot": idx + 1, "type": {"name": name, "url": "https://pokeapi.co/api/v2/type/1/"}}))
        .collect();
    let abilities: Vec<_> = abilities
        .iter()
        .enumerate()
        .map(|(idx, name)| json!({"slot": idx + 1, "is_hidden": false, "ability": {"name": name}}))
        .collect();
    json!({
        "id": id,
        "name": name,
        "height": height,
        "weight": weight,
        "base_experience": 64,
        "order": id,
        "types": types,
        "abilities": abilities,
        "sprites": {
            "front_default": format!("https://img.example/front/{id}.png"),
            "other": {
                "official-artwork": {"front_default": format!("https://img.example/artwork/{id}.png")}
            }
        }
    })
}

#[derive(Clone)]
struct StubState {
    script: Arc<StubScript>,
    record_requests: Arc<AtomicUsize>,
}

fn router(state: StubState) -> Router {
    Router::new()
        .route(&format!("{RECORD_PATH}/:id"), get(serve_record))
        .route(&format!("{SPRITE_PATH}/:file"), get(serve_sprite))
        .with_state(state)
}

async fn serve_record(State(state): State<StubState>, Path(id): Path<u32>) -> Response {
    state.record_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = state.script.delays.get(&id) {
        tokio::time::sleep(*delay).await;
    }
    if state.script.malformed.contains(&id) {
        return (StatusCode::OK, Html("<html>catalog busy</html>")).into_response();
    }
    match state.script.records.get(&id) {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// `get` routes answer HEAD as well, with the body stripped.
async fn serve_sprite(State(state): State<StubState>, Path(file): Path<String>) -> Response {
    let id = file
        .strip_suffix(".gif")
        .and_then(|id| id.parse::<u32>().ok());
    match id {
        Some(id) if state.script.sprites.contains(&id) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/gif")],
            "GIF89a",
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
