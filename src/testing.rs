//! In-process stand-ins for the Ollama runtime and Colormind, used by unit tests.

use crate::{
    error::{GatewayError, Result},
    ollama::traits::{CompletionBackend, RuntimeLauncher},
};
use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FakeRuntime {
    ready: Arc<AtomicBool>,
    tags_hits: Arc<AtomicUsize>,
    chat_status: u16,
    chat_body: Value,
    chat_requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeRuntime {
    pub fn ready() -> Self {
        Self::with_ready(true)
    }

    pub fn not_ready() -> Self {
        Self::with_ready(false)
    }

    fn with_ready(ready: bool) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(ready)),
            tags_hits: Arc::new(AtomicUsize::new(0)),
            chat_status: 200,
            chat_body: chat_body("ok"),
            chat_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_chat_reply(mut self, content: &str) -> Self {
        self.chat_status = 200;
        self.chat_body = chat_body(content);
        self
    }

    pub fn with_chat_status(mut self, status: u16, body: Value) -> Self {
        self.chat_status = status;
        self.chat_body = body;
        self
    }

    pub fn ready_flag(&self) -> Arc<AtomicBool> {
        self.ready.clone()
    }

    pub fn tags_hits(&self) -> usize {
        self.tags_hits.load(Ordering::SeqCst)
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.chat_requests.lock().unwrap().clone()
    }
}

fn chat_body(content: &str) -> Value {
    json!({
        "model": "deepseek-r1:7b",
        "created_at": "2024-01-01T00:00:00Z",
        "message": { "role": "assistant", "content": content },
        "done": true,
        "done_reason": "stop",
        "eval_count": 3
    })
}

async fn tags(state: web::Data<FakeRuntime>) -> HttpResponse {
    state.tags_hits.fetch_add(1, Ordering::SeqCst);
    if state.ready.load(Ordering::SeqCst) {
        HttpResponse::Ok().json(json!({ "models": [{ "name": "deepseek-r1:7b", "size": 1 }] }))
    } else {
        HttpResponse::ServiceUnavailable().finish()
    }
}

async fn chat(state: web::Data<FakeRuntime>, body: web::Json<Value>) -> HttpResponse {
    state.chat_requests.lock().unwrap().push(body.into_inner());
    let status = StatusCode::from_u16(state.chat_status).unwrap();
    HttpResponse::build(status).json(state.chat_body.clone())
}

/// Serves the fake runtime on an ephemeral port and returns its base URL.
/// Must be called from inside an actix system (e.g. `#[actix_web::test]`).
pub fn spawn_runtime(fake: FakeRuntime) -> String {
    let data = web::Data::new(fake);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/api/tags", web::get().to(tags))
            .route("/api/chat", web::post().to(chat))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

#[derive(Clone)]
pub enum ColormindReply {
    Json(Value),
    Html,
    Status(u16),
}

async fn colormind(reply: web::Data<ColormindReply>) -> HttpResponse {
    match reply.get_ref() {
        ColormindReply::Json(body) => HttpResponse::Ok().json(body.clone()),
        ColormindReply::Html => HttpResponse::Ok()
            .content_type("text/html")
            .body("<html><body>Service unavailable</body></html>"),
        ColormindReply::Status(code) => {
            HttpResponse::build(StatusCode::from_u16(*code).unwrap()).finish()
        }
    }
}

/// Serves a fake Colormind `/api/` endpoint and returns its base URL.
pub fn spawn_colormind(reply: ColormindReply) -> String {
    let data = web::Data::new(reply);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/api/", web::post().to(colormind))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

/// A base URL on a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Backend that answers every prompt with a canned result.
pub struct StubBackend {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn ok(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(GatewayError::RequestError)
    }
}

/// Launcher that counts calls and optionally flips a fake runtime to ready.
#[derive(Clone, Default)]
pub struct CountingLauncher {
    launches: Arc<AtomicUsize>,
    makes_ready: Option<Arc<AtomicBool>>,
    fail_with: Option<String>,
}

impl CountingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn making_ready(flag: Arc<AtomicBool>) -> Self {
        Self {
            makes_ready: Some(flag),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuntimeLauncher for CountingLauncher {
    async fn launch(&self) -> Result<()> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(GatewayError::RuntimeError(message.clone()));
        }
        if let Some(flag) = &self.makes_ready {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}
