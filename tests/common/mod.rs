//! Common test utilities
//!
//! A small OpenAI-compatible mock server on a random local port. Routes:
//! - `GET  /v1/models`            model list
//! - `POST /v1/chat/completions`  canned completion (401 for key `bad-key`)
//! - `*    /v1/echo`              echoes method, headers and body as JSON
//! - `*    /v1/status/<code>`     replies with that status and an error body
//! - `*    /v1/empty`             200 with an empty body
//! - `*    /v1/slow`              replies after two seconds

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mock server that stops when dropped
pub struct MockServer {
    server: Arc<Server>,
    thread: Option<JoinHandle<()>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    port: u16,
}

impl MockServer {
    pub fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("Failed to bind mock server"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("Mock server is not on an IP socket")
            .port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let thread = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            std::thread::spawn(move || {
                while let Ok(mut request) = server.recv() {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let recorded = Recorded {
                        method: request.method().to_string(),
                        url: request.url().to_string(),
                        headers: request
                            .headers()
                            .iter()
                            .map(|h| (h.field.to_string(), h.value.to_string()))
                            .collect(),
                        body,
                    };
                    requests.lock().unwrap().push(recorded.clone());

                    let (status, reply) = route(&recorded);
                    let response = Response::from_string(reply)
                        .with_status_code(status)
                        .with_header(
                            "Content-Type: application/json"
                                .parse::<Header>()
                                .unwrap(),
                        );
                    let _ = request.respond(response);
                }
            })
        };

        MockServer {
            server,
            thread: Some(thread),
            requests,
            port,
        }
    }

    /// Base URL including the `/v1` prefix
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/v1", self.port)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("Mock server saw no requests")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn error_body(message: &str) -> String {
    json!({ "error": { "message": message, "type": "invalid_request_error" } }).to_string()
}

fn route(request: &Recorded) -> (u16, String) {
    let path = request.url.split('?').next().unwrap_or_default();

    if let Some(code) = path.strip_prefix("/v1/status/") {
        let code: u16 = code.parse().unwrap_or(500);
        return (code, error_body(&format!("mock status {code}")));
    }

    match path {
        "/v1/models" if request.method == "GET" => (
            200,
            json!({
                "object": "list",
                "data": [
                    { "id": "test-model", "object": "model", "owned_by": "mock" },
                    { "id": "mock-model", "object": "model" }
                ]
            })
            .to_string(),
        ),
        "/v1/chat/completions" if request.method == "POST" => chat(request),
        "/v1/echo" => (
            200,
            json!({
                "method": request.method,
                "body": request.body,
                "content_type": request.header("Content-Type"),
                "authorization": request.header("Authorization"),
            })
            .to_string(),
        ),
        "/v1/empty" => (200, String::new()),
        "/v1/slow" => {
            std::thread::sleep(Duration::from_secs(2));
            (200, "{}".to_string())
        }
        _ => (404, error_body("not found")),
    }
}

fn chat(request: &Recorded) -> (u16, String) {
    if request.header("Authorization") == Some("Bearer bad-key") {
        return (401, error_body("Incorrect API key provided"));
    }
    let data: Value = match serde_json::from_str(&request.body) {
        Ok(data) => data,
        Err(e) => return (400, error_body(&e.to_string())),
    };
    let prompt = data["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default();
    let model = data["model"].as_str().unwrap_or("test-model");

    (
        200,
        json!({
            "id": "mock-response",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "message": { "role": "assistant", "content": format!("Mock response to: {prompt}") },
                "finish_reason": "stop"
            }]
        })
        .to_string(),
    )
}
