//! In-memory engine for tests and offline development.
//!
//! Replies are scripted up front and served in order; once the script runs
//! out the fallback reply repeats. Every call is recorded so tests can check
//! that each reply id was released exactly once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Reply {
    Status { status: u16, body: String },
    /// Reply with the request's own `requestBody`.
    Echo,
    /// Return this text verbatim.
    Raw(String),
    /// Fail the foreign call itself.
    Fault(String),
}

#[derive(Debug, Default)]
struct Calls {
    requests: Vec<String>,
    released: Vec<String>,
    destroyed_sessions: Vec<String>,
    destroy_all: usize,
}

/// Scripted [`Engine`] implementation.
#[derive(Debug)]
pub struct ScriptedEngine {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: Mutex<Calls>,
    next_id: AtomicU64,
}

impl ScriptedEngine {
    /// Engine answering `200` with an empty body.
    pub fn new() -> Self {
        Self::with_fallback(Reply::Status { status: 200, body: String::new() })
    }

    /// Engine echoing each request body back as the response body.
    pub fn echo() -> Self {
        Self::with_fallback(Reply::Echo)
    }

    /// Engine answering every request with the same status and body.
    pub fn always(status: u16, body: impl Into<String>) -> Self {
        Self::with_fallback(Reply::Status { status, body: body.into() })
    }

    fn with_fallback(fallback: Reply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Calls::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Queue a reply with `status` and `body`.
    pub fn then_reply(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Reply::Status { status, body: body.into() })
    }

    /// Queue a verbatim reply payload.
    pub fn then_raw(self, raw: impl Into<String>) -> Self {
        self.push(Reply::Raw(raw.into()))
    }

    /// Queue a failed foreign call.
    pub fn then_fault(self, message: impl Into<String>) -> Self {
        self.push(Reply::Fault(message.into()))
    }

    fn push(self, reply: Reply) -> Self {
        self.script.lock().expect("scripted engine mutex poisoned").push_back(reply);
        self
    }

    /// Payloads received by `request`, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.calls().requests.clone()
    }

    /// Payloads received by `request`, parsed.
    pub fn request_payloads(&self) -> Vec<Value> {
        self.requests()
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.calls().requests.len()
    }

    /// Ids passed to `free_memory`, in call order.
    pub fn released_ids(&self) -> Vec<String> {
        self.calls().released.clone()
    }

    pub fn release_count(&self) -> usize {
        self.calls().released.len()
    }

    pub fn destroyed_sessions(&self) -> Vec<String> {
        self.calls().destroyed_sessions.clone()
    }

    pub fn destroy_all_count(&self) -> usize {
        self.calls().destroy_all
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().expect("scripted engine mutex poisoned")
    }

    fn next_reply(&self) -> Reply {
        self.script
            .lock()
            .expect("scripted engine mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn allocate_id(&self, kind: &str) -> String {
        format!("{}-{}", kind, self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ScriptedEngine {
    fn request(&self, payload: &str) -> Result<String> {
        self.calls().requests.push(payload.to_string());
        let request: Value = serde_json::from_str(payload).unwrap_or(Value::Null);

        let (status, body) = match self.next_reply() {
            Reply::Status { status, body } => (status, body),
            Reply::Echo => (
                200,
                request["requestBody"].as_str().unwrap_or_default().to_string(),
            ),
            Reply::Raw(raw) => return Ok(raw),
            Reply::Fault(message) => return Err(Error::engine(message)),
        };

        Ok(json!({
            "id": self.allocate_id("response"),
            "sessionId": request["sessionId"],
            "status": status,
            "target": request["requestUrl"],
            "body": body,
            "headers": {},
            "cookies": {},
            "usedProtocol": "HTTP/2.0",
        })
        .to_string())
    }

    fn free_memory(&self, id: &str) -> Result<()> {
        self.calls().released.push(id.to_string());
        Ok(())
    }

    fn destroy_session(&self, payload: &str) -> Result<String> {
        let request: Value = serde_json::from_str(payload)?;
        let session_id = request["sessionId"]
            .as_str()
            .ok_or_else(|| Error::missing("sessionId"))?
            .to_string();
        self.calls().destroyed_sessions.push(session_id);
        Ok(json!({ "id": self.allocate_id("destroy"), "success": true }).to_string())
    }

    fn destroy_all(&self) -> Result<String> {
        self.calls().destroy_all += 1;
        Ok(json!({ "id": self.allocate_id("destroy"), "success": true }).to_string())
    }
}
