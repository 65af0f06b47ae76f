//! Engine gateway - async, leak-free access to the foreign engine.
//!
//! The engine's `request` blocks for the whole HTTP exchange, so it runs on
//! tokio's blocking pool and the caller awaits the join handle. The reply is
//! decoded and its `id` released inside that same blocking task: release
//! happens exactly once per reply even if the awaiting future is dropped.
//!
//! Cancellation is not supported. Dropping the future returned by
//! [`Gateway::submit`] detaches from the attempt; the engine still runs it to
//! completion (bounded by the payload timeout) and its memory is still freed.

use std::sync::Arc;

use crate::codec;
use crate::engine::{Engine, EngineResponse};
use crate::error::{Error, Result};

/// Sole owner of the engine handle.
#[derive(Clone)]
pub struct Gateway {
    engine: Arc<dyn Engine>,
}

impl Gateway {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Submit one serialized request and wait for its reply.
    ///
    /// Never fails: a call that cannot complete yields a status-0 response
    /// carrying the fault text as body. The returned value has no `id`.
    pub async fn submit(&self, payload: String) -> EngineResponse {
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || perform(engine.as_ref(), &payload)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Engine task aborted: {}", e);
                EngineResponse::failure(format!("engine task aborted: {}", e))
            }
        }
    }

    /// Ask the engine to drop the state of `session_id`.
    ///
    /// The session id must not be reused afterwards.
    pub async fn destroy_session(&self, session_id: &str) -> Result<bool> {
        let engine = Arc::clone(&self.engine);
        let payload = codec::encode_destroy_session(session_id);
        run_blocking(move || {
            let raw = engine.destroy_session(&payload)?;
            teardown_reply(engine.as_ref(), &raw)
        })
        .await
    }

    /// Ask the engine to drop every session.
    pub async fn destroy_all(&self) -> Result<bool> {
        let engine = Arc::clone(&self.engine);
        run_blocking(move || {
            let raw = engine.destroy_all()?;
            teardown_reply(engine.as_ref(), &raw)
        })
        .await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

/// One foreign call: invoke, decode, release.
fn perform(engine: &dyn Engine, payload: &str) -> EngineResponse {
    let raw = match engine.request(payload) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Engine request failed: {}", e);
            return EngineResponse::failure(e.to_string());
        }
    };

    match codec::decode_response(&raw) {
        Ok(mut response) => {
            if let Some(id) = response.id.take() {
                release(engine, &id);
            }
            response
        }
        Err(e) => {
            if let Some(id) = codec::response_id(&raw) {
                release(engine, &id);
            }
            tracing::warn!("Undecodable engine reply: {}", e);
            EngineResponse::failure(format!("undecodable engine reply: {}", e))
        }
    }
}

/// Fire-and-forget memory release. Failures are logged, never surfaced.
fn release(engine: &dyn Engine, id: &str) {
    if let Err(e) = engine.free_memory(id) {
        tracing::warn!("Failed to release engine memory for {}: {}", id, e);
    }
}

fn teardown_reply(engine: &dyn Engine, raw: &str) -> Result<bool> {
    let output = match codec::decode_destroy_output(raw) {
        Ok(output) => output,
        Err(e) => {
            if let Some(id) = codec::response_id(raw) {
                release(engine, &id);
            }
            return Err(e);
        }
    };
    if let Some(id) = &output.id {
        release(engine, id);
    }
    Ok(output.success)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::engine(format!("engine task aborted: {}", e)))?
}
