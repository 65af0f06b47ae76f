//! Foreign engine boundary.
//!
//! - [`Engine`]: the four entry points the shared library exports
//! - [`NativeEngine`]: binds them from `tls-client` via libloading
//! - [`ScriptedEngine`]: in-memory double with call instrumentation
//! - [`Gateway`]: async submit, memory release and session teardown

pub mod gateway;
pub mod native;
pub mod scripted;

use serde::Deserialize;

use crate::cookie::ResponseCookies;
use crate::error::Result;
use crate::response::ResponseHeaders;

pub use gateway::Gateway;
pub use native::{find_library, library_extension, NativeEngine};
pub use scripted::ScriptedEngine;

/// Blocking view of the engine's exported functions.
///
/// Every string returned by `request`, `destroy_session` and `destroy_all`
/// carries an `id` owned by the engine that must be handed to
/// `free_memory` exactly once. [`Gateway`] does that; call these directly
/// only if you take over that duty.
pub trait Engine: Send + Sync + 'static {
    /// Perform one request described by a JSON payload. Blocks until done.
    fn request(&self, payload: &str) -> Result<String>;

    /// Release the memory behind a reply id.
    fn free_memory(&self, id: &str) -> Result<()>;

    /// Drop the engine-side state of one session.
    fn destroy_session(&self, payload: &str) -> Result<String>;

    /// Drop the engine-side state of every session.
    fn destroy_all(&self) -> Result<String>;
}

/// Decoded engine reply, before it is turned into a [`Response`](crate::Response).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineResponse {
    /// Engine memory handle. Taken and released by the gateway.
    pub id: Option<String>,
    pub session_id: Option<String>,
    pub status: u16,
    #[serde(deserialize_with = "crate::codec::null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "crate::codec::null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "crate::codec::null_as_default")]
    pub headers: ResponseHeaders,
    #[serde(deserialize_with = "crate::codec::null_as_default")]
    pub cookies: ResponseCookies,
    pub used_protocol: Option<String>,
    /// Attempt index, set by the retry controller.
    #[serde(skip)]
    pub retry_count: u32,
}

impl EngineResponse {
    /// Best-effort reply for a foreign call that could not complete.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: message.into(),
            ..Self::default()
        }
    }
}
