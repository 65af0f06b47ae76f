//! # tls-bridge
//!
//! Async HTTP client API over the `tls-client` shared library.
//!
//! The library does the TLS/HTTP work (browser fingerprints, HTTP/2,
//! proxies, cookie jars). This crate resolves options into the engine's JSON
//! payload, calls it off the async runtime, releases every reply's engine
//! memory, applies a status-driven retry policy and keeps one engine session
//! per client.

pub mod client;
pub mod codec;
pub mod cookie;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod headers;
pub mod options;
pub mod response;
pub mod retry;
pub mod session;
pub mod timeouts;

// Re-exports
pub use client::{Client, ClientBuilder, RequestBuilder};
pub use cookie::Cookie;
pub use engine::{Engine, NativeEngine, ScriptedEngine};
pub use error::{Error, Result};
pub use fingerprint::ClientProfile;
pub use options::{ClientConfig, RequestOptions, RetryPolicy};
pub use response::{Body, Response};
pub use session::Session;
pub use timeouts::Timeout;
