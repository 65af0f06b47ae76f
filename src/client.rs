//! Client facade.
//!
//! ```rust,ignore
//! use tls_bridge::{Client, ClientProfile};
//! use std::time::Duration;
//!
//! let client = Client::builder()
//!     .library_path("./tls-client-linux-amd64-1.7.2.so")
//!     .profile(ClientProfile::Chrome133)
//!     .disable_ipv6(true)
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let response = client.get("https://tls.peet.ws/api/all").send().await?;
//! println!("{} {:?}", response.status, response.body);
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::codec;
use crate::cookie::Cookie;
use crate::descriptor;
use crate::engine::{Engine, Gateway, NativeEngine};
use crate::error::{Error, Result};
use crate::fingerprint::ClientProfile;
use crate::headers::{self, Headers};
use crate::options::{ClientConfig, RequestOptions};
use crate::response::Response;
use crate::retry;
use crate::session::Session;
use crate::timeouts::Timeout;

/// Handle for issuing requests through the engine.
///
/// Cloning is cheap; clones share the configuration, the session and the
/// engine, so requests from any clone land in the same engine session.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    session: Session,
    gateway: Gateway,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session_id(&self) -> &str {
        self.inner.session.id()
    }

    /// Issue one logical request (retries included).
    ///
    /// Engine and transport failures come back as a [`Response`] with an
    /// error status; `Err` is only returned when the payload cannot be
    /// encoded.
    pub async fn request(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<Response> {
        let inner = &self.inner;
        let descriptor = descriptor::resolve(&inner.config, &inner.session, url.as_ref(), &options);
        let payload = codec::encode(&descriptor)?;

        tracing::debug!(
            "{} {} (session {}, timeout {:?})",
            descriptor.request_method,
            descriptor.request_url,
            descriptor.session_id,
            descriptor.engine.timeout().effective()
        );

        let mut response = retry::execute_with_retry(&inner.gateway, &payload, &descriptor.retry).await;
        let body = codec::decode_body(std::mem::take(&mut response.body));
        Ok(Response::from_engine(response, body, descriptor.session_id))
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::GET, url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::POST, url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::PUT, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::PATCH, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::DELETE, url)
    }

    pub fn head(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::HEAD, url)
    }

    pub fn options(&self, url: impl Into<String>) -> RequestBuilder {
        self.method(Method::OPTIONS, url)
    }

    pub fn method(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            url: url.into(),
            options: RequestOptions::new().method(method),
        }
    }

    /// Drop this client's engine-side session (cookies, connections).
    ///
    /// The client keeps its session id; later requests start a fresh
    /// engine-side session under the same id.
    pub async fn destroy_session(&self) -> Result<bool> {
        self.inner.gateway.destroy_session(self.inner.session.id()).await
    }

    /// Drop every engine-side session in the loaded engine.
    pub async fn destroy_all(&self) -> Result<bool> {
        self.inner.gateway.destroy_all().await
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    session_id: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a full configuration (for example one read with
    /// [`ClientConfig::from_json`]).
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config, session_id: None }
    }

    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.library_path = Some(path.into());
        self
    }

    /// Use the `tls-client*` library found in `dir`.
    pub fn discover_library(self, dir: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = crate::engine::find_library(dir)?;
        Ok(self.library_path(path))
    }

    /// Select the TLS profile and matching User-Agent default header.
    pub fn profile(mut self, profile: impl Into<ClientProfile>) -> Self {
        let profile = profile.into();
        if let Some(ua) = profile.user_agent() {
            self.config.default_headers.insert("User-Agent".to_string(), ua.to_string());
        }
        self.config.engine.tls_client_identifier = profile;
        self
    }

    /// Replace the default headers with Chrome's page navigation set for
    /// the configured profile.
    pub fn chrome_navigation_headers(mut self) -> Self {
        self.config.default_headers =
            headers::chrome_navigation_headers(&self.config.engine.tls_client_identifier);
        self
    }

    /// Replace the default headers with Chrome's XHR/fetch set for the
    /// configured profile.
    pub fn chrome_ajax_headers(mut self) -> Self {
        self.config.default_headers =
            headers::chrome_ajax_headers(&self.config.engine.tls_client_identifier);
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name.into(), value.into());
        self
    }

    /// Replace the default header set.
    pub fn default_headers(mut self, headers: Headers) -> Self {
        self.config.default_headers = headers;
        self
    }

    pub fn default_cookie(mut self, cookie: Cookie) -> Self {
        self.config.default_cookies.push(cookie);
        self
    }

    pub fn header_order(mut self, order: Vec<String>) -> Self {
        self.config.engine.header_order = order;
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.engine.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.config.engine.set_timeout(Timeout::from_duration(duration));
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.config.engine.follow_redirects = follow;
        self
    }

    pub fn force_http1(mut self, force: bool) -> Self {
        self.config.engine.force_http1 = force;
        self
    }

    pub fn insecure_skip_verify(mut self, skip: bool) -> Self {
        self.config.engine.insecure_skip_verify = skip;
        self
    }

    pub fn disable_ipv4(mut self, disable: bool) -> Self {
        self.config.engine.disable_ipv4 = disable;
        self
    }

    pub fn disable_ipv6(mut self, disable: bool) -> Self {
        self.config.engine.disable_ipv6 = disable;
        self
    }

    pub fn random_tls_extension_order(mut self, enabled: bool) -> Self {
        self.config.engine.with_random_tls_extension_order = enabled;
        self
    }

    /// Disable the engine's cookie jar entirely.
    pub fn without_cookie_jar(mut self, without: bool) -> Self {
        self.config.engine.without_cookie_jar = without;
        self
    }

    pub fn byte_response(mut self, enabled: bool) -> Self {
        self.config.engine.is_byte_response = enabled;
        self
    }

    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.config.retry.enabled = enabled;
        self
    }

    pub fn retry_max_count(mut self, max_count: u32) -> Self {
        self.config.retry.max_count = max_count;
        self
    }

    pub fn retry_status_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.config.retry.status_codes = codes.into();
        self
    }

    /// Pin the session id instead of generating one.
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    /// Load the configured library and build the client.
    ///
    /// Fails fast when no library path is set, the file is missing or does
    /// not export the engine entry points, or the proxy URL is invalid.
    pub fn build(self) -> Result<Client> {
        let path = self
            .config
            .library_path
            .clone()
            .ok_or(Error::MissingLibraryPath)?;
        self.validate()?;
        let engine = NativeEngine::load(&path)?;
        Ok(self.finish(Arc::new(engine)))
    }

    /// Build the client over an already constructed engine.
    pub fn build_with_engine(self, engine: Arc<dyn Engine>) -> Result<Client> {
        self.validate()?;
        Ok(self.finish(engine))
    }

    fn validate(&self) -> Result<()> {
        if let Some(proxy) = &self.config.engine.proxy_url {
            url::Url::parse(proxy)?;
        }
        Ok(())
    }

    fn finish(self, engine: Arc<dyn Engine>) -> Client {
        let session = self.session_id.map(Session::from_id).unwrap_or_default();
        tracing::debug!(
            "Client ready (profile {}, session {})",
            self.config.engine.tls_client_identifier,
            session
        );
        Client {
            inner: Arc::new(ClientInner {
                config: self.config,
                session,
                gateway: Gateway::new(engine),
            }),
        }
    }
}

/// Per-request builder returned by [`Client::get`] and friends.
#[derive(Debug)]
#[must_use = "RequestBuilder does nothing until you call send()"]
pub struct RequestBuilder {
    client: Client,
    url: String,
    options: RequestOptions,
}

impl RequestBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.options.headers = headers::merge_headers(&self.options.headers, &headers);
        self
    }

    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.options.request_cookies.push(cookie);
        self
    }

    /// Raw body, sent verbatim.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.options.body = Some(Value::String(body.into()));
        self
    }

    /// JSON body, serialized compactly.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.options.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Binary body: base64 encoded and flagged as a byte request.
    pub fn bytes(mut self, body: impl AsRef<[u8]>) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(body.as_ref());
        self.options.body = Some(Value::String(encoded));
        self.options.engine.is_byte_request = Some(true);
        self
    }

    /// Ask the engine for a base64 body, decoded with [`Response::bytes`].
    pub fn byte_response(mut self) -> Self {
        self.options.engine.is_byte_response = Some(true);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.options = self.options.follow_redirects(follow);
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.options = self.options.proxy(proxy_url);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.options = self.options.timeout(duration);
        self
    }

    pub fn profile(mut self, profile: impl Into<ClientProfile>) -> Self {
        self.options = self.options.profile(profile);
        self
    }

    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.options = self.options.retry_enabled(enabled);
        self
    }

    pub fn retry_max_count(mut self, max_count: u32) -> Self {
        self.options = self.options.retry_max_count(max_count);
        self
    }

    pub fn retry_status_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.options = self.options.retry_status_codes(codes);
        self
    }

    /// Full access to the options for anything without a shortcut.
    pub fn options_mut(&mut self) -> &mut RequestOptions {
        &mut self.options
    }

    pub async fn send(self) -> Result<Response> {
        self.client.request(&self.url, self.options).await
    }
}
