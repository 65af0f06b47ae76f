//! Client defaults and per-request options.
//!
//! Field names serialize to the engine's camelCase payload keys, so a client
//! configuration can be written in the same JSON shape the engine documents.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cookie::Cookie;
use crate::error::Result;
use crate::fingerprint::ClientProfile;
use crate::headers::{self, Headers};
use crate::timeouts::Timeout;

/// Status codes retried by default.
pub const DEFAULT_RETRY_STATUS_CODES: &[u16] = &[408, 429, 500, 502, 503, 504, 521, 522, 523, 524];

/// Engine-recognized options, fully defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub tls_client_identifier: ClientProfile,
    pub catch_panics: bool,
    pub certificate_pinning_hosts: Option<BTreeMap<String, Vec<String>>>,
    pub custom_tls_client: Option<Value>,
    pub transport_options: Option<Value>,
    pub follow_redirects: bool,
    pub force_http1: bool,
    pub header_order: Vec<String>,
    pub connect_headers: Option<BTreeMap<String, Vec<String>>>,
    pub insecure_skip_verify: bool,
    pub is_byte_request: bool,
    pub is_byte_response: bool,
    pub is_rotating_proxy: bool,
    pub proxy_url: Option<String>,
    #[serde(rename = "disableIPV6")]
    pub disable_ipv6: bool,
    #[serde(rename = "disableIPV4")]
    pub disable_ipv4: bool,
    pub local_address: Option<String>,
    pub server_name_overwrite: String,
    pub stream_output_block_size: Option<u64>,
    #[serde(rename = "streamOutputEOFSymbol")]
    pub stream_output_eof_symbol: Option<String>,
    pub stream_output_path: Option<String>,
    pub timeout_milliseconds: u64,
    pub timeout_seconds: u64,
    pub with_debug: bool,
    pub with_default_cookie_jar: bool,
    pub without_cookie_jar: bool,
    #[serde(rename = "withRandomTLSExtensionOrder")]
    pub with_random_tls_extension_order: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let timeout = Timeout::api_defaults();
        Self {
            tls_client_identifier: ClientProfile::default(),
            catch_panics: false,
            certificate_pinning_hosts: None,
            custom_tls_client: None,
            transport_options: None,
            follow_redirects: false,
            force_http1: false,
            header_order: headers::default_header_order(),
            connect_headers: None,
            insecure_skip_verify: false,
            is_byte_request: false,
            is_byte_response: false,
            is_rotating_proxy: false,
            proxy_url: None,
            disable_ipv6: false,
            disable_ipv4: false,
            local_address: None,
            server_name_overwrite: String::new(),
            stream_output_block_size: None,
            stream_output_eof_symbol: None,
            stream_output_path: None,
            timeout_milliseconds: timeout.milliseconds,
            timeout_seconds: timeout.seconds,
            with_debug: false,
            with_default_cookie_jar: true,
            without_cookie_jar: false,
            with_random_tls_extension_order: true,
        }
    }
}

impl EngineOptions {
    /// Current timeout as the engine reads it.
    pub fn timeout(&self) -> Timeout {
        Timeout {
            seconds: self.timeout_seconds,
            milliseconds: self.timeout_milliseconds,
        }
    }

    pub fn set_timeout(&mut self, timeout: impl Into<Timeout>) {
        let timeout = timeout.into();
        self.timeout_seconds = timeout.seconds;
        self.timeout_milliseconds = timeout.milliseconds;
    }

    /// New options with every present override applied.
    ///
    /// Presence decides, not truthiness: `Some(false)` and `Some(0)` win over
    /// a `true`/non-zero default.
    pub fn with_overrides(&self, o: &EngineOverrides) -> Self {
        Self {
            tls_client_identifier: pick(&o.tls_client_identifier, &self.tls_client_identifier),
            catch_panics: pick(&o.catch_panics, &self.catch_panics),
            certificate_pinning_hosts: pick_opt(&o.certificate_pinning_hosts, &self.certificate_pinning_hosts),
            custom_tls_client: pick_opt(&o.custom_tls_client, &self.custom_tls_client),
            transport_options: pick_opt(&o.transport_options, &self.transport_options),
            follow_redirects: pick(&o.follow_redirects, &self.follow_redirects),
            force_http1: pick(&o.force_http1, &self.force_http1),
            header_order: pick(&o.header_order, &self.header_order),
            connect_headers: pick_opt(&o.connect_headers, &self.connect_headers),
            insecure_skip_verify: pick(&o.insecure_skip_verify, &self.insecure_skip_verify),
            is_byte_request: pick(&o.is_byte_request, &self.is_byte_request),
            is_byte_response: pick(&o.is_byte_response, &self.is_byte_response),
            is_rotating_proxy: pick(&o.is_rotating_proxy, &self.is_rotating_proxy),
            proxy_url: pick_opt(&o.proxy_url, &self.proxy_url),
            disable_ipv6: pick(&o.disable_ipv6, &self.disable_ipv6),
            disable_ipv4: pick(&o.disable_ipv4, &self.disable_ipv4),
            local_address: pick_opt(&o.local_address, &self.local_address),
            server_name_overwrite: pick(&o.server_name_overwrite, &self.server_name_overwrite),
            stream_output_block_size: pick_opt(&o.stream_output_block_size, &self.stream_output_block_size),
            stream_output_eof_symbol: pick_opt(&o.stream_output_eof_symbol, &self.stream_output_eof_symbol),
            stream_output_path: pick_opt(&o.stream_output_path, &self.stream_output_path),
            timeout_milliseconds: pick(&o.timeout_milliseconds, &self.timeout_milliseconds),
            timeout_seconds: pick(&o.timeout_seconds, &self.timeout_seconds),
            with_debug: pick(&o.with_debug, &self.with_debug),
            with_default_cookie_jar: pick(&o.with_default_cookie_jar, &self.with_default_cookie_jar),
            without_cookie_jar: pick(&o.without_cookie_jar, &self.without_cookie_jar),
            with_random_tls_extension_order: pick(
                &o.with_random_tls_extension_order,
                &self.with_random_tls_extension_order,
            ),
        }
    }
}

fn pick<T: Clone>(value: &Option<T>, default: &T) -> T {
    value.clone().unwrap_or_else(|| default.clone())
}

fn pick_opt<T: Clone>(value: &Option<T>, default: &Option<T>) -> Option<T> {
    value.clone().or_else(|| default.clone())
}

/// Call-site overrides of [`EngineOptions`]. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOverrides {
    pub tls_client_identifier: Option<ClientProfile>,
    pub catch_panics: Option<bool>,
    pub certificate_pinning_hosts: Option<BTreeMap<String, Vec<String>>>,
    pub custom_tls_client: Option<Value>,
    pub transport_options: Option<Value>,
    pub follow_redirects: Option<bool>,
    pub force_http1: Option<bool>,
    pub header_order: Option<Vec<String>>,
    pub connect_headers: Option<BTreeMap<String, Vec<String>>>,
    pub insecure_skip_verify: Option<bool>,
    pub is_byte_request: Option<bool>,
    pub is_byte_response: Option<bool>,
    pub is_rotating_proxy: Option<bool>,
    pub proxy_url: Option<String>,
    #[serde(rename = "disableIPV6")]
    pub disable_ipv6: Option<bool>,
    #[serde(rename = "disableIPV4")]
    pub disable_ipv4: Option<bool>,
    pub local_address: Option<String>,
    pub server_name_overwrite: Option<String>,
    pub stream_output_block_size: Option<u64>,
    #[serde(rename = "streamOutputEOFSymbol")]
    pub stream_output_eof_symbol: Option<String>,
    pub stream_output_path: Option<String>,
    pub timeout_milliseconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub with_debug: Option<bool>,
    pub with_default_cookie_jar: Option<bool>,
    pub without_cookie_jar: Option<bool>,
    #[serde(rename = "withRandomTLSExtensionOrder")]
    pub with_random_tls_extension_order: Option<bool>,
}

/// Status-driven retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    #[serde(rename = "retryIsEnabled")]
    pub enabled: bool,
    /// Total attempts allowed, the first one included.
    #[serde(rename = "retryMaxCount")]
    pub max_count: u32,
    #[serde(rename = "retryStatusCodes")]
    pub status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_count: 3,
            status_codes: DEFAULT_RETRY_STATUS_CODES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Policy that always stops after the first attempt.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    pub fn with_overrides(&self, o: &RetryOverrides) -> Self {
        Self {
            enabled: pick(&o.enabled, &self.enabled),
            max_count: pick(&o.max_count, &self.max_count),
            status_codes: pick(&o.status_codes, &self.status_codes),
        }
    }

    /// Whether another attempt follows `attempts` completed attempts that
    /// ended with `status`.
    pub fn should_retry(&self, attempts: u32, status: u16) -> bool {
        self.enabled && attempts < self.max_count && self.status_codes.contains(&status)
    }
}

/// Call-site overrides of [`RetryPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryOverrides {
    #[serde(rename = "retryIsEnabled")]
    pub enabled: Option<bool>,
    #[serde(rename = "retryMaxCount")]
    pub max_count: Option<u32>,
    #[serde(rename = "retryStatusCodes")]
    pub status_codes: Option<Vec<u16>>,
}

/// Client-level defaults. Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    #[serde(rename = "customLibraryPath")]
    pub library_path: Option<PathBuf>,
    #[serde(flatten)]
    pub engine: EngineOptions,
    #[serde(flatten)]
    pub retry: RetryPolicy,
    /// `null` clears the built-in User-Agent default.
    #[serde(deserialize_with = "crate::codec::null_as_default")]
    pub default_headers: Headers,
    #[serde(deserialize_with = "crate::codec::null_as_default")]
    pub default_cookies: Vec<Cookie>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            engine: EngineOptions::default(),
            retry: RetryPolicy::default(),
            default_headers: headers::default_headers(),
            default_cookies: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Parse a configuration written with the engine's option names.
    ///
    /// Keys left out keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Defaults to `GET`.
    pub method: Option<Method>,
    /// Objects and arrays are sent as compact JSON, strings verbatim, other
    /// scalars in their textual form. `Null` sends no body.
    pub body: Option<Value>,
    pub headers: Headers,
    pub request_cookies: Vec<Cookie>,
    /// Overrides the client session for this call only.
    pub session_id: Option<String>,
    pub engine: EngineOverrides,
    pub retry: RetryOverrides,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.request_cookies.push(cookie);
        self
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.engine.follow_redirects = Some(follow);
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.engine.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<ClientProfile>) -> Self {
        self.engine.tls_client_identifier = Some(profile.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        let timeout = Timeout::from_duration(duration);
        self.engine.timeout_seconds = Some(timeout.seconds);
        self.engine.timeout_milliseconds = Some(timeout.milliseconds);
        self
    }

    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry.enabled = Some(enabled);
        self
    }

    pub fn retry_max_count(mut self, max_count: u32) -> Self {
        self.retry.max_count = Some(max_count);
        self
    }

    pub fn retry_status_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.retry.status_codes = Some(codes.into());
        self
    }
}
