//! Resolved request descriptor.
//!
//! [`resolve`] folds the client defaults and one call's options into the
//! exact set of keys the engine receives. It is a pure function: neither
//! input is modified and the same inputs always give the same descriptor.

use serde::Serialize;
use serde_json::Value;

use crate::cookie::Cookie;
use crate::headers::{self, Headers};
use crate::options::{ClientConfig, EngineOptions, RequestOptions, RetryPolicy};
use crate::session::Session;

/// One fully resolved request, serialized as the engine payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub session_id: String,
    pub request_url: String,
    pub request_method: String,
    pub request_body: Option<String>,
    pub headers: Headers,
    pub request_cookies: Vec<Cookie>,
    #[serde(flatten)]
    pub engine: EngineOptions,
    #[serde(flatten)]
    pub retry: RetryPolicy,
}

/// Merge client defaults with call-site options.
///
/// - scalar options: call-site value when present, else the default
/// - headers: defaults overlaid by call-site headers
/// - cookies: default cookies followed by call-site cookies, not deduplicated
pub fn resolve(config: &ClientConfig, session: &Session, url: &str, options: &RequestOptions) -> RequestDescriptor {
    let method = options.method.clone().unwrap_or_default();

    let mut request_cookies = config.default_cookies.clone();
    request_cookies.extend(options.request_cookies.iter().cloned());

    RequestDescriptor {
        session_id: options
            .session_id
            .clone()
            .unwrap_or_else(|| session.id().to_string()),
        request_url: url.to_string(),
        request_method: method.as_str().to_string(),
        request_body: options.body.as_ref().and_then(body_to_payload),
        headers: headers::merge_headers(&config.default_headers, &options.headers),
        request_cookies,
        engine: config.engine.with_overrides(&options.engine),
        retry: config.retry.with_overrides(&options.retry),
    }
}

/// Convert a call-site body into the engine's `requestBody` string.
pub fn body_to_payload(body: &Value) -> Option<String> {
    match body {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::ClientProfile;
    use http::Method;
    use serde_json::json;

    fn session() -> Session {
        Session::from_id("session-1")
    }

    #[test]
    fn test_url_method_and_session_always_present() {
        let d = resolve(&ClientConfig::default(), &session(), "https://example.com", &RequestOptions::new());
        assert_eq!(d.request_url, "https://example.com");
        assert_eq!(d.request_method, "GET");
        assert_eq!(d.session_id, "session-1");
        assert_eq!(d.request_body, None);
    }

    #[test]
    fn test_call_site_scalars_override_defaults() {
        let mut config = ClientConfig::default();
        config.engine.follow_redirects = true;
        config.engine.timeout_seconds = 30;

        let options = RequestOptions::new()
            .method(Method::POST)
            .follow_redirects(false)
            .profile(ClientProfile::Firefox120)
            .retry_max_count(1);
        let d = resolve(&config, &session(), "https://x", &options);

        assert_eq!(d.request_method, "POST");
        assert!(!d.engine.follow_redirects);
        assert_eq!(d.engine.tls_client_identifier, ClientProfile::Firefox120);
        assert_eq!(d.engine.timeout_seconds, 30);
        assert_eq!(d.retry.max_count, 1);
        assert!(d.retry.enabled);
    }

    #[test]
    fn test_headers_merge_with_call_site_winning() {
        let mut config = ClientConfig::default();
        config.default_headers = Headers::from([
            ("User-Agent".to_string(), "default-ua".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ]);
        let options = RequestOptions::new()
            .header("User-Agent", "call-ua")
            .header("X-Extra", "1");

        let d = resolve(&config, &session(), "https://x", &options);
        assert_eq!(d.headers["User-Agent"], "call-ua");
        assert_eq!(d.headers["Accept"], "*/*");
        assert_eq!(d.headers["X-Extra"], "1");
        assert_eq!(config.default_headers["User-Agent"], "default-ua");
    }

    #[test]
    fn test_cookies_concatenate_in_order() {
        let mut config = ClientConfig::default();
        config.default_cookies = vec![Cookie::new("a", "1"), Cookie::new("b", "2")];
        let options = RequestOptions::new().cookie(Cookie::new("c", "3")).cookie(Cookie::new("a", "9"));

        let d = resolve(&config, &session(), "https://x", &options);
        let names: Vec<_> = d.request_cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "a"]);
    }

    #[test]
    fn test_body_serialization_rules() {
        assert_eq!(body_to_payload(&json!({"a": [1, 2]})), Some(r#"{"a":[1,2]}"#.to_string()));
        assert_eq!(body_to_payload(&json!([1, "x"])), Some(r#"[1,"x"]"#.to_string()));
        assert_eq!(body_to_payload(&json!("raw text")), Some("raw text".to_string()));
        assert_eq!(body_to_payload(&json!(42)), Some("42".to_string()));
        assert_eq!(body_to_payload(&json!(false)), Some("false".to_string()));
        assert_eq!(body_to_payload(&Value::Null), None);
    }

    #[test]
    fn test_payload_has_no_source_only_keys() {
        let mut config = ClientConfig::default();
        config.library_path = Some("./tls-client.so".into());
        let d = resolve(&config, &session(), "https://x", &RequestOptions::new());

        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("defaultHeaders").is_none());
        assert!(json.get("defaultCookies").is_none());
        assert!(json.get("customLibraryPath").is_none());
        assert_eq!(json["requestBody"], Value::Null);
        assert_eq!(json["tlsClientIdentifier"], "chrome_124");
        assert_eq!(json["withRandomTLSExtensionOrder"], true);
        assert_eq!(json["disableIPV6"], false);
        assert_eq!(json["retryMaxCount"], 3);
    }

    #[test]
    fn test_per_call_session_override() {
        let options = RequestOptions::new().session_id("other");
        let d = resolve(&ClientConfig::default(), &session(), "https://x", &options);
        assert_eq!(d.session_id, "other");
    }
}
