//! Response returned to callers.

use std::collections::BTreeMap;

use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cookie::ResponseCookies;
use crate::engine::EngineResponse;
use crate::error::{Error, Result};

/// Response headers as reported by the engine: name -> values.
pub type ResponseHeaders = BTreeMap<String, Vec<String>>;

/// Response body after best-effort JSON decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    /// Body text parsed as JSON.
    Json(Value),
    /// Body text that is not JSON (or an engine error message).
    Text(String),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// HTTP response as delivered through the engine.
///
/// Carries no engine handle: response memory is already released by the
/// time a `Response` exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub session_id: String,
    /// HTTP status, `0` when the engine failed before a status was received.
    pub status: u16,
    /// Final URL after redirects.
    pub target: String,
    pub body: Body,
    pub headers: ResponseHeaders,
    pub cookies: ResponseCookies,
    /// Zero-based index of the attempt that produced this response.
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_protocol: Option<String>,
}

impl Response {
    pub(crate) fn from_engine(response: EngineResponse, body: Body, session_id: String) -> Self {
        Self {
            session_id: response.session_id.unwrap_or(session_id),
            status: response.status,
            target: response.target,
            body,
            headers: response.headers,
            cookies: response.cookies,
            retry_count: response.retry_count,
            used_protocol: response.used_protocol,
        }
    }

    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
    pub fn is_redirect(&self) -> bool { (300..400).contains(&self.status) }

    /// True when the engine itself failed (no HTTP exchange completed).
    pub fn is_engine_error(&self) -> bool { self.status == 0 }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).into_iter().next()
    }

    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter().map(String::as_str))
            .collect()
    }

    pub fn content_type(&self) -> Option<&str> { self.header("Content-Type") }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Body as text. JSON bodies are re-serialized compactly.
    pub fn text(&self) -> String {
        match &self.body {
            Body::Text(text) => text.clone(),
            Body::Json(value) => value.to_string(),
        }
    }

    /// Deserialize the body into `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        match &self.body {
            Body::Json(value) => serde_json::from_value(value.clone()).map_err(Error::from),
            Body::Text(text) => serde_json::from_str(text).map_err(Error::from),
        }
    }

    /// Decode a byte response (`isByteResponse`).
    ///
    /// The engine returns byte bodies base64 encoded, usually as a
    /// `data:<mime>;base64,` URL.
    pub fn bytes(&self) -> Result<Bytes> {
        let text = self
            .body
            .as_text()
            .ok_or_else(|| Error::decode("body is JSON, not base64"))?;
        let encoded = match text.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(',')
                .map(|(_, data)| data)
                .ok_or_else(|| Error::decode("data URL without payload"))?,
            None => text,
        };
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(Bytes::from)
            .map_err(|e| Error::decode(format!("base64: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Body) -> Response {
        Response {
            session_id: "s".into(),
            status: 200,
            target: "https://example.com/".into(),
            body,
            headers: ResponseHeaders::from([(
                "Content-Type".to_string(),
                vec!["application/json".to_string()],
            ), (
                "Set-Cookie".to_string(),
                vec!["a=1".to_string(), "b=2".to_string()],
            )]),
            cookies: ResponseCookies::from([("a".to_string(), "1".to_string())]),
            retry_count: 0,
            used_protocol: Some("HTTP/2.0".into()),
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let r = response(Body::default());
        assert_eq!(r.header("content-type"), Some("application/json"));
        assert_eq!(r.header_all("set-cookie"), vec!["a=1", "b=2"]);
        assert_eq!(r.header("missing"), None);
        assert_eq!(r.cookie("a"), Some("1"));
    }

    #[test]
    fn test_json_from_either_body_shape() {
        #[derive(serde::Deserialize)]
        struct Flag { ok: bool }

        assert!(response(Body::Json(json!({"ok": true}))).json::<Flag>().unwrap().ok);
        assert!(response(Body::Text("{\"ok\":true}".into())).json::<Flag>().unwrap().ok);
        assert!(response(Body::Text("nope".into())).json::<Flag>().is_err());
    }

    #[test]
    fn test_bytes_decodes_data_url() {
        let r = response(Body::Text("data:image/png;base64,AAEC".into()));
        assert_eq!(r.bytes().unwrap().as_ref(), &[0u8, 1, 2]);

        let plain = response(Body::Text("AAEC".into()));
        assert_eq!(plain.bytes().unwrap().as_ref(), &[0u8, 1, 2]);
    }

    #[test]
    fn test_serialized_response_has_no_id() {
        let value = serde_json::to_value(response(Body::default())).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["retryCount"], 0);
        assert_eq!(value["sessionId"], "s");
    }
}
