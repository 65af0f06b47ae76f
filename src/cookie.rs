//! Request cookies handed to the engine.
//!
//! Cookie storage and matching live in the engine's jar (keyed by session).
//! This module only describes cookies the caller injects on a request.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cookies returned by the engine: name -> value.
pub type ResponseCookies = BTreeMap<String, String>;

/// A cookie injected into a request (`requestCookies` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Serialized as unix seconds, `0` meaning a session cookie.
    #[serde(default, with = "expires_seconds")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_age: i64,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::new(),
            expires: None,
            max_age: 0,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = normalize_domain(&domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.strip_prefix('.').unwrap_or(domain).to_lowercase()
}

mod expires_seconds {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.map(|dt| dt.timestamp()).unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let ts = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
        if ts <= 0 {
            return Ok(None);
        }
        Ok(Utc.timestamp_opt(ts, 0).single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cookie_serializes_with_engine_field_names() {
        let cookie = Cookie::new("sid", "abc")
            .with_domain(".Example.com")
            .with_path("/")
            .with_expires(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
            .with_max_age(60);

        let json = serde_json::to_value(&cookie).unwrap();
        assert_eq!(json["name"], "sid");
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["expires"], 1_700_000_000);
        assert_eq!(json["maxAge"], 60);
    }

    #[test]
    fn test_session_cookie_has_zero_expiry() {
        let json = serde_json::to_value(Cookie::new("a", "b")).unwrap();
        assert_eq!(json["expires"], 0);
        assert!(json.get("domain").is_none());
    }

    #[test]
    fn test_cookie_deserializes_from_config() {
        let cookie: Cookie = serde_json::from_str(r#"{"name":"a","value":"b","expires":0}"#).unwrap();
        assert_eq!(cookie, Cookie::new("a", "b"));
        assert_eq!(cookie.to_string(), "a=b");
    }
}
