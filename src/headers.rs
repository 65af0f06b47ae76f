//! Header defaults and browser header presets.
//!
//! The engine writes headers in `headerOrder`; names missing from the order
//! are appended after it by the engine.

use std::collections::BTreeMap;

use crate::fingerprint::ClientProfile;

/// Request header map as sent to the engine. Key casing is kept as given.
pub type Headers = BTreeMap<String, String>;

/// Header order used when the client does not configure one.
pub const DEFAULT_HEADER_ORDER: &[&str] = &[
    "host",
    "user-agent",
    "accept",
    "accept-language",
    "accept-encoding",
    "connection",
    "upgrade-insecure-requests",
    "if-modified-since",
    "cache-control",
    "dnt",
    "content-length",
    "content-type",
    "range",
    "authorization",
    "x-real-ip",
    "x-forwarded-for",
    "x-requested-with",
    "x-csrf-token",
    "x-request-id",
    "sec-ch-ua",
    "sec-ch-ua-mobile",
    "sec-ch-ua-platform",
    "sec-fetch-dest",
    "sec-fetch-mode",
    "sec-fetch-site",
    "origin",
    "referer",
    "pragma",
    "max-forwards",
    "x-http-method-override",
    "if-unmodified-since",
    "if-none-match",
    "if-match",
    "if-range",
    "accept-datetime",
];

/// Owned copy of [`DEFAULT_HEADER_ORDER`].
pub fn default_header_order() -> Vec<String> {
    DEFAULT_HEADER_ORDER.iter().map(|h| h.to_string()).collect()
}

/// Headers applied to every request when the client does not configure any.
pub fn default_headers() -> Headers {
    profile_headers(&ClientProfile::default())
}

/// Minimal header set for a profile: just its User-Agent.
pub fn profile_headers(profile: &ClientProfile) -> Headers {
    let mut headers = Headers::new();
    if let Some(ua) = profile.user_agent() {
        headers.insert("User-Agent".to_string(), ua.to_string());
    }
    headers
}

/// Chrome headers for page navigation.
pub fn chrome_navigation_headers(profile: &ClientProfile) -> Headers {
    let mut headers = profile_headers(profile);
    headers.extend(owned(&[
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br, zstd"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", r#""Windows""#),
        ("Upgrade-Insecure-Requests", "1"),
    ]));
    headers
}

/// Chrome headers for AJAX/API requests.
pub fn chrome_ajax_headers(profile: &ClientProfile) -> Headers {
    let mut headers = profile_headers(profile);
    headers.extend(owned(&[
        ("Accept", "application/json, text/plain, */*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br, zstd"),
        ("Content-Type", "application/json"),
        ("Sec-Fetch-Dest", "empty"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", r#""Windows""#),
    ]));
    headers
}

/// Overlay `overrides` on `base`. Identical keys take the override value.
pub fn merge_headers(base: &Headers, overrides: &Headers) -> Headers {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
