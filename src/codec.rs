//! Payload codec for the engine boundary.
//!
//! Every request crosses the boundary as one JSON document and every reply
//! comes back as one JSON document. Nothing is streamed.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::descriptor::RequestDescriptor;
use crate::engine::EngineResponse;
use crate::error::Result;
use crate::response::Body;

/// Serialize a resolved request into the engine payload.
pub fn encode(descriptor: &RequestDescriptor) -> Result<String> {
    Ok(serde_json::to_string(descriptor)?)
}

/// Decode an engine reply. Missing fields take their defaults.
pub fn decode_response(raw: &str) -> Result<EngineResponse> {
    Ok(serde_json::from_str(raw)?)
}

/// Pull just the `id` out of a reply that failed [`decode_response`].
///
/// A reply with the wrong shape still owns engine memory; this is how it
/// gets released anyway.
pub fn response_id(raw: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct IdOnly {
        id: Option<String>,
    }
    serde_json::from_str::<IdOnly>(raw).ok().and_then(|r| r.id)
}

/// Best-effort structured decode of a response body.
///
/// JSON text becomes [`Body::Json`]; anything else stays [`Body::Text`].
pub fn decode_body(raw: String) -> Body {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => Body::Json(value),
        Err(_) => Body::Text(raw),
    }
}

/// Reply to `destroySession` / `destroyAll`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DestroyOutput {
    pub id: Option<String>,
    pub success: bool,
}

pub fn decode_destroy_output(raw: &str) -> Result<DestroyOutput> {
    Ok(serde_json::from_str(raw)?)
}

/// Payload for `destroySession`.
pub fn encode_destroy_session(session_id: &str) -> String {
    serde_json::json!({ "sessionId": session_id }).to_string()
}

/// Field deserializer that reads an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
