//! Browser fingerprint profiles understood by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// TLS client identifier sent as `tlsClientIdentifier`.
///
/// Note: Chrome randomizes TLS extension order since v110. Pair Chrome
/// profiles with `withRandomTLSExtensionOrder` (on by default) or the
/// handshake will not look like a real Chrome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientProfile {
    Chrome112,
    Chrome116Psk,
    Chrome120,
    /// Chrome 124 on Windows.
    #[default]
    Chrome124,
    Chrome131,
    Chrome133,
    Firefox117,
    Firefox120,
    Firefox133,
    Safari16_0,
    SafariIos17_0,
    Okhttp4Android13,
    /// Any identifier the engine knows that has no variant here.
    Custom(String),
}

impl ClientProfile {
    /// Identifier string as the engine expects it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chrome112 => "chrome_112",
            Self::Chrome116Psk => "chrome_116_PSK",
            Self::Chrome120 => "chrome_120",
            Self::Chrome124 => "chrome_124",
            Self::Chrome131 => "chrome_131",
            Self::Chrome133 => "chrome_133",
            Self::Firefox117 => "firefox_117",
            Self::Firefox120 => "firefox_120",
            Self::Firefox133 => "firefox_133",
            Self::Safari16_0 => "safari_16_0",
            Self::SafariIos17_0 => "safari_ios_17_0",
            Self::Okhttp4Android13 => "okhttp4_android_13",
            Self::Custom(id) => id.as_str(),
        }
    }

    /// Get the User-Agent string matching this profile.
    ///
    /// `None` for custom identifiers; the caller supplies its own header.
    pub fn user_agent(&self) -> Option<&'static str> {
        let ua = match self {
            Self::Chrome112 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36",
            Self::Chrome116Psk => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36",
            Self::Chrome120 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            Self::Chrome124 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
            Self::Chrome131 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
            Self::Chrome133 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36",
            Self::Firefox117 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:117.0) Gecko/20100101 Firefox/117.0",
            Self::Firefox120 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
            Self::Firefox133 => "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
            Self::Safari16_0 => "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/605.1.15",
            Self::SafariIos17_0 => "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
            Self::Okhttp4Android13 => "okhttp/4.10.0",
            Self::Custom(_) => return None,
        };
        Some(ua)
    }
}

impl From<String> for ClientProfile {
    fn from(id: String) -> Self {
        match id.as_str() {
            "chrome_112" => Self::Chrome112,
            "chrome_116_PSK" => Self::Chrome116Psk,
            "chrome_120" => Self::Chrome120,
            "chrome_124" => Self::Chrome124,
            "chrome_131" => Self::Chrome131,
            "chrome_133" => Self::Chrome133,
            "firefox_117" => Self::Firefox117,
            "firefox_120" => Self::Firefox120,
            "firefox_133" => Self::Firefox133,
            "safari_16_0" => Self::Safari16_0,
            "safari_ios_17_0" => Self::SafariIos17_0,
            "okhttp4_android_13" => Self::Okhttp4Android13,
            _ => Self::Custom(id),
        }
    }
}

impl From<&str> for ClientProfile {
    fn from(id: &str) -> Self {
        Self::from(id.to_string())
    }
}

impl From<ClientProfile> for String {
    fn from(profile: ClientProfile) -> Self {
        match profile {
            ClientProfile::Custom(id) => id,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_identifier_round_trips_through_string() {
        let profile = ClientProfile::from("chrome_133");
        assert_eq!(profile, ClientProfile::Chrome133);
        assert_eq!(String::from(profile), "chrome_133");
    }

    #[test]
    fn test_unknown_identifier_is_kept_verbatim() {
        let profile = ClientProfile::from("opera_91");
        assert_eq!(profile, ClientProfile::Custom("opera_91".into()));
        assert_eq!(profile.as_str(), "opera_91");
        assert!(profile.user_agent().is_none());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&ClientProfile::Firefox120).unwrap();
        assert_eq!(json, "\"firefox_120\"");
        let back: ClientProfile = serde_json::from_str("\"safari_16_0\"").unwrap();
        assert_eq!(back, ClientProfile::Safari16_0);
    }
}
