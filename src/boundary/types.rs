//! Wire types for the boundary protocol.
//!
//! One versioned request structure with defaulted optional fields:
//! unrecognized JSON fields are ignored for forward compatibility,
//! missing fields default conservatively. Field names are fixed by the
//! consumers on the far side of the boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::profiles::CustomTlsClient;

fn default_true() -> bool {
    true
}

/// A full request descriptor as decoded from the caller's JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub tls_client_identifier: String,
    #[serde(default)]
    pub custom_tls_client: Option<CustomTlsClient>,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
    #[serde(default)]
    pub force_http1: bool,
    #[serde(default)]
    pub is_byte_response: bool,
    #[serde(default)]
    pub is_byte_request: bool,
    #[serde(default)]
    pub without_cookie_jar: bool,
    #[serde(default)]
    pub with_default_cookie_jar: bool,
    #[serde(default)]
    pub with_random_tls_extension_order: bool,
    #[serde(default)]
    pub catch_panics: bool,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub timeout_milliseconds: u64,
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default)]
    pub is_rotating_proxy: bool,
    #[serde(default)]
    pub certificate_pinning_hosts: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub header_order: Vec<String>,
    #[serde(default)]
    pub request_url: String,
    #[serde(default)]
    pub request_method: String,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub request_cookies: Vec<CookieInput>,
}

/// A cookie as it crosses the boundary. Expiry travels as unix seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default, with = "unix_seconds")]
    pub expires: Option<OffsetDateTime>,
}

/// The response sent back to the caller. `status: 0` signals an
/// internal/transport failure, never a real HTTP status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Response {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub status: u16,
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub used_protocol: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesFromSessionInput {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCookiesToSessionInput {
    pub session_id: String,
    pub url: String,
    #[serde(default)]
    pub cookies: Vec<CookieInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookiesFromSessionOutput {
    pub id: String,
    pub cookies: Vec<CookieInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroySessionInput {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyOutput {
    pub id: String,
    pub success: bool,
}

/// Unix-seconds (de)serialization for optional expiry stamps; zero and
/// negative stamps mean "no expiry".
mod unix_seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.map(|t| t.unix_timestamp()).unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw
            .filter(|secs| *secs > 0)
            .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok()))
    }
}

impl RequestInput {
    /// Effective request timeout. Milliseconds override seconds when
    /// positive; both absent or zero fall back to 30 seconds.
    pub fn timeout(&self) -> std::time::Duration {
        if self.timeout_milliseconds > 0 {
            std::time::Duration::from_millis(self.timeout_milliseconds)
        } else if self.timeout_seconds > 0 {
            std::time::Duration::from_secs(self.timeout_seconds)
        } else {
            std::time::Duration::from_secs(30)
        }
    }
}
