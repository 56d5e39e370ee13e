//! Boundary operations.
//!
//! Every operation takes and returns one self-contained JSON string.
//! Malformed input yields an encoded error response, never a crash, and
//! every failure flattens into a `status: 0` response with a readable
//! message. The process-wide state lives in an explicit [`Bridge`] so
//! construction and teardown are defined operations rather than implicit
//! globals.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use futures::FutureExt;
use uuid::Uuid;

use crate::base::neterror::NetError;
use crate::boundary::registry::MemoryRegistry;
use crate::boundary::types::{
    AddCookiesToSessionInput, CookieInput, CookiesFromSessionOutput, DestroyOutput,
    DestroySessionInput, GetCookiesFromSessionInput, RequestInput, Response,
};
use crate::cookies::canonical::CanonicalCookie;
use crate::executor::{ExchangeResult, RequestExecutor};
use crate::session::SessionStore;

/// An encoded reply ready to cross the boundary: the payload plus the
/// handle the caller must later release.
pub struct EncodedReply {
    pub id: String,
    pub json: String,
}

/// The explicit context object holding all process-wide state.
pub struct Bridge {
    sessions: Arc<SessionStore>,
    registry: MemoryRegistry,
    executor: RequestExecutor,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        let sessions = Arc::new(SessionStore::new());
        Self {
            executor: RequestExecutor::new(sessions.clone()),
            sessions,
            registry: MemoryRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn registry(&self) -> &MemoryRegistry {
        &self.registry
    }

    /// Full request operation.
    pub async fn request(&self, payload: &str) -> EncodedReply {
        let input: RequestInput = match serde_json::from_str(payload) {
            Ok(input) => input,
            Err(e) => {
                return self.error_reply(
                    None,
                    &NetError::MalformedRequest(e.to_string()),
                )
            }
        };

        let echo_session = input
            .session_id
            .clone()
            .filter(|id| !id.is_empty() && !input.without_cookie_jar);

        let result = if input.catch_panics {
            match std::panic::AssertUnwindSafe(self.executor.execute(&input))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::warn!(message = %message, "caught fault in request execution");
                    Err(NetError::InternalFault(message))
                }
            }
        } else {
            self.executor.execute(&input).await
        };

        match result {
            Ok(exchange) => self.success_reply(&input, exchange),
            Err(err) => self.error_reply(echo_session, &err),
        }
    }

    fn success_reply(&self, input: &RequestInput, exchange: ExchangeResult) -> EncodedReply {
        let response = &exchange.response;

        let body = if input.is_byte_response {
            let mime = response
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            format!(
                "data:{mime};base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&response.body)
            )
        } else {
            String::from_utf8_lossy(&response.body).into_owned()
        };

        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers.iter() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let cookies: HashMap<String, String> = exchange
            .cookies
            .iter()
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect();

        let reply = Response {
            id: Uuid::new_v4().to_string(),
            session_id: exchange
                .with_session
                .then(|| exchange.session_id.clone()),
            status: response.status.as_u16(),
            target: response.final_url.to_string(),
            used_protocol: response.protocol().to_string(),
            body,
            headers: Some(headers),
            cookies: Some(cookies),
            error: None,
        };
        self.encode(reply)
    }

    fn error_reply(&self, session_id: Option<String>, err: &NetError) -> EncodedReply {
        let message = err.to_string();
        let reply = Response {
            id: Uuid::new_v4().to_string(),
            session_id,
            status: 0,
            body: message.clone(),
            error: Some(message),
            ..Default::default()
        };
        self.encode(reply)
    }

    fn encode(&self, reply: Response) -> EncodedReply {
        let id = reply.id.clone();
        let json = serde_json::to_string(&reply)
            .unwrap_or_else(|e| format!(r#"{{"id":"{id}","status":0,"body":"{e}"}}"#));
        EncodedReply { id, json }
    }

    fn encode_value<T: serde::Serialize>(&self, id: String, value: &T) -> EncodedReply {
        match serde_json::to_string(value) {
            Ok(json) => EncodedReply { id, json },
            Err(e) => self.error_reply(None, &NetError::InternalFault(e.to_string())),
        }
    }

    /// Jar query for a session. A destroyed or never-seen session behaves
    /// as not found: an empty cookie list, never stale contents.
    pub fn get_cookies_from_session(&self, payload: &str) -> EncodedReply {
        let input: GetCookiesFromSessionInput = match serde_json::from_str(payload) {
            Ok(input) => input,
            Err(e) => {
                return self.error_reply(None, &NetError::MalformedRequest(e.to_string()))
            }
        };

        let url = match url::Url::parse(&input.url) {
            Ok(url) => url,
            Err(e) => {
                return self.error_reply(
                    Some(input.session_id),
                    &NetError::InvalidUrl(format!("{}: {e}", input.url)),
                )
            }
        };

        let cookies = match self.sessions.get(&input.session_id) {
            Some(session) => session.with_jar(|jar| jar.query(&url)),
            None => Vec::new(),
        };

        let out = CookiesFromSessionOutput {
            id: Uuid::new_v4().to_string(),
            cookies: cookies.iter().map(to_cookie_output).collect(),
        };
        self.encode_value(out.id.clone(), &out)
    }

    /// Jar write for a session, creating it lazily, echoing the resulting
    /// jar view for the URL.
    pub fn add_cookies_to_session(&self, payload: &str) -> EncodedReply {
        let input: AddCookiesToSessionInput = match serde_json::from_str(payload) {
            Ok(input) => input,
            Err(e) => {
                return self.error_reply(None, &NetError::MalformedRequest(e.to_string()))
            }
        };

        let url = match url::Url::parse(&input.url) {
            Ok(url) => url,
            Err(e) => {
                return self.error_reply(
                    Some(input.session_id),
                    &NetError::InvalidUrl(format!("{}: {e}", input.url)),
                )
            }
        };

        let session = self.sessions.get_or_create(&input.session_id);
        let cookies = session.with_jar(|jar| {
            for c in &input.cookies {
                jar.upsert(CanonicalCookie::from_parts(
                    c.name.clone(),
                    c.value.clone(),
                    Some(c.domain.clone()).filter(|d| !d.is_empty()),
                    Some(c.path.clone()).filter(|p| !p.is_empty()),
                    c.expires,
                    &url,
                ));
            }
            jar.query(&url)
        });

        let out = CookiesFromSessionOutput {
            id: Uuid::new_v4().to_string(),
            cookies: cookies.iter().map(to_cookie_output).collect(),
        };
        self.encode_value(out.id.clone(), &out)
    }

    pub fn destroy_session(&self, payload: &str) -> EncodedReply {
        let input: DestroySessionInput = match serde_json::from_str(payload) {
            Ok(input) => input,
            Err(e) => {
                return self.error_reply(None, &NetError::MalformedRequest(e.to_string()))
            }
        };

        self.sessions.destroy(&input.session_id);
        let out = DestroyOutput {
            id: Uuid::new_v4().to_string(),
            success: true,
        };
        self.encode_value(out.id.clone(), &out)
    }

    pub fn destroy_all(&self) -> EncodedReply {
        self.sessions.destroy_all();
        let out = DestroyOutput {
            id: Uuid::new_v4().to_string(),
            success: true,
        };
        self.encode_value(out.id.clone(), &out)
    }

    /// Release one boundary buffer by handle. Absent handles are a no-op.
    pub fn free_memory(&self, id: &str) {
        self.registry.release(id);
    }

    /// Release every outstanding boundary buffer.
    pub fn release_all(&self) {
        self.registry.release_all();
    }
}

fn to_cookie_output(cookie: &CanonicalCookie) -> CookieInput {
    CookieInput {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        path: cookie.path.clone(),
        domain: cookie.domain.clone(),
        expires: cookie.expires,
    }
}
