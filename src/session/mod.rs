//! Session management.
//!
//! A session owns a cookie jar and the defaults that persist between
//! requests (proxy, redirect policy), plus the reusable HTTP/2 connection
//! handles for its origin set. Sessions are created lazily on first
//! reference and destroyed only explicitly. All locks here guard plain
//! state and are never held across network I/O.

use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::cookies::jar::{JarMode, SessionCookieJar};

/// Defaults a session carries forward into later requests.
#[derive(Debug, Clone, Default)]
pub struct SessionDefaults {
    pub proxy_url: Option<String>,
    pub follow_redirects: bool,
    pub is_rotating_proxy: bool,
}

/// A cached HTTP/2 connection handle, keyed by origin + proxy + profile.
pub type H2Handle = http2::client::SendRequest<bytes::Bytes>;

pub struct Session {
    pub id: String,
    pub created_at: OffsetDateTime,
    jar: Mutex<SessionCookieJar>,
    defaults: Mutex<SessionDefaults>,
    h2_connections: DashMap<String, Mutex<H2Handle>>,
}

impl Session {
    /// A session that is not registered in any store. Used when a request
    /// wants jar semantics for its redirect chain without persisting.
    pub fn detached() -> Arc<Self> {
        Arc::new(Self::new(String::new()))
    }

    fn new(id: String) -> Self {
        Self {
            id,
            created_at: OffsetDateTime::now_utc(),
            jar: Mutex::new(SessionCookieJar::default()),
            defaults: Mutex::new(SessionDefaults {
                follow_redirects: true,
                ..Default::default()
            }),
            h2_connections: DashMap::new(),
        }
    }

    /// Run `f` against the jar under the session lock.
    ///
    /// The closure must not block; callers snapshot what they need and
    /// release before any I/O.
    pub fn with_jar<R>(&self, f: impl FnOnce(&mut SessionCookieJar) -> R) -> R {
        let mut jar = self.jar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut jar)
    }

    pub fn set_jar_mode(&self, mode: JarMode) {
        self.with_jar(|jar| jar.set_mode(mode));
    }

    pub fn defaults(&self) -> SessionDefaults {
        self.defaults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Merge request-level settings into the persisted defaults and return
    /// the effective values, the way the original mutates a stored client.
    pub fn update_defaults(
        &self,
        proxy_url: Option<&str>,
        follow_redirects: bool,
        is_rotating_proxy: bool,
    ) -> SessionDefaults {
        let mut defaults = self
            .defaults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(proxy) = proxy_url {
            if defaults.proxy_url.as_deref() != Some(proxy) {
                // Connections bound to the old proxy are useless now.
                self.h2_connections.clear();
            }
            defaults.proxy_url = Some(proxy.to_string());
        }
        defaults.follow_redirects = follow_redirects;
        defaults.is_rotating_proxy = is_rotating_proxy;
        defaults.clone()
    }

    /// Reusable h2 handle for a connection key, unless rotation disabled
    /// reuse for this session.
    pub fn cached_h2(&self, key: &str) -> Option<H2Handle> {
        if self.defaults().is_rotating_proxy {
            return None;
        }
        self.h2_connections.get(key).map(|h| {
            h.value()
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        })
    }

    pub fn store_h2(&self, key: String, handle: H2Handle) {
        if self.defaults().is_rotating_proxy {
            return;
        }
        self.h2_connections.insert(key, Mutex::new(handle));
    }

    pub fn evict_h2(&self, key: &str) {
        self.h2_connections.remove(key);
    }
}

/// Process-wide map from session id to session.
///
/// The map lock (inside DashMap) is scoped to insert/remove/lookup;
/// per-session state has its own locks.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Existing session, or atomically create one with an empty jar.
    pub fn get_or_create(&self, id: &str) -> Arc<Session> {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Session::new(id.to_string())))
            .value()
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    /// Remove a session; its jar and cached connections go with it.
    pub fn destroy(&self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn destroy_all(&self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
