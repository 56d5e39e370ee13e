use time::OffsetDateTime;
use url::Url;

use crate::cookies::canonical::CanonicalCookie;

/// How strictly the jar applies RFC 6265 on reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JarMode {
    /// Secure cookies are returned for any scheme. Matches the permissive
    /// jar automation callers expect.
    #[default]
    Permissive,
    /// Secure cookies only over https, like the platform jars.
    Strict,
}

/// Per-session cookie store.
///
/// Identity within the jar is `(name, domain, path)`; later writes
/// overwrite. Reads return matches ordered most-specific-path first, then
/// by insertion order, and purge expired entries as they are seen.
#[derive(Debug, Default)]
pub struct SessionCookieJar {
    mode: JarMode,
    entries: Vec<CanonicalCookie>,
    next_sequence: u64,
}

impl SessionCookieJar {
    pub fn new(mode: JarMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            next_sequence: 0,
        }
    }

    pub fn mode(&self) -> JarMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: JarMode) {
        self.mode = mode;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite by `(name, domain, path)`.
    ///
    /// A cookie that is already expired removes any stored entry under the
    /// same key and is not stored itself; that is how Set-Cookie deletion
    /// works.
    pub fn upsert(&mut self, mut cookie: CanonicalCookie) {
        let now = OffsetDateTime::now_utc();
        self.entries.retain(|c| {
            c.name != cookie.name || c.domain != cookie.domain || c.path != cookie.path
        });
        if cookie.is_expired(now) {
            return;
        }
        cookie.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push(cookie);
    }

    /// Parse one Set-Cookie line relative to the URL that sent it.
    ///
    /// Malformed lines are logged and skipped; they never fail the request.
    pub fn store_response_cookie(&mut self, url: &Url, set_cookie: &str) {
        match cookie::Cookie::parse(set_cookie.to_string()) {
            Ok(parsed) => {
                let expires = match parsed.expires() {
                    Some(cookie::Expiration::DateTime(dt)) => Some(dt),
                    Some(cookie::Expiration::Session) => None,
                    None => parsed
                        .max_age()
                        .map(|age| OffsetDateTime::now_utc() + age),
                };

                let mut canonical = CanonicalCookie::from_parts(
                    parsed.name().to_string(),
                    parsed.value().to_string(),
                    parsed.domain().map(|d| d.to_string()),
                    parsed.path().map(|p| p.to_string()),
                    expires,
                    url,
                );
                canonical.secure = parsed.secure().unwrap_or(false);
                canonical.http_only = parsed.http_only().unwrap_or(false);
                self.upsert(canonical);
            }
            Err(err) => {
                tracing::debug!(error = %err, line = set_cookie, "skipping malformed cookie");
            }
        }
    }

    /// Cookies matching `url`, most-specific-path first, then insertion
    /// order. Entries expired by now are dropped from the jar.
    pub fn query(&mut self, url: &Url) -> Vec<CanonicalCookie> {
        let now = OffsetDateTime::now_utc();
        self.entries.retain(|c| !c.is_expired(now));

        let host = url.host_str().unwrap_or_default();
        let path = url.path();
        let https = url.scheme() == "https";

        let mut matches: Vec<CanonicalCookie> = self
            .entries
            .iter()
            .filter(|c| c.domain_matches(host))
            .filter(|c| c.path_matches(path))
            .filter(|c| match self.mode {
                JarMode::Permissive => true,
                JarMode::Strict => !c.secure || https,
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        matches
    }

    /// Render the Cookie request header value for `url`.
    pub fn cookie_header(&mut self, url: &Url) -> Option<String> {
        let cookies = self.query(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
