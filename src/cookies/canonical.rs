use time::OffsetDateTime;
use url::Url;

/// A cookie in its stored, fully-resolved form.
///
/// Jar identity is `(name, domain, path)`; a later write for the same key
/// overwrites the earlier one.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Set when the cookie carried no explicit Domain attribute; matching
    /// is then exact-host only.
    pub host_only: bool,
    pub secure: bool,
    pub http_only: bool,
    pub expires: Option<OffsetDateTime>,
    /// Jar insertion sequence, ties query ordering.
    pub sequence: u64,
}

impl CanonicalCookie {
    /// Resolve explicit fields against the URL the cookie came from.
    ///
    /// An absent domain makes the cookie host-only on the source host; an
    /// absent path defaults to `/`. A leading dot on an explicit domain is
    /// stripped, as browsers do.
    pub fn from_parts(
        name: String,
        value: String,
        domain: Option<String>,
        path: Option<String>,
        expires: Option<OffsetDateTime>,
        source_url: &Url,
    ) -> Self {
        let (domain, host_only) = match domain.filter(|d| !d.is_empty()) {
            Some(d) => (d.trim_start_matches('.').to_lowercase(), false),
            None => (
                source_url.host_str().unwrap_or_default().to_lowercase(),
                true,
            ),
        };
        let path = match path.filter(|p| p.starts_with('/')) {
            Some(p) => p,
            None => "/".to_string(),
        };

        Self {
            name,
            value,
            domain,
            path,
            host_only,
            secure: false,
            http_only: false,
            expires,
            sequence: 0,
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|exp| exp <= now)
    }

    /// RFC 6265 domain matching: exact host, or suffix across a dot
    /// boundary for non-host-only cookies.
    pub fn domain_matches(&self, request_host: &str) -> bool {
        if self.domain.eq_ignore_ascii_case(request_host) {
            return true;
        }
        if self.host_only {
            return false;
        }

        if request_host.len() > self.domain.len() {
            let suffix = &request_host[request_host.len() - self.domain.len()..];
            if suffix.eq_ignore_ascii_case(&self.domain) {
                let boundary = request_host.as_bytes()[request_host.len() - self.domain.len() - 1];
                return boundary == b'.';
            }
        }
        false
    }

    /// RFC 6265 path matching: the cookie path is the request path, or a
    /// prefix ending at a `/` boundary.
    pub fn path_matches(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        if request_path.starts_with(&self.path) {
            if self.path.ends_with('/') {
                return true;
            }
            return request_path.as_bytes().get(self.path.len()) == Some(&b'/');
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> Url {
        Url::parse("https://shop.example.com/cart/items").unwrap()
    }

    #[test]
    fn test_defaults_from_source_url() {
        let c = CanonicalCookie::from_parts("a".into(), "1".into(), None, None, None, &src());
        assert_eq!(c.domain, "shop.example.com");
        assert!(c.host_only);
        assert_eq!(c.path, "/");
    }

    #[test]
    fn test_explicit_domain_strips_dot() {
        let c = CanonicalCookie::from_parts(
            "a".into(),
            "1".into(),
            Some(".Example.COM".into()),
            Some("/cart".into()),
            None,
            &src(),
        );
        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
        assert_eq!(c.path, "/cart");
    }

    #[test]
    fn test_domain_matching() {
        let c = CanonicalCookie::from_parts(
            "a".into(),
            "1".into(),
            Some("example.com".into()),
            None,
            None,
            &src(),
        );
        assert!(c.domain_matches("example.com"));
        assert!(c.domain_matches("shop.example.com"));
        assert!(!c.domain_matches("notexample.com"));
        assert!(!c.domain_matches("com"));
    }

    #[test]
    fn test_host_only_requires_exact_match() {
        let c = CanonicalCookie::from_parts("a".into(), "1".into(), None, None, None, &src());
        assert!(c.domain_matches("shop.example.com"));
        assert!(!c.domain_matches("sub.shop.example.com"));
    }

    #[test]
    fn test_path_matching() {
        let mut c = CanonicalCookie::from_parts(
            "a".into(),
            "1".into(),
            None,
            Some("/cart".into()),
            None,
            &src(),
        );
        assert!(c.path_matches("/cart"));
        assert!(c.path_matches("/cart/items"));
        assert!(!c.path_matches("/cartel"));
        assert!(!c.path_matches("/"));

        c.path = "/".into();
        assert!(c.path_matches("/anything"));
    }

    #[test]
    fn test_expiry() {
        let now = OffsetDateTime::now_utc();
        let mut c = CanonicalCookie::from_parts("a".into(), "1".into(), None, None, None, &src());
        assert!(!c.is_expired(now));
        c.expires = Some(now - time::Duration::seconds(1));
        assert!(c.is_expired(now));
        c.expires = Some(now + time::Duration::hours(1));
        assert!(!c.is_expired(now));
    }
}
