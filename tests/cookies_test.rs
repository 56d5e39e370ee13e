use mimicnet::cookies::canonical::CanonicalCookie;
use mimicnet::cookies::jar::{JarMode, SessionCookieJar};
use time::OffsetDateTime;
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn cookie(name: &str, value: &str, domain: &str, path: &str) -> CanonicalCookie {
    CanonicalCookie::from_parts(
        name.into(),
        value.into(),
        Some(domain.into()),
        Some(path.into()),
        None,
        &url("https://example.com/"),
    )
}

#[test]
fn test_set_then_query_round_trip() {
    let mut jar = SessionCookieJar::default();
    jar.store_response_cookie(&url("https://example.com/foo"), "foo=bar; Path=/");

    let cookies = jar.query(&url("https://example.com/foo"));
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "foo");
    assert_eq!(cookies[0].value, "bar");
    assert_eq!(cookies[0].path, "/");
}

#[test]
fn test_domain_suffix_matching() {
    let mut jar = SessionCookieJar::default();
    let source = url("https://a.example.com/");

    // Host-only cookie for the exact host.
    jar.store_response_cookie(&source, "host=val");
    // Domain cookie for the superdomain.
    jar.store_response_cookie(&source, "domain=val; Domain=example.com");

    let from_host = jar.query(&source);
    assert!(from_host.iter().any(|c| c.name == "host"));
    assert!(from_host.iter().any(|c| c.name == "domain"));

    // A sibling subdomain sees only the domain cookie.
    let from_sibling = jar.query(&url("https://b.example.com/"));
    assert!(!from_sibling.iter().any(|c| c.name == "host"));
    assert!(from_sibling.iter().any(|c| c.name == "domain"));

    // An unrelated domain that merely ends with the same string sees nothing.
    assert!(jar.query(&url("https://notexample.com/")).is_empty());
}

#[test]
fn test_path_prefix_matching() {
    let mut jar = SessionCookieJar::default();
    let source = url("https://example.com/foo/bar");

    jar.store_response_cookie(&source, "root=val; Path=/");
    jar.store_response_cookie(&source, "foo=val; Path=/foo");
    jar.store_response_cookie(&source, "baz=val; Path=/baz");

    let cookies = jar.query(&source);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.name == "root"));
    assert!(cookies.iter().any(|c| c.name == "foo"));
    // `/foo` must not match `/foobar`.
    let cookies = jar.query(&url("https://example.com/foobar"));
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "root");
}

#[test]
fn test_most_specific_path_first_then_insertion_order() {
    let mut jar = SessionCookieJar::default();
    jar.upsert(cookie("first", "1", "example.com", "/"));
    jar.upsert(cookie("deep", "2", "example.com", "/account/settings"));
    jar.upsert(cookie("mid", "3", "example.com", "/account"));
    jar.upsert(cookie("second", "4", "example.com", "/"));

    let names: Vec<String> = jar
        .query(&url("https://example.com/account/settings"))
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["deep", "mid", "first", "second"]);
}

#[test]
fn test_later_write_overwrites() {
    let mut jar = SessionCookieJar::default();
    jar.upsert(cookie("a", "old", "example.com", "/"));
    jar.upsert(cookie("a", "new", "example.com", "/"));

    let cookies = jar.query(&url("https://example.com/"));
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value, "new");
}

#[test]
fn test_past_expiry_dropped_immediately() {
    let mut jar = SessionCookieJar::default();
    let mut dead = cookie("dead", "x", "example.com", "/");
    dead.expires = Some(OffsetDateTime::now_utc() - time::Duration::days(1));
    jar.upsert(dead);

    assert!(jar.is_empty());
    assert!(jar.query(&url("https://example.com/")).is_empty());
}

#[test]
fn test_secure_filter_strict_vs_permissive() {
    let mut jar = SessionCookieJar::new(JarMode::Strict);
    jar.store_response_cookie(&url("https://example.com/"), "s=1; Secure");

    assert!(jar.query(&url("http://example.com/")).is_empty());
    assert_eq!(jar.query(&url("https://example.com/")).len(), 1);

    let mut jar = SessionCookieJar::new(JarMode::Permissive);
    jar.store_response_cookie(&url("https://example.com/"), "s=1; Secure");
    assert_eq!(jar.query(&url("http://example.com/")).len(), 1);
}

#[test]
fn test_malformed_set_cookie_skipped() {
    let mut jar = SessionCookieJar::default();
    let source = url("https://example.com/");
    jar.store_response_cookie(&source, "");
    jar.store_response_cookie(&source, "novalue");
    jar.store_response_cookie(&source, "good=1");

    let cookies = jar.query(&source);
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "good");
}

#[test]
fn test_max_age_sets_expiry() {
    let mut jar = SessionCookieJar::default();
    let source = url("https://example.com/");
    jar.store_response_cookie(&source, "short=1; Max-Age=3600");

    let cookies = jar.query(&source);
    assert_eq!(cookies.len(), 1);
    let expires = cookies[0].expires.unwrap();
    assert!(expires > OffsetDateTime::now_utc());
}
