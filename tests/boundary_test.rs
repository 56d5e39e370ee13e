use mimicnet::boundary::protocol::Bridge;
use mimicnet::boundary::types::{CookiesFromSessionOutput, Response};

fn decode_response(json: &str) -> Response {
    serde_json::from_str(json).unwrap()
}

fn decode_cookies(json: &str) -> CookiesFromSessionOutput {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn test_malformed_request_yields_encoded_error() {
    let bridge = Bridge::new();
    let reply = bridge.request("{not json").await;

    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);
    assert!(response.error.unwrap().contains("malformed request"));
    assert!(!reply.id.is_empty());
}

#[tokio::test]
async fn test_unknown_profile_yields_status_zero() {
    let bridge = Bridge::new();
    let reply = bridge
        .request(
            r#"{"tlsClientIdentifier": "chrome_9000", "requestUrl": "https://example.com",
                "requestMethod": "GET", "sessionId": "s1"}"#,
        )
        .await;

    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);
    assert!(response
        .error
        .unwrap()
        .contains("no tls client profile found for identifier: chrome_9000"));
    // The session id is echoed even on failure.
    assert_eq!(response.session_id.as_deref(), Some("s1"));
}

#[tokio::test]
async fn test_identifier_and_custom_profile_are_exclusive() {
    let bridge = Bridge::new();
    let reply = bridge
        .request(
            r#"{"tlsClientIdentifier": "chrome_124",
                "customTlsClient": {"ja3String": "771,4865,0,29,0",
                                    "pseudoHeaderOrder": [":method", ":authority", ":scheme", ":path"]},
                "requestUrl": "https://example.com", "requestMethod": "GET"}"#,
        )
        .await;

    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);
    assert!(response.error.unwrap().contains("provide only one of them"));
}

#[tokio::test]
async fn test_missing_url_or_method() {
    let bridge = Bridge::new();
    let reply = bridge.request(r#"{"requestUrl": "https://example.com"}"#).await;
    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);
    assert!(response
        .error
        .unwrap()
        .contains("no request url or request method provided"));
}

#[tokio::test]
async fn test_invalid_byte_request_body() {
    let bridge = Bridge::new();
    let reply = bridge
        .request(
            r#"{"requestUrl": "https://example.com", "requestMethod": "POST",
                "isByteRequest": true, "requestBody": "!!! not base64 !!!"}"#,
        )
        .await;
    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);
    assert!(response.error.unwrap().contains("base64"));
}

#[test]
fn test_add_then_get_cookies() {
    let bridge = Bridge::new();

    let reply = bridge.add_cookies_to_session(
        r#"{"sessionId": "s1", "url": "https://example.com",
            "cookies": [{"name": "a", "value": "1", "domain": "example.com", "path": "/"}]}"#,
    );
    let added = decode_cookies(&reply.json);
    assert_eq!(added.cookies.len(), 1);

    let reply = bridge
        .get_cookies_from_session(r#"{"sessionId": "s1", "url": "https://example.com"}"#);
    let got = decode_cookies(&reply.json);
    assert_eq!(got.cookies.len(), 1);
    assert_eq!(got.cookies[0].name, "a");
    assert_eq!(got.cookies[0].value, "1");
}

#[test]
fn test_get_cookies_respects_url_matching() {
    let bridge = Bridge::new();
    bridge.add_cookies_to_session(
        r#"{"sessionId": "s1", "url": "https://example.com",
            "cookies": [{"name": "a", "value": "1", "domain": "example.com", "path": "/admin"}]}"#,
    );

    let reply = bridge
        .get_cookies_from_session(r#"{"sessionId": "s1", "url": "https://example.com/public"}"#);
    assert!(decode_cookies(&reply.json).cookies.is_empty());
}

#[test]
fn test_destroy_session_clears_jar() {
    let bridge = Bridge::new();
    bridge.add_cookies_to_session(
        r#"{"sessionId": "s1", "url": "https://example.com",
            "cookies": [{"name": "a", "value": "1", "domain": "example.com", "path": "/"}]}"#,
    );

    let reply = bridge.destroy_session(r#"{"sessionId": "s1"}"#);
    assert!(reply.json.contains("\"success\":true"));

    let reply = bridge
        .get_cookies_from_session(r#"{"sessionId": "s1", "url": "https://example.com"}"#);
    assert!(decode_cookies(&reply.json).cookies.is_empty());
}

#[test]
fn test_destroy_all_forgets_every_session() {
    let bridge = Bridge::new();
    for id in ["a", "b", "c"] {
        bridge.add_cookies_to_session(&format!(
            r#"{{"sessionId": "{id}", "url": "https://example.com",
                "cookies": [{{"name": "x", "value": "1", "domain": "example.com", "path": "/"}}]}}"#
        ));
    }
    assert_eq!(bridge.sessions().len(), 3);

    bridge.destroy_all();
    assert!(bridge.sessions().is_empty());

    for id in ["a", "b", "c"] {
        let reply = bridge.get_cookies_from_session(&format!(
            r#"{{"sessionId": "{id}", "url": "https://example.com"}}"#
        ));
        assert!(decode_cookies(&reply.json).cookies.is_empty());
    }
}

#[test]
fn test_free_memory_is_idempotent() {
    let bridge = Bridge::new();
    let reply = bridge.destroy_all();
    let id = reply.id.clone();

    bridge.registry().register(&id, &reply.json);
    assert_eq!(bridge.registry().len(), 1);

    bridge.free_memory(&id);
    bridge.free_memory(&id);
    bridge.free_memory("never-registered");
    assert!(bridge.registry().is_empty());
}

#[test]
fn test_release_all_drains_registry() {
    let bridge = Bridge::new();
    for i in 0..10 {
        bridge
            .registry()
            .register(&format!("buf-{i}"), r#"{"status":200}"#);
    }
    bridge.release_all();
    assert!(bridge.registry().is_empty());
}

#[test]
fn test_malformed_cookie_op_inputs() {
    let bridge = Bridge::new();

    let reply = bridge.get_cookies_from_session("not json at all");
    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);

    let reply = bridge.add_cookies_to_session(r#"{"sessionId": "s1", "url": "::bad::"}"#);
    let response = decode_response(&reply.json);
    assert_eq!(response.status, 0);
    assert!(response.error.unwrap().contains("invalid url"));
}
