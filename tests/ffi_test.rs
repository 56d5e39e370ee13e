//! Exercises the C ABI exports in-process: pointers go out, JSON comes
//! back, and every returned buffer is released through the registry.

use std::ffi::{CStr, CString};

use mimicnet::boundary::types::Response;
use mimicnet::ffi;

fn read_reply(ptr: *mut std::ffi::c_char) -> String {
    assert!(!ptr.is_null());
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
}

fn free_by_id(json: &str) {
    let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
    let id = parsed["id"].as_str().unwrap();
    let id_cstr = CString::new(id).unwrap();
    ffi::freeMemory(id_cstr.as_ptr());
}

#[test]
fn test_destroy_all_round_trip() {
    let reply = read_reply(ffi::destroyAll());
    let parsed: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(parsed["success"], true);
    assert!(parsed["id"].as_str().is_some());
    free_by_id(&reply);
}

#[test]
fn test_request_with_null_pointer_is_malformed() {
    let reply = read_reply(ffi::request(std::ptr::null()));
    let response: Response = serde_json::from_str(&reply).unwrap();
    assert_eq!(response.status, 0);
    assert!(response.body.contains("malformed request"));
    free_by_id(&reply);
}

#[test]
fn test_unknown_profile_over_ffi() {
    let payload = CString::new(
        r#"{"tlsClientIdentifier": "mosaic_1", "requestUrl": "https://example.com",
            "requestMethod": "GET"}"#,
    )
    .unwrap();
    let reply = read_reply(ffi::request(payload.as_ptr()));
    let response: Response = serde_json::from_str(&reply).unwrap();
    assert_eq!(response.status, 0);
    assert!(response.error.unwrap().contains("mosaic_1"));
    free_by_id(&reply);
}

#[test]
fn test_cookie_session_flow_over_ffi() {
    let add = CString::new(
        r#"{"sessionId": "ffi-s1", "url": "https://example.com",
            "cookies": [{"name": "a", "value": "1", "domain": "example.com", "path": "/"}]}"#,
    )
    .unwrap();
    let reply = read_reply(ffi::addCookiesToSession(add.as_ptr()));
    assert!(reply.contains("\"a\""));
    free_by_id(&reply);

    let get = CString::new(r#"{"sessionId": "ffi-s1", "url": "https://example.com"}"#).unwrap();
    let reply = read_reply(ffi::getCookiesFromSession(get.as_ptr()));
    assert!(reply.contains("\"value\":\"1\""));
    free_by_id(&reply);

    let destroy = CString::new(r#"{"sessionId": "ffi-s1"}"#).unwrap();
    let reply = read_reply(ffi::destroySession(destroy.as_ptr()));
    assert!(reply.contains("\"success\":true"));
    free_by_id(&reply);

    let reply = read_reply(ffi::getCookiesFromSession(get.as_ptr()));
    assert!(reply.contains("\"cookies\":[]"));
    free_by_id(&reply);
}

#[test]
fn test_free_memory_twice_and_release_all() {
    let reply = read_reply(ffi::destroyAll());
    free_by_id(&reply);
    // Releasing the same handle again must not fault.
    free_by_id(&reply);

    // Null handle is ignored.
    ffi::freeMemory(std::ptr::null());

    ffi::releaseAll();
}
