//! C ABI exports.
//!
//! Each export takes and/or returns one self-contained JSON string.
//! Ownership of every returned pointer stays with the library's buffer
//! registry until the caller passes the payload's `id` to [`freeMemory`];
//! releasing twice is a no-op. Calls run on a process-wide multi-thread
//! runtime, so concurrent callers execute their requests in parallel.

use once_cell::sync::Lazy;
use std::ffi::{c_char, CStr};

use crate::boundary::protocol::{Bridge, EncodedReply};

static BRIDGE: Lazy<Bridge> = Lazy::new(Bridge::new);

static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to start tokio runtime")
});

/// Read a caller-owned C string. Null or non-UTF8 input becomes None.
fn read_input(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // Safety: the caller hands us a valid NUL-terminated string that
    // stays alive for the duration of this call.
    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str().ok().map(|s| s.to_string())
}

fn register(reply: EncodedReply) -> *mut c_char {
    BRIDGE.registry().register(&reply.id, &reply.json) as *mut c_char
}

fn malformed(detail: &str) -> EncodedReply {
    let id = uuid::Uuid::new_v4().to_string();
    EncodedReply {
        json: format!(
            r#"{{"id":"{id}","status":0,"body":"malformed request: {detail}","error":"malformed request: {detail}"}}"#
        ),
        id,
    }
}

/// Execute a request descriptor; returns an encoded ResponseDescriptor.
#[no_mangle]
pub extern "C" fn request(request_params: *const c_char) -> *mut c_char {
    let reply = match read_input(request_params) {
        Some(payload) => RUNTIME.block_on(BRIDGE.request(&payload)),
        None => malformed("null or non-utf8 input"),
    };
    register(reply)
}

/// Query a session's cookie jar for a URL.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn getCookiesFromSession(get_cookies_params: *const c_char) -> *mut c_char {
    let reply = match read_input(get_cookies_params) {
        Some(payload) => BRIDGE.get_cookies_from_session(&payload),
        None => malformed("null or non-utf8 input"),
    };
    register(reply)
}

/// Write cookies into a session's jar, creating the session lazily.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn addCookiesToSession(add_cookies_params: *const c_char) -> *mut c_char {
    let reply = match read_input(add_cookies_params) {
        Some(payload) => BRIDGE.add_cookies_to_session(&payload),
        None => malformed("null or non-utf8 input"),
    };
    register(reply)
}

/// Destroy one session and release its jar.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn destroySession(destroy_session_params: *const c_char) -> *mut c_char {
    let reply = match read_input(destroy_session_params) {
        Some(payload) => BRIDGE.destroy_session(&payload),
        None => malformed("null or non-utf8 input"),
    };
    register(reply)
}

/// Destroy every session.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn destroyAll() -> *mut c_char {
    register(BRIDGE.destroy_all())
}

/// Release one boundary buffer by the `id` carried in its payload.
/// Unknown ids are a no-op, which keeps shutdown races harmless.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn freeMemory(response_id: *const c_char) {
    if let Some(id) = read_input(response_id) {
        BRIDGE.free_memory(&id);
    }
}

/// Release every outstanding boundary buffer.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn releaseAll() {
    BRIDGE.release_all();
}
