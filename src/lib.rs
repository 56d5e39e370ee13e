//! # mimicnet
//!
//! A native HTTP(S) client that impersonates the TLS and HTTP/2 wire
//! fingerprints of real browsers while exposing a minimal JSON
//! request/response surface over a C call boundary.
//!
//! ## Features
//!
//! - **TLS fingerprinting**: BoringSSL ClientHello shaped by named browser
//!   profiles or inline JA3-based custom specs
//! - **HTTP/2 fingerprinting**: SETTINGS values and order, pseudo-header
//!   order, connection window and priority frames applied verbatim
//! - **Ordered headers**: outgoing header order is the caller's order
//! - **Sessions**: per-session cookie jars with domain/path matching,
//!   persisted defaults and connection reuse
//! - **Proxies**: forward proxies with CONNECT tunneling and rotation
//! - **Certificate pinning**: per-host SPKI SHA-256 allow-lists
//!
//! ## Modules
//!
//! - [`base`] - Core error taxonomy
//! - [`profiles`] - Named browser profiles and custom profile validation
//! - [`tls`] - TLS options, JA3 parsing, certificate pinning
//! - [`http`] - Ordered headers, H2 fingerprints, collected responses
//! - [`cookies`] - Cookie jar with domain/path matching and expiry
//! - [`session`] - Session store and per-session state
//! - [`executor`] - The request state machine
//! - [`boundary`] - JSON protocol, buffer registry, bridge context
//! - [`ffi`] - C ABI exports
//!
//! ## Boundary contract
//!
//! Every boundary operation takes and returns one self-contained JSON
//! string. A `status` of 0 in a response signals an internal or transport
//! failure, never a real HTTP status. Returned buffers remain valid until
//! released through `freeMemory` with the payload's `id`, and releasing a
//! buffer twice is a no-op.

pub mod base;
pub mod boundary;
pub mod cookies;
pub mod dns;
pub mod executor;
pub mod ffi;
pub mod http;
pub mod profiles;
pub mod session;
pub mod socket;
pub mod tls;
