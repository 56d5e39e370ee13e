//! Cookie storage with domain/path matching and expiry.

pub mod canonical;
pub mod jar;

pub use canonical::CanonicalCookie;
pub use jar::{JarMode, SessionCookieJar};
