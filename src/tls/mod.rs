//! TLS configuration, JA3 parsing and certificate pinning.

pub mod ja3;
pub mod options;
pub mod pinning;

pub use ja3::Ja3Spec;
pub use options::{TlsOptions, TlsOptionsBuilder, TlsVersion};
pub use pinning::{spki_hash, CertificatePinner, SpkiHash};
