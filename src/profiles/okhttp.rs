//! OkHttp client profiles (Android HTTP stacks).

use super::ClientProfile;
use crate::http::h2fingerprint::H2Fingerprint;
use crate::tls::options::{TlsOptions, TlsVersion};

const OKHTTP_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:\
TLS_CHACHA20_POLY1305_SHA256:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:\
ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-CHACHA20-POLY1305:\
ECDHE-RSA-CHACHA20-POLY1305:ECDHE-RSA-AES128-SHA:ECDHE-RSA-AES256-SHA:AES128-GCM-SHA256:\
AES256-GCM-SHA384:AES128-SHA:AES256-SHA";

const OKHTTP_CURVES: &str = "X25519:P-256:P-384";

fn tls_options() -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(OKHTTP_CIPHERS)
        .curves_list(OKHTTP_CURVES)
        .min_tls_version(TlsVersion::TLS_1_2)
        .max_tls_version(TlsVersion::TLS_1_3)
        .build()
}

pub fn android(name: &'static str) -> ClientProfile {
    ClientProfile {
        name,
        tls: tls_options(),
        h2: H2Fingerprint::okhttp(),
    }
}
