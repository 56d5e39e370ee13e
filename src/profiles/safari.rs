//! Safari client profiles (desktop and iOS).

use super::ClientProfile;
use crate::http::h2fingerprint::H2Fingerprint;
use crate::tls::options::{TlsOptions, TlsVersion};
use boring::ssl::CertificateCompressionAlgorithm;

const SAFARI_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:\
TLS_CHACHA20_POLY1305_SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-ECDSA-AES128-GCM-SHA256:\
ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-RSA-AES128-GCM-SHA256:\
ECDHE-RSA-CHACHA20-POLY1305:ECDHE-ECDSA-AES256-SHA384:ECDHE-ECDSA-AES128-SHA256:\
ECDHE-ECDSA-AES256-SHA:ECDHE-ECDSA-AES128-SHA:ECDHE-RSA-AES256-SHA384:\
ECDHE-RSA-AES128-SHA256:ECDHE-RSA-AES256-SHA:ECDHE-RSA-AES128-SHA:AES256-GCM-SHA384:\
AES128-GCM-SHA256:AES256-SHA256:AES128-SHA256:AES256-SHA:AES128-SHA:\
ECDHE-ECDSA-DES-CBC3-SHA:ECDHE-RSA-DES-CBC3-SHA:DES-CBC3-SHA";

const SAFARI_CURVES: &str = "X25519:P-256:P-384:P-521";

const SAFARI_SIGALGS: &str = "ecdsa_secp256r1_sha256:rsa_pss_rsae_sha256:rsa_pkcs1_sha256:\
ecdsa_secp384r1_sha384:ecdsa_sha1:rsa_pss_rsae_sha384:rsa_pkcs1_sha384:\
rsa_pss_rsae_sha512:rsa_pkcs1_sha512:rsa_pkcs1_sha1";

fn tls_options() -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(SAFARI_CIPHERS)
        .curves_list(SAFARI_CURVES)
        .sigalgs_list(SAFARI_SIGALGS)
        .min_tls_version(TlsVersion::TLS_1_0)
        .max_tls_version(TlsVersion::TLS_1_3)
        .session_ticket(false)
        .grease_enabled(true)
        .enable_ocsp_stapling(true)
        .enable_signed_cert_timestamps(true)
        .certificate_compression_algorithms(&[CertificateCompressionAlgorithm::ZLIB])
        .build()
}

pub fn desktop(name: &'static str) -> ClientProfile {
    ClientProfile {
        name,
        tls: tls_options(),
        h2: H2Fingerprint::safari(),
    }
}

/// iOS builds share the desktop hello but cap the stream window lower.
pub fn ios(name: &'static str) -> ClientProfile {
    let mut h2 = H2Fingerprint::safari();
    h2.initial_window_size = 1_048_576;
    h2.initial_conn_window_size = 10_551_295;
    ClientProfile {
        name,
        tls: tls_options(),
        h2,
    }
}
