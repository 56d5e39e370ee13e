//! Chrome client profiles.

use super::ClientProfile;
use crate::http::h2fingerprint::H2Fingerprint;
use crate::tls::options::{TlsOptions, TlsVersion};
use boring::ssl::CertificateCompressionAlgorithm;

const CHROME_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:\
TLS_CHACHA20_POLY1305_SHA256:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:\
ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-CHACHA20-POLY1305:\
ECDHE-RSA-CHACHA20-POLY1305:ECDHE-RSA-AES128-SHA:ECDHE-RSA-AES256-SHA:AES128-GCM-SHA256:\
AES256-GCM-SHA384:AES128-SHA:AES256-SHA";

const CHROME_CURVES: &str = "X25519:P-256:P-384";

const CHROME_SIGALGS: &str = "ecdsa_secp256r1_sha256:rsa_pss_rsae_sha256:rsa_pkcs1_sha256:\
ecdsa_secp384r1_sha384:rsa_pss_rsae_sha384:rsa_pkcs1_sha384:rsa_pss_rsae_sha512:\
rsa_pkcs1_sha512";

fn tls_options(pre_shared_key: bool, permute_extensions: bool) -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(CHROME_CIPHERS)
        .curves_list(CHROME_CURVES)
        .sigalgs_list(CHROME_SIGALGS)
        .min_tls_version(TlsVersion::TLS_1_2)
        .max_tls_version(TlsVersion::TLS_1_3)
        .grease_enabled(true)
        .permute_extensions(permute_extensions)
        .enable_ech_grease(true)
        .pre_shared_key(pre_shared_key)
        .enable_ocsp_stapling(true)
        .enable_signed_cert_timestamps(true)
        .certificate_compression_algorithms(&[CertificateCompressionAlgorithm::BROTLI])
        .build()
}

/// Chrome 103-112: fixed extension order, no PSK resumption offer.
pub fn classic(name: &'static str) -> ClientProfile {
    ClientProfile {
        name,
        tls: tls_options(false, false),
        h2: H2Fingerprint::chrome(),
    }
}

/// Chrome 116+ with PSK resumption.
pub fn psk(name: &'static str) -> ClientProfile {
    ClientProfile {
        name,
        tls: tls_options(true, false),
        h2: H2Fingerprint::chrome(),
    }
}

/// Chrome 117+: permuted extension order shipped by default.
pub fn shuffled(name: &'static str) -> ClientProfile {
    ClientProfile {
        name,
        tls: tls_options(true, true),
        h2: H2Fingerprint::chrome(),
    }
}
