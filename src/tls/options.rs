use crate::base::neterror::NetError;
use boring::ssl::{
    CertificateCompressionAlgorithm, SslConnectorBuilder, SslVerifyMode, SslVersion,
};

/// TLS protocol version, newtype over BoringSSL's constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsVersion(pub SslVersion);

impl TlsVersion {
    pub const TLS_1_0: TlsVersion = TlsVersion(SslVersion::TLS1);
    pub const TLS_1_1: TlsVersion = TlsVersion(SslVersion::TLS1_1);
    pub const TLS_1_2: TlsVersion = TlsVersion(SslVersion::TLS1_2);
    pub const TLS_1_3: TlsVersion = TlsVersion(SslVersion::TLS1_3);
}

/// Builder for `TlsOptions`.
#[must_use]
#[derive(Debug, Clone)]
pub struct TlsOptionsBuilder {
    config: TlsOptions,
}

/// TLS connection configuration options.
///
/// Everything here feeds the ClientHello; the resolved profile's lists are
/// applied verbatim because their ordering is the fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsOptions {
    /// ALPN protocols, most preferred first.
    pub alpn_protocols: Vec<String>,

    /// Minimum TLS version.
    pub min_tls_version: Option<TlsVersion>,

    /// Maximum TLS version.
    pub max_tls_version: Option<TlsVersion>,

    /// Enable session tickets.
    pub session_ticket: bool,

    /// Cipher suite configuration string (OpenSSL syntax, colon separated).
    pub cipher_list: Option<String>,

    /// Supported curves list.
    pub curves_list: Option<String>,

    /// Supported signature algorithms.
    pub sigalgs_list: Option<String>,

    /// Enable OCSP stapling.
    pub enable_ocsp_stapling: bool,

    /// Enable Signed Certificate Timestamps (SCT).
    pub enable_signed_cert_timestamps: bool,

    /// Enable GREASE.
    pub grease_enabled: Option<bool>,

    /// Permute extension order in the ClientHello.
    pub permute_extensions: Option<bool>,

    /// Enable ECH GREASE.
    pub enable_ech_grease: bool,

    /// Offer a TLS 1.3 pre-shared key.
    pub pre_shared_key: bool,

    /// Certificate compression algorithms.
    pub certificate_compression_algorithms: Option<Vec<CertificateCompressionAlgorithm>>,

    /// Declared extension order (JA3 field three). Validated, recorded for
    /// fingerprint reporting; BoringSSL owns the ClientHello layout.
    pub extension_order: Vec<u16>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            alpn_protocols: vec!["h2".to_string(), "http/1.1".to_string()],
            min_tls_version: Some(TlsVersion::TLS_1_2),
            max_tls_version: Some(TlsVersion::TLS_1_3),
            session_ticket: true,
            cipher_list: None,
            curves_list: None,
            sigalgs_list: None,
            enable_ocsp_stapling: false,
            enable_signed_cert_timestamps: false,
            grease_enabled: None,
            permute_extensions: None,
            enable_ech_grease: false,
            pre_shared_key: false,
            certificate_compression_algorithms: None,
            extension_order: Vec::new(),
        }
    }
}

impl TlsOptionsBuilder {
    pub fn new() -> Self {
        Self {
            config: TlsOptions::default(),
        }
    }

    pub fn alpn_protocols(mut self, alpn: &[&str]) -> Self {
        self.config.alpn_protocols = alpn.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.min_tls_version = Some(version);
        self
    }

    pub fn max_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.max_tls_version = Some(version);
        self
    }

    pub fn cipher_list(mut self, ciphers: &str) -> Self {
        self.config.cipher_list = Some(ciphers.to_string());
        self
    }

    pub fn curves_list(mut self, curves: &str) -> Self {
        self.config.curves_list = Some(curves.to_string());
        self
    }

    pub fn sigalgs_list(mut self, sigalgs: &str) -> Self {
        self.config.sigalgs_list = Some(sigalgs.to_string());
        self
    }

    pub fn session_ticket(mut self, enabled: bool) -> Self {
        self.config.session_ticket = enabled;
        self
    }

    pub fn grease_enabled(mut self, enabled: bool) -> Self {
        self.config.grease_enabled = Some(enabled);
        self
    }

    pub fn enable_ocsp_stapling(mut self, enabled: bool) -> Self {
        self.config.enable_ocsp_stapling = enabled;
        self
    }

    pub fn enable_signed_cert_timestamps(mut self, enabled: bool) -> Self {
        self.config.enable_signed_cert_timestamps = enabled;
        self
    }

    pub fn permute_extensions(mut self, permute: bool) -> Self {
        self.config.permute_extensions = Some(permute);
        self
    }

    pub fn enable_ech_grease(mut self, enabled: bool) -> Self {
        self.config.enable_ech_grease = enabled;
        self
    }

    pub fn pre_shared_key(mut self, enabled: bool) -> Self {
        self.config.pre_shared_key = enabled;
        self
    }

    pub fn certificate_compression_algorithms(
        mut self,
        algs: &[CertificateCompressionAlgorithm],
    ) -> Self {
        self.config.certificate_compression_algorithms = Some(algs.to_vec());
        self
    }

    pub fn build(self) -> TlsOptions {
        self.config
    }
}

impl TlsOptions {
    pub fn builder() -> TlsOptionsBuilder {
        TlsOptionsBuilder::new()
    }

    /// Apply this configuration to an SSL connector builder.
    ///
    /// `verify_peer` is false under `insecureSkipVerify`; the cipher, curve
    /// and sigalg lists go in exactly as configured.
    pub fn apply_to_builder(
        &self,
        builder: &mut SslConnectorBuilder,
        verify_peer: bool,
    ) -> Result<(), NetError> {
        if let Some(min) = self.min_tls_version {
            builder
                .set_min_proto_version(Some(min.0))
                .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        }
        if let Some(max) = self.max_tls_version {
            builder
                .set_max_proto_version(Some(max.0))
                .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        }

        if let Some(ciphers) = &self.cipher_list {
            builder
                .set_cipher_list(ciphers)
                .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        }

        if !self.alpn_protocols.is_empty() {
            builder
                .set_alpn_protos(&Self::alpn_wire(&self.alpn_protocols)?)
                .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        }

        if let Some(sigalgs) = &self.sigalgs_list {
            builder
                .set_sigalgs_list(sigalgs)
                .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        }

        if let Some(curves) = &self.curves_list {
            builder
                .set_curves_list(curves)
                .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        }

        if !self.session_ticket {
            builder.set_num_tickets(0);
        }

        if self.enable_ocsp_stapling {
            builder.enable_ocsp_stapling();
        }

        if self.enable_signed_cert_timestamps {
            builder.enable_signed_cert_timestamps();
        }

        // Note: the safe boring API does not expose every ClientHello knob
        // (GREASE, extension permutation, certificate compression, ECH).
        // Those fields stay on the profile as declared configuration and
        // are applied here once the bindings expose them.

        builder.set_verify(if verify_peer {
            SslVerifyMode::PEER
        } else {
            SslVerifyMode::NONE
        });

        Ok(())
    }

    /// ALPN protocol list in wire format: length-prefixed protocol names.
    fn alpn_wire(protos: &[String]) -> Result<Vec<u8>, NetError> {
        let mut wire = Vec::new();
        for proto in protos {
            if proto.len() > 255 {
                return Err(NetError::TlsHandshakeFailure(format!(
                    "alpn protocol too long: {proto}"
                )));
            }
            wire.push(proto.len() as u8);
            wire.extend_from_slice(proto.as_bytes());
        }
        Ok(wire)
    }

    /// Restrict ALPN to HTTP/1.1 (the `forceHttp1` flag).
    pub fn force_http1(&mut self) {
        self.alpn_protocols = vec!["http/1.1".to_string()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpn_wire_format() {
        let wire =
            TlsOptions::alpn_wire(&["h2".to_string(), "http/1.1".to_string()]).unwrap();
        assert_eq!(wire, b"\x02h2\x08http/1.1");
    }

    #[test]
    fn test_builder_sets_lists() {
        let opts = TlsOptions::builder()
            .cipher_list("TLS_AES_128_GCM_SHA256")
            .curves_list("X25519:P-256")
            .min_tls_version(TlsVersion::TLS_1_2)
            .max_tls_version(TlsVersion::TLS_1_3)
            .build();
        assert_eq!(opts.cipher_list.as_deref(), Some("TLS_AES_128_GCM_SHA256"));
        assert_eq!(opts.curves_list.as_deref(), Some("X25519:P-256"));
    }

    #[test]
    fn test_force_http1() {
        let mut opts = TlsOptions::default();
        opts.force_http1();
        assert_eq!(opts.alpn_protocols, vec!["http/1.1".to_string()]);
    }
}
