//! Certificate pinning.
//!
//! Validates the server's presented chain against expected SPKI
//! (Subject Public Key Info) SHA-256 hashes. The allow-list arrives per
//! request as a host -> base64-hash-list map; a host prefixed `*.` also
//! covers its subdomains. A host with pins and no chain match fails
//! closed.

use crate::base::neterror::NetError;
use base64::Engine;

/// SHA-256 hash of a certificate's SPKI.
pub type SpkiHash = [u8; 32];

/// Pin allow-list for one request.
#[derive(Debug, Clone, Default)]
pub struct CertificatePinner {
    /// (domain, include_subdomains, pins)
    entries: Vec<(String, bool, Vec<SpkiHash>)>,
}

impl CertificatePinner {
    /// Build from the boundary's host -> base64 hash list map.
    ///
    /// Hashes may carry the conventional `sha256/` prefix. A hash that is
    /// not 32 bytes after decoding is a validation error.
    pub fn new(
        pins: &std::collections::HashMap<String, Vec<String>>,
    ) -> Result<Self, NetError> {
        let mut entries = Vec::with_capacity(pins.len());
        for (host, hashes) in pins {
            let (domain, include_subdomains) = match host.strip_prefix("*.") {
                Some(rest) => (rest.to_lowercase(), true),
                None => (host.to_lowercase(), false),
            };

            let mut decoded = Vec::with_capacity(hashes.len());
            for hash in hashes {
                let raw = hash.strip_prefix("sha256/").unwrap_or(hash);
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(raw)
                    .map_err(|_| {
                        NetError::MalformedRequest(format!(
                            "certificate pin for {host} is not valid base64"
                        ))
                    })?;
                if bytes.len() != 32 {
                    return Err(NetError::MalformedRequest(format!(
                        "certificate pin for {host} is not a sha256 hash"
                    )));
                }
                let mut pin = [0u8; 32];
                pin.copy_from_slice(&bytes);
                decoded.push(pin);
            }
            entries.push((domain, include_subdomains, decoded));
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the presented chain hashes for `host`.
    ///
    /// Ok(()) when no pins cover the host, or any chain hash matches a pin.
    pub fn check(&self, host: &str, chain_hashes: &[SpkiHash]) -> Result<(), NetError> {
        let host = host.to_lowercase();

        for (domain, include_subdomains, pins) in &self.entries {
            let covered = host == *domain
                || (*include_subdomains
                    && host.len() > domain.len()
                    && host.ends_with(domain.as_str())
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.');
            if !covered {
                continue;
            }

            if chain_hashes.iter().any(|h| pins.contains(h)) {
                return Ok(());
            }
            return Err(NetError::CertificatePinMismatch(host));
        }

        Ok(())
    }
}

/// Compute the SPKI SHA-256 hash of a DER-encoded certificate.
pub fn spki_hash(cert_der: &[u8]) -> Result<SpkiHash, NetError> {
    use boring::hash::{hash, MessageDigest};
    use boring::x509::X509;

    let cert = X509::from_der(cert_der)
        .map_err(|e| NetError::TlsHandshakeFailure(format!("bad peer certificate: {e}")))?;
    let pubkey = cert
        .public_key()
        .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
    let spki_der = pubkey
        .public_key_to_der()
        .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;

    let digest = hash(MessageDigest::sha256(), &spki_der)
        .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;

    let mut result = [0u8; 32];
    result.copy_from_slice(&digest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn encode(hash: SpkiHash) -> String {
        base64::engine::general_purpose::STANDARD.encode(hash)
    }

    fn pinner_for(host: &str, hashes: &[SpkiHash]) -> CertificatePinner {
        let mut map = HashMap::new();
        map.insert(
            host.to_string(),
            hashes.iter().map(|h| encode(*h)).collect(),
        );
        CertificatePinner::new(&map).unwrap()
    }

    #[test]
    fn test_no_pins_allows_everything() {
        let pinner = CertificatePinner::new(&HashMap::new()).unwrap();
        assert!(pinner.check("example.com", &[[0u8; 32]]).is_ok());
    }

    #[test]
    fn test_matching_pin() {
        let pinner = pinner_for("example.com", &[[42u8; 32]]);
        assert!(pinner.check("example.com", &[[42u8; 32]]).is_ok());
    }

    #[test]
    fn test_mismatched_pin_fails_closed() {
        let pinner = pinner_for("example.com", &[[1u8; 32]]);
        assert!(matches!(
            pinner.check("example.com", &[[2u8; 32]]),
            Err(NetError::CertificatePinMismatch(_))
        ));
    }

    #[test]
    fn test_unpinned_host_unaffected() {
        let pinner = pinner_for("example.com", &[[1u8; 32]]);
        assert!(pinner.check("other.com", &[[2u8; 32]]).is_ok());
    }

    #[test]
    fn test_wildcard_covers_subdomains() {
        let pinner = pinner_for("*.example.com", &[[7u8; 32]]);
        assert!(pinner.check("api.example.com", &[[7u8; 32]]).is_ok());
        assert!(matches!(
            pinner.check("api.example.com", &[[9u8; 32]]),
            Err(NetError::CertificatePinMismatch(_))
        ));
        // The bare domain is not a subdomain of itself under `*.`
        assert!(pinner.check("notexample.com", &[[9u8; 32]]).is_ok());
    }

    #[test]
    fn test_any_chain_hash_may_match() {
        let pinner = pinner_for("example.com", &[[5u8; 32]]);
        assert!(pinner
            .check("example.com", &[[1u8; 32], [5u8; 32], [3u8; 32]])
            .is_ok());
    }

    #[test]
    fn test_sha256_prefix_accepted() {
        let mut map = HashMap::new();
        map.insert(
            "example.com".to_string(),
            vec![format!("sha256/{}", encode([8u8; 32]))],
        );
        let pinner = CertificatePinner::new(&map).unwrap();
        assert!(pinner.check("example.com", &[[8u8; 32]]).is_ok());
    }

    #[test]
    fn test_bad_pin_rejected_at_build() {
        let mut map = HashMap::new();
        map.insert("example.com".to_string(), vec!["notbase64!!".to_string()]);
        assert!(CertificatePinner::new(&map).is_err());

        let mut map = HashMap::new();
        map.insert("example.com".to_string(), vec![encode([0u8; 32])[..10].to_string()]);
        assert!(CertificatePinner::new(&map).is_err());
    }
}
