//! JA3 string parsing.
//!
//! A JA3 string is five comma-separated fields:
//! `version,ciphers,extensions,curves,pointFormats`, each list dash
//! separated and numeric. Custom profiles arrive as JA3 plus named
//! supplements (signature algorithms, key share curves, ALPN), and every
//! numeric id must resolve against the known tables below; an unknown id
//! is a validation error rather than a silently dropped entry.

use crate::base::neterror::NetError;
use crate::tls::options::{TlsOptions, TlsVersion};

/// Decomposed JA3 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Spec {
    pub version: u16,
    pub cipher_ids: Vec<u16>,
    pub extension_ids: Vec<u16>,
    pub curve_ids: Vec<u16>,
    pub point_formats: Vec<u8>,
}

impl Ja3Spec {
    pub fn parse(ja3: &str) -> Result<Self, NetError> {
        let parts: Vec<&str> = ja3.split(',').collect();
        if parts.len() != 5 {
            return Err(NetError::InvalidProfile(format!(
                "ja3 string must have 5 fields, got {}",
                parts.len()
            )));
        }

        let version: u16 = parts[0]
            .parse()
            .map_err(|_| NetError::InvalidProfile(format!("invalid ja3 version: {}", parts[0])))?;

        Ok(Self {
            version,
            cipher_ids: parse_id_list(parts[1], "cipher")?,
            extension_ids: parse_id_list(parts[2], "extension")?,
            curve_ids: parse_id_list(parts[3], "curve")?,
            point_formats: parse_id_list(parts[4], "point format")?
                .into_iter()
                .map(|v| v as u8)
                .collect(),
        })
    }

    /// Translate into TLS options, preserving the declared orderings.
    pub fn to_tls_options(&self) -> Result<TlsOptions, NetError> {
        let mut cipher_names = Vec::with_capacity(self.cipher_ids.len());
        for id in &self.cipher_ids {
            if is_grease(*id) {
                continue;
            }
            cipher_names.push(
                cipher_name(*id)
                    .ok_or_else(|| NetError::InvalidProfile(format!("unknown cipher id {id}")))?,
            );
        }

        let mut curve_names = Vec::with_capacity(self.curve_ids.len());
        for id in &self.curve_ids {
            if is_grease(*id) {
                continue;
            }
            curve_names.push(
                curve_name(*id)
                    .ok_or_else(|| NetError::InvalidProfile(format!("unknown curve id {id}")))?,
            );
        }

        for id in &self.extension_ids {
            if !is_grease(*id) && !is_known_extension(*id) {
                return Err(NetError::InvalidProfile(format!(
                    "unknown extension with id {id} provided"
                )));
            }
        }

        let mut opts = TlsOptions::builder()
            .cipher_list(&cipher_names.join(":"))
            .min_tls_version(TlsVersion::TLS_1_2)
            .max_tls_version(TlsVersion::TLS_1_3)
            .build();
        if !curve_names.is_empty() {
            opts.curves_list = Some(curve_names.join(":"));
        }
        opts.extension_order = self
            .extension_ids
            .iter()
            .copied()
            .filter(|id| !is_grease(*id))
            .collect();
        Ok(opts)
    }
}

fn parse_id_list(field: &str, what: &str) -> Result<Vec<u16>, NetError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .map(|part| {
            part.parse::<u16>()
                .map_err(|_| NetError::InvalidProfile(format!("invalid {what} id: {part}")))
        })
        .collect()
}

/// GREASE values (RFC 8701) appear in real browser JA3 strings and are
/// skipped rather than rejected.
fn is_grease(id: u16) -> bool {
    (id & 0x0f0f) == 0x0a0a && (id >> 8) == (id & 0xff)
}

/// IANA cipher suite id to OpenSSL configuration name.
fn cipher_name(id: u16) -> Option<&'static str> {
    Some(match id {
        0x1301 => "TLS_AES_128_GCM_SHA256",
        0x1302 => "TLS_AES_256_GCM_SHA384",
        0x1303 => "TLS_CHACHA20_POLY1305_SHA256",
        0xc02b => "ECDHE-ECDSA-AES128-GCM-SHA256",
        0xc02f => "ECDHE-RSA-AES128-GCM-SHA256",
        0xc02c => "ECDHE-ECDSA-AES256-GCM-SHA384",
        0xc030 => "ECDHE-RSA-AES256-GCM-SHA384",
        0xcca9 => "ECDHE-ECDSA-CHACHA20-POLY1305",
        0xcca8 => "ECDHE-RSA-CHACHA20-POLY1305",
        0xc009 => "ECDHE-ECDSA-AES128-SHA",
        0xc00a => "ECDHE-ECDSA-AES256-SHA",
        0xc013 => "ECDHE-RSA-AES128-SHA",
        0xc014 => "ECDHE-RSA-AES256-SHA",
        0xc023 => "ECDHE-ECDSA-AES128-SHA256",
        0xc024 => "ECDHE-ECDSA-AES256-SHA384",
        0xc027 => "ECDHE-RSA-AES128-SHA256",
        0xc028 => "ECDHE-RSA-AES256-SHA384",
        0x009c => "AES128-GCM-SHA256",
        0x009d => "AES256-GCM-SHA384",
        0x003c => "AES128-SHA256",
        0x003d => "AES256-SHA256",
        0x002f => "AES128-SHA",
        0x0035 => "AES256-SHA",
        0x000a => "DES-CBC3-SHA",
        _ => return None,
    })
}

/// IANA named group id to BoringSSL curve name.
fn curve_name(id: u16) -> Option<&'static str> {
    Some(match id {
        23 => "P-256",
        24 => "P-384",
        25 => "P-521",
        29 => "X25519",
        256 => "ffdhe2048",
        257 => "ffdhe3072",
        _ => return None,
    })
}

/// Extension ids seen in real browser hellos.
fn is_known_extension(id: u16) -> bool {
    matches!(
        id,
        0 | 5
            | 10
            | 11
            | 13
            | 16
            | 17
            | 18
            | 21
            | 22
            | 23
            | 27
            | 28
            | 34
            | 35
            | 41
            | 43
            | 44
            | 45
            | 49
            | 50
            | 51
            | 13172
            | 17513
            | 65037
            | 65281
    )
}

/// Map the boundary's named signature algorithms (utls spelling or wire
/// spelling) to the BoringSSL sigalgs string.
pub fn sigalg_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "ECDSAWithP256AndSHA256" | "ecdsa_secp256r1_sha256" => "ecdsa_secp256r1_sha256",
        "ECDSAWithP384AndSHA384" | "ecdsa_secp384r1_sha384" => "ecdsa_secp384r1_sha384",
        "ECDSAWithP521AndSHA512" | "ecdsa_secp521r1_sha512" => "ecdsa_secp521r1_sha512",
        "PSSWithSHA256" | "rsa_pss_rsae_sha256" => "rsa_pss_rsae_sha256",
        "PSSWithSHA384" | "rsa_pss_rsae_sha384" => "rsa_pss_rsae_sha384",
        "PSSWithSHA512" | "rsa_pss_rsae_sha512" => "rsa_pss_rsae_sha512",
        "PKCS1WithSHA256" | "rsa_pkcs1_sha256" => "rsa_pkcs1_sha256",
        "PKCS1WithSHA384" | "rsa_pkcs1_sha384" => "rsa_pkcs1_sha384",
        "PKCS1WithSHA512" | "rsa_pkcs1_sha512" => "rsa_pkcs1_sha512",
        "PKCS1WithSHA1" | "rsa_pkcs1_sha1" => "rsa_pkcs1_sha1",
        "ECDSAWithSHA1" | "ecdsa_sha1" => "ecdsa_sha1",
        _ => return None,
    })
}

/// Map the boundary's named key-share curves to BoringSSL curve names.
pub fn key_share_curve_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "X25519" => "X25519",
        "P256" | "P-256" => "P-256",
        "P384" | "P-384" => "P-384",
        "P521" | "P-521" => "P-521",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_JA3: &str = "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-17513,29-23-24,0";

    #[test]
    fn test_parse_chrome_ja3() {
        let spec = Ja3Spec::parse(CHROME_JA3).unwrap();
        assert_eq!(spec.version, 771);
        assert_eq!(spec.cipher_ids.len(), 15);
        assert_eq!(spec.curve_ids, vec![29, 23, 24]);
        assert_eq!(spec.point_formats, vec![0]);
    }

    #[test]
    fn test_to_tls_options_preserves_cipher_order() {
        let opts = Ja3Spec::parse(CHROME_JA3).unwrap().to_tls_options().unwrap();
        let ciphers = opts.cipher_list.unwrap();
        assert!(ciphers.starts_with(
            "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:TLS_CHACHA20_POLY1305_SHA256"
        ));
        assert!(ciphers.ends_with("AES128-SHA:AES256-SHA"));
        assert_eq!(opts.curves_list.as_deref(), Some("X25519:P-256:P-384"));
    }

    #[test]
    fn test_wrong_field_count() {
        assert!(matches!(
            Ja3Spec::parse("771,4865,0"),
            Err(NetError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unknown_cipher_rejected() {
        let spec = Ja3Spec::parse("771,1,0,29,0").unwrap();
        assert!(matches!(
            spec.to_tls_options(),
            Err(NetError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let spec = Ja3Spec::parse("771,4865,9999,29,0").unwrap();
        assert!(matches!(
            spec.to_tls_options(),
            Err(NetError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_grease_values_skipped() {
        // 0x0a0a = 2570 is a GREASE value in cipher, extension and curve lists
        let spec = Ja3Spec::parse("771,2570-4865,2570-0,2570-29,0").unwrap();
        let opts = spec.to_tls_options().unwrap();
        assert_eq!(opts.cipher_list.as_deref(), Some("TLS_AES_128_GCM_SHA256"));
        assert_eq!(opts.curves_list.as_deref(), Some("X25519"));
        assert_eq!(opts.extension_order, vec![0]);
    }

    #[test]
    fn test_empty_curves_field() {
        let spec = Ja3Spec::parse("771,4865,0,,0").unwrap();
        assert!(spec.curve_ids.is_empty());
        let opts = spec.to_tls_options().unwrap();
        assert!(opts.curves_list.is_none());
    }

    #[test]
    fn test_sigalg_mapping_both_spellings() {
        assert_eq!(sigalg_name("PSSWithSHA256"), Some("rsa_pss_rsae_sha256"));
        assert_eq!(
            sigalg_name("rsa_pss_rsae_sha256"),
            Some("rsa_pss_rsae_sha256")
        );
        assert_eq!(sigalg_name("bogus"), None);
    }
}
