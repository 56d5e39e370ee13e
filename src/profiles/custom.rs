//! Inline custom profile specification as it arrives at the boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::base::neterror::NetError;
use crate::http::h2fingerprint::H2Fingerprint;
use crate::tls::ja3::{key_share_curve_name, sigalg_name, Ja3Spec};
use crate::tls::options::{TlsOptions, TlsVersion};

/// Custom TLS client specification.
///
/// Carried inline in a request instead of a named identifier. Field names
/// match the wire protocol; unrecognized fields are ignored for forward
/// compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomTlsClient {
    pub ja3_string: String,
    pub supported_signature_algorithms: Vec<String>,
    pub supported_versions: Vec<String>,
    pub key_share_curves: Vec<String>,
    pub cert_compression_algo: String,
    pub alpn_protocols: Vec<String>,
    pub h2_settings: HashMap<String, u32>,
    pub h2_settings_order: Vec<String>,
    pub pseudo_header_order: Vec<String>,
    pub connection_flow: u32,
    pub priority_frames: Vec<PriorityFrame>,
    pub header_priority: Option<PriorityParam>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityFrame {
    #[serde(rename = "streamID")]
    pub stream_id: u32,
    pub priority_param: PriorityParam,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityParam {
    pub stream_dep: u32,
    pub exclusive: bool,
    pub weight: u8,
}

impl CustomTlsClient {
    /// Validate and translate into TLS options.
    pub fn to_tls_options(&self) -> Result<TlsOptions, NetError> {
        let mut opts = Ja3Spec::parse(&self.ja3_string)?.to_tls_options()?;

        if !self.supported_signature_algorithms.is_empty() {
            let mut names = Vec::with_capacity(self.supported_signature_algorithms.len());
            for alg in &self.supported_signature_algorithms {
                names.push(sigalg_name(alg).ok_or_else(|| {
                    NetError::InvalidProfile(format!("unknown signature algorithm: {alg}"))
                })?);
            }
            opts.sigalgs_list = Some(names.join(":"));
        }

        if !self.key_share_curves.is_empty() {
            let mut names = Vec::with_capacity(self.key_share_curves.len());
            for curve in &self.key_share_curves {
                if curve == "GREASE" {
                    continue;
                }
                names.push(key_share_curve_name(curve).ok_or_else(|| {
                    NetError::InvalidProfile(format!("unknown key share curve: {curve}"))
                })?);
            }
            if !names.is_empty() {
                opts.curves_list = Some(names.join(":"));
            }
        }

        if !self.supported_versions.is_empty() {
            let (min, max) = parse_version_bounds(&self.supported_versions)?;
            opts.min_tls_version = Some(min);
            opts.max_tls_version = Some(max);
        }

        match self.cert_compression_algo.as_str() {
            "" => {}
            "brotli" => {
                opts.certificate_compression_algorithms =
                    Some(vec![boring::ssl::CertificateCompressionAlgorithm::BROTLI]);
            }
            "zlib" => {
                opts.certificate_compression_algorithms =
                    Some(vec![boring::ssl::CertificateCompressionAlgorithm::ZLIB]);
            }
            "zstd" => {
                opts.certificate_compression_algorithms =
                    Some(vec![boring::ssl::CertificateCompressionAlgorithm::ZSTD]);
            }
            other => {
                return Err(NetError::InvalidProfile(format!(
                    "unknown certificate compression algorithm: {other}"
                )))
            }
        }

        if !self.alpn_protocols.is_empty() {
            opts.alpn_protocols = self.alpn_protocols.clone();
        }

        Ok(opts)
    }

    /// Validate and translate into an HTTP/2 fingerprint.
    pub fn to_h2_fingerprint(&self) -> Result<H2Fingerprint, NetError> {
        let frames: Vec<(u32, u32, u8, bool)> = self
            .priority_frames
            .iter()
            .map(|f| {
                (
                    f.stream_id,
                    f.priority_param.stream_dep,
                    f.priority_param.weight,
                    f.priority_param.exclusive,
                )
            })
            .collect();

        H2Fingerprint::from_custom(
            &self.h2_settings,
            &self.h2_settings_order,
            &self.pseudo_header_order,
            self.connection_flow,
            &frames,
            self.header_priority
                .as_ref()
                .map(|p| (p.stream_dep, p.weight, p.exclusive)),
        )
    }
}

fn parse_version_bounds(versions: &[String]) -> Result<(TlsVersion, TlsVersion), NetError> {
    let mut parsed: Vec<u8> = Vec::new();
    for v in versions {
        match v.as_str() {
            "GREASE" => continue,
            "1.0" => parsed.push(0),
            "1.1" => parsed.push(1),
            "1.2" => parsed.push(2),
            "1.3" => parsed.push(3),
            other => {
                return Err(NetError::InvalidProfile(format!(
                    "unknown tls version: {other}"
                )))
            }
        }
    }
    if parsed.is_empty() {
        return Ok((TlsVersion::TLS_1_2, TlsVersion::TLS_1_3));
    }

    let to_version = |rank: &u8| match rank {
        0 => TlsVersion::TLS_1_0,
        1 => TlsVersion::TLS_1_1,
        2 => TlsVersion::TLS_1_2,
        _ => TlsVersion::TLS_1_3,
    };
    let min = parsed.iter().min().map(to_version).unwrap_or(TlsVersion::TLS_1_2);
    let max = parsed.iter().max().map(to_version).unwrap_or(TlsVersion::TLS_1_3);
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_custom() -> CustomTlsClient {
        CustomTlsClient {
            ja3_string: "771,4865-4866,0-23-65281,29-23,0".to_string(),
            pseudo_header_order: vec![
                ":method".into(),
                ":authority".into(),
                ":scheme".into(),
                ":path".into(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_custom_profile() {
        let custom = base_custom();
        let tls = custom.to_tls_options().unwrap();
        assert!(tls.cipher_list.is_some());
        let h2 = custom.to_h2_fingerprint().unwrap();
        assert!(h2.pseudo_order.is_some());
    }

    #[test]
    fn test_supported_versions_bounds() {
        let mut custom = base_custom();
        custom.supported_versions =
            vec!["GREASE".into(), "1.3".into(), "1.2".into(), "1.1".into()];
        let tls = custom.to_tls_options().unwrap();
        assert_eq!(tls.min_tls_version, Some(TlsVersion::TLS_1_1));
        assert_eq!(tls.max_tls_version, Some(TlsVersion::TLS_1_3));
    }

    #[test]
    fn test_unknown_sigalg_rejected() {
        let mut custom = base_custom();
        custom.supported_signature_algorithms = vec!["NotAThing".into()];
        assert!(matches!(
            custom.to_tls_options(),
            Err(NetError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unknown_curve_rejected() {
        let mut custom = base_custom();
        custom.key_share_curves = vec!["P999".into()];
        assert!(matches!(
            custom.to_tls_options(),
            Err(NetError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_deserializes_wire_shape() {
        let json = r#"{
            "ja3String": "771,4865,0-23,29,0",
            "h2Settings": {"HEADER_TABLE_SIZE": 65536},
            "h2SettingsOrder": ["HEADER_TABLE_SIZE"],
            "pseudoHeaderOrder": [":method", ":authority", ":scheme", ":path"],
            "connectionFlow": 15663105,
            "priorityFrames": [
                {"streamID": 3, "priorityParam": {"streamDep": 0, "exclusive": false, "weight": 200}}
            ]
        }"#;
        let custom: CustomTlsClient = serde_json::from_str(json).unwrap();
        assert_eq!(custom.connection_flow, 15_663_105);
        assert_eq!(custom.priority_frames[0].stream_id, 3);
        assert_eq!(custom.priority_frames[0].priority_param.weight, 200);
        assert!(custom.to_h2_fingerprint().is_ok());
    }
}
