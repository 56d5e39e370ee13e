//! Client fingerprint profiles.
//!
//! A profile is the full wire identity of a client: the decomposed
//! ClientHello (ciphers, curves, signature algorithms, version bounds,
//! extension knobs, ALPN) plus the HTTP/2 fingerprint (SETTINGS values
//! and order, pseudo-header order, connection window, priority frames).
//! Requests select one by named identifier or by inline custom spec;
//! the two are mutually exclusive.

pub mod chrome;
pub mod custom;
pub mod firefox;
pub mod okhttp;
pub mod safari;

pub use custom::{CustomTlsClient, PriorityFrame, PriorityParam};

use crate::base::neterror::NetError;
use crate::http::h2fingerprint::H2Fingerprint;
use crate::tls::options::TlsOptions;

/// A resolved client fingerprint profile.
#[derive(Debug, Clone)]
pub struct ClientProfile {
    pub name: &'static str,
    pub tls: TlsOptions,
    pub h2: H2Fingerprint,
}

/// Fingerprint selection carried by a request.
#[derive(Debug, Clone)]
pub enum ProfileSelector {
    Named(String),
    Custom(Box<CustomTlsClient>),
    Default,
}

impl ProfileSelector {
    /// Build from the boundary's optional fields, enforcing exclusivity.
    pub fn from_parts(
        identifier: Option<&str>,
        custom: Option<&CustomTlsClient>,
    ) -> Result<Self, NetError> {
        match (identifier.filter(|s| !s.is_empty()), custom) {
            (Some(_), Some(_)) => Err(NetError::ProfileSelector),
            (Some(name), None) => Ok(ProfileSelector::Named(name.to_string())),
            (None, Some(custom)) => Ok(ProfileSelector::Custom(Box::new(custom.clone()))),
            (None, None) => Ok(ProfileSelector::Default),
        }
    }
}

/// Resolve a selector into a concrete profile.
///
/// Named identifiers are looked up in the built-in table; unknown names are
/// an error, never a silent fallback. Custom specs are validated in full
/// before anything touches the wire.
pub fn resolve(selector: &ProfileSelector) -> Result<ClientProfile, NetError> {
    match selector {
        ProfileSelector::Named(name) => {
            lookup(name).ok_or_else(|| NetError::UnknownProfile(name.clone()))
        }
        ProfileSelector::Custom(custom) => {
            let tls = custom.to_tls_options()?;
            let h2 = custom.to_h2_fingerprint()?;
            Ok(ClientProfile {
                name: "custom",
                tls,
                h2,
            })
        }
        ProfileSelector::Default => Ok(default_profile()),
    }
}

/// The profile used when a request names none (the current Chrome).
pub fn default_profile() -> ClientProfile {
    chrome::shuffled("chrome_124")
}

/// Built-in identifier table.
///
/// Several identifiers share one wire spec, mirroring how the underlying
/// browsers shipped identical hellos across releases.
pub fn lookup(identifier: &str) -> Option<ClientProfile> {
    let profile = match identifier {
        "chrome_103" => chrome::classic("chrome_103"),
        "chrome_104" => chrome::classic("chrome_104"),
        "chrome_105" => chrome::classic("chrome_105"),
        "chrome_106" => chrome::classic("chrome_106"),
        "chrome_107" => chrome::classic("chrome_107"),
        "chrome_108" => chrome::classic("chrome_108"),
        "chrome_109" => chrome::classic("chrome_109"),
        "chrome_110" => chrome::classic("chrome_110"),
        "chrome_111" => chrome::classic("chrome_111"),
        "chrome_112" => chrome::classic("chrome_112"),
        "chrome_116_PSK" => chrome::psk("chrome_116_PSK"),
        "chrome_116_PSK_PQ" => chrome::psk("chrome_116_PSK_PQ"),
        "chrome_117" => chrome::shuffled("chrome_117"),
        "chrome_120" => chrome::shuffled("chrome_120"),
        "chrome_124" => chrome::shuffled("chrome_124"),
        "firefox_102" => firefox::profile("firefox_102"),
        "firefox_104" => firefox::profile("firefox_104"),
        "firefox_105" => firefox::profile("firefox_105"),
        "firefox_106" => firefox::profile("firefox_106"),
        "firefox_108" => firefox::profile("firefox_108"),
        "firefox_110" => firefox::profile("firefox_110"),
        "firefox_117" => firefox::profile("firefox_117"),
        "firefox_120" => firefox::profile("firefox_120"),
        "firefox_123" => firefox::profile("firefox_123"),
        "safari_15_6_1" => safari::desktop("safari_15_6_1"),
        "safari_16_0" => safari::desktop("safari_16_0"),
        "safari_ipad_15_6" => safari::ios("safari_ipad_15_6"),
        "safari_ios_15_5" => safari::ios("safari_ios_15_5"),
        "safari_ios_15_6" => safari::ios("safari_ios_15_6"),
        "safari_ios_16_0" => safari::ios("safari_ios_16_0"),
        "safari_ios_17_0" => safari::ios("safari_ios_17_0"),
        "opera_89" => chrome::classic("opera_89"),
        "opera_90" => chrome::classic("opera_90"),
        "opera_91" => chrome::classic("opera_91"),
        // Mobile app stacks ride the hello of their underlying HTTP client.
        "zalando_android_mobile" => okhttp::android("zalando_android_mobile"),
        "zalando_ios_mobile" => safari::ios("zalando_ios_mobile"),
        "nike_ios_mobile" => safari::ios("nike_ios_mobile"),
        "nike_android_mobile" => okhttp::android("nike_android_mobile"),
        "cloudscraper" => chrome::classic("cloudscraper"),
        "mms_ios" | "mms_ios_1" => safari::ios("mms_ios"),
        "mms_ios_2" => safari::ios("mms_ios_2"),
        "mms_ios_3" => safari::ios("mms_ios_3"),
        "mesh_ios" | "mesh_ios_1" => safari::ios("mesh_ios"),
        "mesh_ios_2" => safari::ios("mesh_ios_2"),
        "mesh_android" | "mesh_android_1" => okhttp::android("mesh_android"),
        "mesh_android_2" => okhttp::android("mesh_android_2"),
        "confirmed_ios" => safari::ios("confirmed_ios"),
        "confirmed_android" => okhttp::android("confirmed_android"),
        "okhttp4_android_7" => okhttp::android("okhttp4_android_7"),
        "okhttp4_android_8" => okhttp::android("okhttp4_android_8"),
        "okhttp4_android_9" => okhttp::android("okhttp4_android_9"),
        "okhttp4_android_10" => okhttp::android("okhttp4_android_10"),
        "okhttp4_android_11" => okhttp::android("okhttp4_android_11"),
        "okhttp4_android_12" => okhttp::android("okhttp4_android_12"),
        "okhttp4_android_13" => okhttp::android("okhttp4_android_13"),
        _ => return None,
    };
    Some(profile)
}
