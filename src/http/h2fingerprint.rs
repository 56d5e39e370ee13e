//! HTTP/2 fingerprint emulation types.
//!
//! Anti-bot systems fingerprint HTTP/2 at multiple levels:
//! - SETTINGS frame parameter order
//! - Pseudo-header field order in HEADERS frames
//! - PRIORITY frames sent after handshake
//! - Window sizes and frame limits
//!
//! The resolved values are applied verbatim at the wire level; nothing in
//! the connection setup path is allowed to reorder them.

use std::collections::HashMap;

use crate::base::neterror::NetError;

// Re-export from http2 crate for fingerprint control
pub use http2::frame::{
    Priorities, PrioritiesBuilder, Priority, PseudoId, PseudoOrder, SettingId, SettingsOrder,
    SettingsOrderBuilder, StreamDependency, StreamId,
};

/// The SETTINGS keys understood at the boundary, in the spelling the wire
/// protocol uses.
pub const SETTING_KEYS: [&str; 6] = [
    "HEADER_TABLE_SIZE",
    "ENABLE_PUSH",
    "MAX_CONCURRENT_STREAMS",
    "INITIAL_WINDOW_SIZE",
    "MAX_FRAME_SIZE",
    "MAX_HEADER_LIST_SIZE",
];

/// HTTP/2 fingerprint: SETTINGS values and the frame-level orderings that
/// identify a client implementation.
#[derive(Debug, Clone)]
pub struct H2Fingerprint {
    /// SETTINGS_HEADER_TABLE_SIZE (0x1) - HPACK dynamic table size
    pub header_table_size: Option<u32>,
    /// SETTINGS_ENABLE_PUSH (0x2)
    pub enable_push: Option<bool>,
    /// SETTINGS_MAX_CONCURRENT_STREAMS (0x3)
    pub max_concurrent_streams: Option<u32>,
    /// SETTINGS_INITIAL_WINDOW_SIZE (0x4) - Stream-level flow control
    pub initial_window_size: u32,
    /// Connection-level flow control window (WINDOW_UPDATE delta target)
    pub initial_conn_window_size: u32,
    /// SETTINGS_MAX_FRAME_SIZE (0x5)
    pub max_frame_size: Option<u32>,
    /// SETTINGS_MAX_HEADER_LIST_SIZE (0x6)
    pub max_header_list_size: Option<u32>,

    /// Order of SETTINGS parameters in the initial SETTINGS frame
    pub settings_order: Option<SettingsOrder>,
    /// Order of pseudo-header fields in the HEADERS frame
    pub pseudo_order: Option<PseudoOrder>,
    /// PRIORITY frames sent after connection establishment
    pub priorities: Option<Priorities>,
    /// Stream dependency attached to the outgoing HEADERS frame
    pub header_priority: Option<StreamDependency>,
}

impl Default for H2Fingerprint {
    fn default() -> Self {
        Self::chrome()
    }
}

impl H2Fingerprint {
    /// Chrome HTTP/2 fingerprint.
    ///
    /// Chrome uses large windows (6MB stream / 15MB connection), a specific
    /// SETTINGS order, and sends PRIORITY frames after handshake.
    pub fn chrome() -> Self {
        Self {
            header_table_size: Some(65536),
            enable_push: Some(false),
            max_concurrent_streams: Some(1000),
            initial_window_size: 6_291_456,
            initial_conn_window_size: 15_728_640,
            max_frame_size: Some(16384),
            max_header_list_size: Some(262_144),
            settings_order: Some(chrome_settings_order()),
            pseudo_order: Some(pseudo_order_masp()),
            priorities: Some(chrome_priorities()),
            header_priority: None,
        }
    }

    /// Firefox HTTP/2 fingerprint.
    pub fn firefox() -> Self {
        Self {
            header_table_size: Some(65536),
            enable_push: Some(false),
            max_concurrent_streams: Some(100),
            initial_window_size: 131_072,
            initial_conn_window_size: 12_582_912,
            max_frame_size: Some(16384),
            max_header_list_size: None,
            settings_order: Some(firefox_settings_order()),
            pseudo_order: Some(pseudo_order_mpas()),
            priorities: Some(firefox_priorities()),
            header_priority: Some(StreamDependency::new(13, 41, false)),
        }
    }

    /// Safari HTTP/2 fingerprint.
    pub fn safari() -> Self {
        Self {
            header_table_size: Some(4096),
            enable_push: Some(false),
            max_concurrent_streams: Some(100),
            initial_window_size: 2_097_152,
            initial_conn_window_size: 10_485_760,
            max_frame_size: Some(16384),
            max_header_list_size: None,
            settings_order: Some(safari_settings_order()),
            pseudo_order: Some(pseudo_order_mspa()),
            priorities: None,
            header_priority: None,
        }
    }

    /// OkHttp HTTP/2 fingerprint (Android apps).
    pub fn okhttp() -> Self {
        Self {
            header_table_size: Some(65536),
            enable_push: Some(false),
            max_concurrent_streams: None,
            initial_window_size: 6_291_456,
            initial_conn_window_size: 15_728_640,
            max_frame_size: Some(16384),
            max_header_list_size: Some(262_144),
            settings_order: Some(chrome_settings_order()),
            pseudo_order: Some(pseudo_order_mpas()),
            priorities: None,
            header_priority: None,
        }
    }

    /// Build a fingerprint from boundary-supplied maps.
    ///
    /// `settings` maps SETTINGS key names to values, `settings_order` must be
    /// exactly a permutation of the map's keys, and `pseudo_header_order`
    /// must contain the four client pseudo-headers. Violating either is a
    /// validation error, never a silent reorder.
    pub fn from_custom(
        settings: &HashMap<String, u32>,
        settings_order: &[String],
        pseudo_header_order: &[String],
        connection_flow: u32,
        priority_frames: &[(u32, u32, u8, bool)],
        header_priority: Option<(u32, u8, bool)>,
    ) -> Result<Self, NetError> {
        for key in settings.keys() {
            if !SETTING_KEYS.contains(&key.as_str()) {
                return Err(NetError::InvalidProfile(format!(
                    "unknown h2 setting: {key}"
                )));
            }
        }

        validate_settings_permutation(settings, settings_order)?;
        let pseudo = parse_pseudo_order(pseudo_header_order)?;

        let mut fp = Self {
            header_table_size: settings.get("HEADER_TABLE_SIZE").copied(),
            enable_push: settings.get("ENABLE_PUSH").map(|v| *v != 0),
            max_concurrent_streams: settings.get("MAX_CONCURRENT_STREAMS").copied(),
            initial_window_size: settings
                .get("INITIAL_WINDOW_SIZE")
                .copied()
                .unwrap_or(65_535),
            initial_conn_window_size: if connection_flow > 0 {
                connection_flow
            } else {
                65_535
            },
            max_frame_size: settings.get("MAX_FRAME_SIZE").copied(),
            max_header_list_size: settings.get("MAX_HEADER_LIST_SIZE").copied(),
            settings_order: Some(settings_order_from_keys(settings_order)),
            pseudo_order: Some(pseudo),
            priorities: None,
            header_priority: header_priority
                .map(|(dep, weight, exclusive)| StreamDependency::new(dep, weight, exclusive)),
        };

        if !priority_frames.is_empty() {
            let mut builder = PrioritiesBuilder::new();
            for (stream_id, dep, weight, exclusive) in priority_frames {
                builder = builder.priority(Priority::new(
                    StreamId::new(*stream_id),
                    StreamDependency::new(*dep, *weight, *exclusive),
                ));
            }
            fp.priorities = Some(builder.build());
        }

        Ok(fp)
    }
}

fn validate_settings_permutation(
    settings: &HashMap<String, u32>,
    order: &[String],
) -> Result<(), NetError> {
    if order.len() != settings.len() {
        return Err(NetError::InvalidProfile(format!(
            "h2 settings order names {} settings but the settings map has {}",
            order.len(),
            settings.len()
        )));
    }
    for key in order {
        if !settings.contains_key(key) {
            return Err(NetError::InvalidProfile(format!(
                "h2 settings order references unknown setting: {key}"
            )));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for key in order {
        if !seen.insert(key.as_str()) {
            return Err(NetError::InvalidProfile(format!(
                "h2 settings order repeats setting: {key}"
            )));
        }
    }
    Ok(())
}

fn settings_order_from_keys(keys: &[String]) -> SettingsOrder {
    let mut builder = SettingsOrderBuilder::new();
    for key in keys {
        builder = match key.as_str() {
            "HEADER_TABLE_SIZE" => builder.header_table_size(),
            "ENABLE_PUSH" => builder.enable_push(),
            "MAX_CONCURRENT_STREAMS" => builder.max_concurrent_streams(),
            "INITIAL_WINDOW_SIZE" => builder.initial_window_size(),
            "MAX_FRAME_SIZE" => builder.max_frame_size(),
            "MAX_HEADER_LIST_SIZE" => builder.max_header_list_size(),
            // from_custom validated the keys already
            _ => builder,
        };
    }
    builder.build()
}

fn parse_pseudo_order(names: &[String]) -> Result<PseudoOrder, NetError> {
    let mut ids = Vec::with_capacity(4);
    for name in names {
        let id = match name.as_str() {
            ":method" => PseudoId::Method,
            ":authority" => PseudoId::Authority,
            ":scheme" => PseudoId::Scheme,
            ":path" => PseudoId::Path,
            other => {
                return Err(NetError::InvalidProfile(format!(
                    "unknown pseudo header: {other}"
                )))
            }
        };
        if ids.contains(&id) {
            return Err(NetError::InvalidProfile(format!(
                "pseudo header order repeats {name}"
            )));
        }
        ids.push(id);
    }
    if ids.len() != 4 {
        return Err(NetError::InvalidProfile(
            "pseudo header order must contain :method, :authority, :scheme and :path".to_string(),
        ));
    }
    Ok(PseudoOrder::new([ids[0], ids[1], ids[2], ids[3]]))
}

// --- Browser-specific orderings ---

fn pseudo_order_masp() -> PseudoOrder {
    // Chrome: :method, :authority, :scheme, :path
    PseudoOrder::new([
        PseudoId::Method,
        PseudoId::Authority,
        PseudoId::Scheme,
        PseudoId::Path,
    ])
}

fn pseudo_order_mpas() -> PseudoOrder {
    // Firefox / OkHttp: :method, :path, :authority, :scheme
    PseudoOrder::new([
        PseudoId::Method,
        PseudoId::Path,
        PseudoId::Authority,
        PseudoId::Scheme,
    ])
}

fn pseudo_order_mspa() -> PseudoOrder {
    // Safari: :method, :scheme, :path, :authority
    PseudoOrder::new([
        PseudoId::Method,
        PseudoId::Scheme,
        PseudoId::Path,
        PseudoId::Authority,
    ])
}

fn chrome_settings_order() -> SettingsOrder {
    SettingsOrderBuilder::new()
        .header_table_size()
        .enable_push()
        .max_concurrent_streams()
        .initial_window_size()
        .max_frame_size()
        .max_header_list_size()
        .build()
}

fn firefox_settings_order() -> SettingsOrder {
    SettingsOrderBuilder::new()
        .header_table_size()
        .initial_window_size()
        .max_frame_size()
        .build()
}

fn safari_settings_order() -> SettingsOrder {
    SettingsOrderBuilder::new()
        .header_table_size()
        .enable_push()
        .max_concurrent_streams()
        .initial_window_size()
        .max_frame_size()
        .build()
}

fn chrome_priorities() -> Priorities {
    // Chrome sends these PRIORITY frames after handshake
    PrioritiesBuilder::new()
        .priority(Priority::new(
            StreamId::new(3),
            StreamDependency::new(0, 200, false),
        ))
        .priority(Priority::new(
            StreamId::new(5),
            StreamDependency::new(0, 100, false),
        ))
        .priority(Priority::new(
            StreamId::new(7),
            StreamDependency::new(0, 0, false),
        ))
        .priority(Priority::new(
            StreamId::new(9),
            StreamDependency::new(7, 0, false),
        ))
        .priority(Priority::new(
            StreamId::new(11),
            StreamDependency::new(3, 0, false),
        ))
        .build()
}

fn firefox_priorities() -> Priorities {
    PrioritiesBuilder::new()
        .priority(Priority::new(
            StreamId::new(3),
            StreamDependency::new(0, 200, false),
        ))
        .priority(Priority::new(
            StreamId::new(5),
            StreamDependency::new(0, 100, false),
        ))
        .priority(Priority::new(
            StreamId::new(7),
            StreamDependency::new(0, 0, false),
        ))
        .priority(Priority::new(
            StreamId::new(9),
            StreamDependency::new(7, 0, false),
        ))
        .priority(Priority::new(
            StreamId::new(11),
            StreamDependency::new(3, 0, false),
        ))
        .priority(Priority::new(
            StreamId::new(13),
            StreamDependency::new(0, 240, false),
        ))
        .build()
}
