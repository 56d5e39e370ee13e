use mimicnet::base::neterror::NetError;
use mimicnet::profiles::{self, CustomTlsClient, ProfileSelector};

#[test]
fn test_original_identifier_table_is_served() {
    // A sweep over the identifier families callers depend on.
    let names = [
        "chrome_103",
        "chrome_105",
        "chrome_110",
        "chrome_116_PSK",
        "chrome_117",
        "chrome_120",
        "chrome_124",
        "firefox_102",
        "firefox_110",
        "firefox_123",
        "safari_15_6_1",
        "safari_16_0",
        "safari_ipad_15_6",
        "safari_ios_15_5",
        "safari_ios_17_0",
        "opera_89",
        "opera_91",
        "okhttp4_android_7",
        "okhttp4_android_13",
    ];
    for name in names {
        let profile = profiles::lookup(name).unwrap_or_else(|| panic!("missing {name}"));
        assert!(profile.tls.cipher_list.is_some(), "{name} has no ciphers");
        assert!(profile.h2.settings_order.is_some(), "{name} has no settings order");
        assert!(profile.h2.pseudo_order.is_some(), "{name} has no pseudo order");
    }
}

#[test]
fn test_unknown_identifier_is_an_error_not_a_fallback() {
    let err = profiles::resolve(&ProfileSelector::Named("netscape_4".into())).unwrap_err();
    assert!(matches!(err, NetError::UnknownProfile(_)));
    assert!(err.to_string().contains("netscape_4"));
}

#[test]
fn test_selector_exclusivity_and_default() {
    let custom = CustomTlsClient {
        ja3_string: "771,4865,0,29,0".into(),
        pseudo_header_order: vec![
            ":method".into(),
            ":authority".into(),
            ":scheme".into(),
            ":path".into(),
        ],
        ..Default::default()
    };

    assert!(matches!(
        ProfileSelector::from_parts(Some("chrome_124"), Some(&custom)),
        Err(NetError::ProfileSelector)
    ));

    let selector = ProfileSelector::from_parts(None, Some(&custom)).unwrap();
    let profile = profiles::resolve(&selector).unwrap();
    assert_eq!(profile.name, "custom");

    let selector = ProfileSelector::from_parts(None, None).unwrap();
    let profile = profiles::resolve(&selector).unwrap();
    assert_eq!(profile.name, "chrome_124");
}

#[test]
fn test_custom_profile_validation_is_strict() {
    let mut custom = CustomTlsClient {
        ja3_string: "771,4865-4866,0-23,29,0".into(),
        pseudo_header_order: vec![
            ":method".into(),
            ":authority".into(),
            ":scheme".into(),
            ":path".into(),
        ],
        ..Default::default()
    };
    custom
        .h2_settings
        .insert("HEADER_TABLE_SIZE".to_string(), 65536);
    custom
        .h2_settings
        .insert("INITIAL_WINDOW_SIZE".to_string(), 6_291_456);

    // Order missing a map key: rejected, not silently reordered.
    custom.h2_settings_order = vec!["HEADER_TABLE_SIZE".to_string()];
    let selector = ProfileSelector::from_parts(None, Some(&custom)).unwrap();
    assert!(matches!(
        profiles::resolve(&selector),
        Err(NetError::InvalidProfile(_))
    ));

    // Exact permutation: accepted, order applied as given.
    custom.h2_settings_order = vec![
        "INITIAL_WINDOW_SIZE".to_string(),
        "HEADER_TABLE_SIZE".to_string(),
    ];
    let selector = ProfileSelector::from_parts(None, Some(&custom)).unwrap();
    let profile = profiles::resolve(&selector).unwrap();
    assert_eq!(profile.h2.initial_window_size, 6_291_456);
}

#[test]
fn test_custom_profile_requires_parseable_ja3() {
    let custom = CustomTlsClient {
        ja3_string: "garbage".into(),
        pseudo_header_order: vec![
            ":method".into(),
            ":authority".into(),
            ":scheme".into(),
            ":path".into(),
        ],
        ..Default::default()
    };
    let selector = ProfileSelector::from_parts(None, Some(&custom)).unwrap();
    assert!(matches!(
        profiles::resolve(&selector),
        Err(NetError::InvalidProfile(_))
    ));
}

#[test]
fn test_custom_profile_requires_four_pseudo_headers() {
    let custom = CustomTlsClient {
        ja3_string: "771,4865,0,29,0".into(),
        pseudo_header_order: vec![":method".into(), ":path".into()],
        ..Default::default()
    };
    let selector = ProfileSelector::from_parts(None, Some(&custom)).unwrap();
    assert!(matches!(
        profiles::resolve(&selector),
        Err(NetError::InvalidProfile(_))
    ));
}
