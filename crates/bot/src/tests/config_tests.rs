use super::*;

fn raw(token: &str, url: &str) -> RawSettings {
    RawSettings {
        bot_token: Some(token.to_string()),
        gs_webapp_url: Some(url.to_string()),
        ..RawSettings::default()
    }
}

#[test]
fn defaults_fill_optional_keys() {
    let settings = Settings::from_raw(raw("123:abc", "https://script.example.com/exec"))
        .expect("settings");
    assert_eq!(settings.tz, chrono_tz::Asia::Jakarta);
    assert_eq!(settings.data_dir, PathBuf::from("data"));
    assert_eq!(settings.store_timeout, Duration::from_secs(20));
    assert_eq!(settings.store_url.as_str(), "https://script.example.com/exec");
}

#[test]
fn all_missing_keys_are_reported_together() {
    let err = Settings::from_raw(RawSettings {
        bot_token: Some("   ".into()),
        ..RawSettings::default()
    })
    .expect_err("missing keys");
    match err {
        ConfigError::Missing(keys) => assert_eq!(keys, ["BOT_TOKEN", "GS_WEBAPP_URL"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn values_are_trimmed_and_validated() {
    let mut input = raw(" 123:abc ", " https://script.example.com/exec ");
    input.tz = Some(" Asia/Makassar ".into());
    input.data_dir = Some("/srv/bot/data".into());
    input.store_timeout_secs = Some("5".into());
    let settings = Settings::from_raw(input).expect("settings");
    assert_eq!(settings.bot_token, "123:abc");
    assert_eq!(settings.tz, chrono_tz::Asia::Makassar);
    assert_eq!(settings.store_timeout, Duration::from_secs(5));

    let mut input = raw("t", "https://script.example.com/exec");
    input.tz = Some("Mars/Olympus".into());
    assert!(matches!(
        Settings::from_raw(input),
        Err(ConfigError::InvalidTimeZone(zone)) if zone == "Mars/Olympus"
    ));

    let mut input = raw("t", "https://script.example.com/exec");
    input.store_timeout_secs = Some("0".into());
    assert!(matches!(
        Settings::from_raw(input),
        Err(ConfigError::InvalidTimeout(_))
    ));

    assert!(matches!(
        Settings::from_raw(raw("t", "not a url")),
        Err(ConfigError::InvalidUrl { .. })
    ));
}

#[test]
fn debug_output_hides_the_token() {
    let settings = Settings::from_raw(raw("123:secret", "https://script.example.com/exec"))
        .expect("settings");
    let printed = format!("{settings:?}");
    assert!(!printed.contains("secret"));
    assert!(printed.contains("<redacted>"));
}
