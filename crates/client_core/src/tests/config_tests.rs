use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_point_at_local_service() {
    let settings = settings_from_sources(None, no_env).expect("defaults");
    assert_eq!(settings.exchange_endpoint.as_str(), "http://127.0.0.1:8000/chat");
    assert_eq!(settings.report_endpoint.as_str(), "http://127.0.0.1:8000/report");
    assert_eq!(settings.pacing_delay(), Duration::from_millis(800));
}

#[test]
fn server_url_derives_both_endpoints() {
    let settings = settings_from_sources(Some("server_url = \"https://interviews.example.com/api/\""), no_env)
        .expect("settings");
    assert_eq!(
        settings.exchange_endpoint.as_str(),
        "https://interviews.example.com/api/chat"
    );
    assert_eq!(
        settings.report_endpoint.as_str(),
        "https://interviews.example.com/api/report"
    );
}

#[test]
fn explicit_endpoint_wins_over_server_url_and_env_wins_over_file() {
    let file = r#"
server_url = "http://file.example"
report_endpoint = "http://file.example/custom-report"
pacing_delay_ms = 250
"#;
    let settings = settings_from_sources(Some(file), |key| match key {
        "APP__EXCHANGE_ENDPOINT" => Some("http://env.example/exchange".to_string()),
        "APP__PACING_DELAY_MS" => Some("100".to_string()),
        _ => None,
    })
    .expect("settings");

    assert_eq!(settings.exchange_endpoint.as_str(), "http://env.example/exchange");
    assert_eq!(
        settings.report_endpoint.as_str(),
        "http://file.example/custom-report"
    );
    assert_eq!(settings.pacing_delay_ms, 100);
}

#[test]
fn unparsable_numbers_keep_defaults() {
    let settings = settings_from_sources(None, |key| match key {
        "APP__REQUEST_TIMEOUT_SECS" => Some("soon".to_string()),
        _ => None,
    })
    .expect("settings");
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn invalid_endpoint_is_an_error() {
    let err = settings_from_sources(Some("exchange_endpoint = \"ftp://nope\""), no_env)
        .expect_err("ftp endpoint must be rejected");
    assert!(err.to_string().contains("http or https"));

    assert!(settings_from_sources(None, |key| {
        (key == "INTERVIEW_SERVER_URL").then(|| "not a url".to_string())
    })
    .is_err());
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("interview_missing_{suffix}.toml"));

    let settings = load_settings_from(&path).expect("defaults");
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
}

#[test]
fn reads_config_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("interview_config_{suffix}.toml"));
    fs::write(&path, "request_timeout_secs = 5\n").expect("write config");

    let settings = load_settings_from(&path).expect("settings");
    assert_eq!(settings.request_timeout_secs, 5);

    fs::remove_file(path).expect("cleanup");
}
