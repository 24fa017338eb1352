use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_match_backend_latencies() {
    let settings = Settings::default();
    assert_eq!(settings.list_latency_ms, 500);
    assert_eq!(settings.update_latency_ms, 300);
    assert_eq!(settings.submit_latency_ms, 500);
    assert_eq!(settings.report_latency_ms, 1000);
    assert_eq!(settings.log_filter, "info");
    assert_eq!(settings.latency(), SimulatedLatency::default());
    assert!(settings.failure().expect("failure").is_none());
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let settings = parse_settings(
        r#"
list_latency_ms = 0
fail_resource = "grades"
"#,
    )
    .expect("parse");

    assert_eq!(settings.list_latency_ms, 0);
    assert_eq!(settings.report_latency_ms, 1000);
    assert_eq!(
        settings.failure().expect("failure"),
        Some((Operation::Grades, DEFAULT_FAIL_MESSAGE.to_string()))
    );
}

#[test]
fn app_variables_override_portal_variables() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("PORTAL_REPORT_LATENCY_MS", "10"),
            ("APP__REPORT_LATENCY_MS", "20"),
            ("PORTAL_LOG_FILTER", "debug"),
            ("PORTAL_FAIL_RESOURCE", "generate-report"),
            ("APP__FAIL_MESSAGE", "network down"),
        ]),
    )
    .expect("env");

    assert_eq!(settings.report_latency_ms, 20);
    assert_eq!(settings.log_filter, "debug");
    assert_eq!(
        settings.failure().expect("failure"),
        Some((Operation::GenerateReport, "network down".to_string()))
    );
}

#[test]
fn malformed_numbers_are_rejected() {
    let mut settings = Settings::default();
    let err = apply_env(&mut settings, env_of(&[("PORTAL_LIST_LATENCY_MS", "fast")]))
        .unwrap_err();
    assert!(err.to_string().contains("LIST_LATENCY_MS"), "{err}");
}

#[test]
fn unknown_fail_resource_is_an_error() {
    let settings = Settings {
        fail_resource: Some("library".into()),
        ..Settings::default()
    };
    assert!(settings.failure().is_err());
}

#[test]
fn explicit_missing_config_file_fails() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("portal_missing_{suffix}.toml"));
    assert!(load_settings(Some(&path)).is_err());
}

#[test]
fn reads_config_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("portal_config_{suffix}.toml"));
    fs::write(&path, "update_latency_ms = 5\nfail_message = \"down\"\n").expect("write");

    let settings = read_file(&path).expect("read");
    assert_eq!(settings.update_latency_ms, 5);
    assert_eq!(settings.fail_message.as_deref(), Some("down"));

    fs::remove_file(path).expect("cleanup");
}
