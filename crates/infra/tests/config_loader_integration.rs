//! Integration tests for configuration loader
//!
//! Tests loading configuration from files and driving the adapter with it.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use practicebridge_core::PracticeManagement;
use practicebridge_domain::{AppointmentRequest, BridgeError};
use practicebridge_infra::{config, PmAdapter};
use support::{appointment_detail, bodies_for, created_appointment, procedure};
use tempfile::NamedTempFile;
use wiremock::{MockServer, ResponseTemplate};

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[tokio::test]
async fn test_region_overrides_from_toml_reach_the_envelope() {
    let server = MockServer::start().await;
    procedure("CreateAppointment")
        .respond_with(ResponseTemplate::new(200).set_body_string(created_appointment("31")))
        .mount(&server)
        .await;
    procedure("GetAppointment")
        .respond_with(ResponseTemplate::new(200).set_body_string(appointment_detail("31")))
        .mount(&server)
        .await;

    let toml_content = format!(
        r#"
endpoint_url = "{}/services/soap"
customer_key = "ck-file"
user = "file.user"
password = "file-secret"
practice_name = "South"
timezone = "America/Chicago"
default_reason_id = "11"
post_listing_delay_ms = 0

[regions.west]
practice_guid = "7C1E-PRACTICE"
provider_guid = "7C1E-PROVIDER"
resource_guid = "7C1E-RESOURCE"
"#,
        server.uri()
    );
    let path = write_config(&toml_content, "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();
    let config = result.expect("config should load from TOML");

    assert_eq!(config.timezone.name(), "America/Chicago");
    let adapter = PmAdapter::new(Arc::new(config));

    let request = AppointmentRequest {
        patient_id: "501".into(),
        provider_id: "12".into(),
        start_time: "2025-03-01T09:00:00".into(),
        end_time: "2025-03-01T09:30:00".into(),
        region: Some("West".into()),
        ..Default::default()
    };
    adapter.create_appointment(&request).await.expect("appointment should be created");

    let bodies = bodies_for(&server, "CreateAppointment").await;
    assert_eq!(bodies.len(), 1);
    let envelope = &bodies[0];
    assert!(envelope.contains("<sch:PracticeGuid>7C1E-PRACTICE</sch:PracticeGuid>"));
    assert!(envelope.contains("<sch:ResourceGuid>7C1E-RESOURCE</sch:ResourceGuid>"));
    assert!(envelope.contains("<sch:AppointmentReasonId>11</sch:AppointmentReasonId>"));
    assert!(envelope.contains("<sch:StartTime>2025-03-01T09:00:00-06:00</sch:StartTime>"));
    assert!(envelope.contains("<sch:CustomerKey>ck-file</sch:CustomerKey>"));
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "endpoint_url": "https://pm.example.test/services/soap",
        "namespace": "http://schemas.example.test/pm/",
        "customer_key": "ck-json",
        "user": "json.user",
        "password": "json-secret",
        "practice_name": "East",
        "client_mode": "typed",
        "batch_size": 3,
        "batch_delay_ms": 2000,
        "log_level": "debug",
        "log_json": true
    }"#;
    let path = write_config(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();
    let config = result.expect("config should load from JSON");

    assert_eq!(config.namespace, "http://schemas.example.test/pm/");
    assert_eq!(config.action_base, "http://schemas.example.test/pm/KareoServices/");
    assert_eq!(config.batch.batch_size, 3);
    assert_eq!(config.batch.batch_delay.as_millis(), 2000);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/practicebridge.json".into()));

    match result {
        Err(BridgeError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    match result {
        Err(BridgeError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_unknown_timezone() {
    let path = write_config(
        r#"
endpoint_url = "https://pm.example.test/services/soap"
customer_key = "ck"
user = "u"
password = "p"
practice_name = "North"
timezone = "Mars/Olympus"
"#,
        "toml",
    );

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(matches!(result, Err(BridgeError::Config(_))));
}
