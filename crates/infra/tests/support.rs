//! Shared fixtures for the adapter integration tests.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use practicebridge_core::BatchPolicy;
use practicebridge_domain::constants::DEFAULT_SCHEMA_NAMESPACE;
use practicebridge_infra::{AdapterConfig, Credential, PmAdapter};
use tracing_subscriber::fmt::MakeWriter;
use url::Url;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockBuilder, MockServer};

/// Contains markup-special characters so the escaped form is exercised too.
pub const PASSWORD: &str = "s3cr<et>&pass";
pub const CUSTOMER_KEY: &str = "ck-integration-0001";
pub const USER: &str = "integration.user@example.test";
pub const PRACTICE_NAME: &str = "North Clinic";

pub const TRANSLATION_FAILURE: &str =
    "Error translating AppointmentCreate to CreateAppointmentV3Request";

pub fn credential() -> Credential {
    Credential::new(CUSTOMER_KEY, USER, PASSWORD, PRACTICE_NAME)
}

/// Configuration pointed at `server` with every delay switched off.
pub fn config(server: &MockServer) -> AdapterConfig {
    let endpoint = Url::parse(&format!("{}/services/soap", server.uri())).expect("mock server uri");
    let mut config = AdapterConfig::new(endpoint, credential());
    config.practice_id = Some("1".to_string());
    config.timeout = Duration::from_secs(5);
    config.post_listing_delay = Duration::ZERO;
    config.batch =
        BatchPolicy { batch_size: 5, call_delay: Duration::ZERO, batch_delay: Duration::ZERO };
    config
}

pub fn adapter(config: AdapterConfig) -> PmAdapter {
    PmAdapter::new(Arc::new(config))
}

/// POST mock matching one procedure's action header.
pub fn procedure(name: &str) -> MockBuilder {
    Mock::given(method("POST")).and(header(
        "SOAPAction",
        format!("\"{}KareoServices/{name}\"", DEFAULT_SCHEMA_NAMESPACE).as_str(),
    ))
}

/// Success envelope wrapping `inner` in the procedure's result element.
pub fn success(procedure: &str, inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body>\
         <{procedure}Response xmlns=\"{DEFAULT_SCHEMA_NAMESPACE}\"><{procedure}Result>\
         <ErrorResponse><IsError>false</IsError></ErrorResponse>\
         <SecurityResponse><Authenticated>true</Authenticated><Authorized>true</Authorized>\
         <SecurityResultSuccess>true</SecurityResultSuccess></SecurityResponse>\
         {inner}\
         </{procedure}Result></{procedure}Response></s:Body></s:Envelope>"
    )
}

/// Success-shaped envelope carrying an embedded error.
pub fn embedded_error(procedure: &str, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body>\
         <{procedure}Response xmlns=\"{DEFAULT_SCHEMA_NAMESPACE}\"><{procedure}Result>\
         <ErrorResponse><ErrorMessage>{message}</ErrorMessage><IsError>true</IsError></ErrorResponse>\
         </{procedure}Result></{procedure}Response></s:Body></s:Envelope>"
    )
}

pub fn fault(code: &str, message: &str) -> String {
    format!(
        "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body><s:Fault>\
         <faultcode xmlns:a=\"urn:fault\">{code}</faultcode>\
         <faultstring xml:lang=\"en-US\">{message}</faultstring>\
         </s:Fault></s:Body></s:Envelope>"
    )
}

pub fn created_appointment(id: &str) -> String {
    success(
        "CreateAppointment",
        &format!("<Appointment><AppointmentId>{id}</AppointmentId></Appointment>"),
    )
}

pub fn appointment_detail(id: &str) -> String {
    success(
        "GetAppointment",
        &format!(
            "<Appointment><AppointmentId>{id}</AppointmentId><PatientId>501</PatientId>\
             <ProviderId>12</ProviderId><AppointmentReasonId>11</AppointmentReasonId>\
             <StartTime>2025-03-01T09:00:00-06:00</StartTime><EndTime>2025-03-01T09:30:00-06:00</EndTime>\
             <AppointmentStatus>Scheduled</AppointmentStatus></Appointment>"
        ),
    )
}

/// Request bodies the server received for `procedure`, in arrival order.
pub async fn bodies_for(server: &MockServer, procedure: &str) -> Vec<String> {
    let action = format!("\"{}KareoServices/{procedure}\"", DEFAULT_SCHEMA_NAMESPACE);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| {
            request
                .headers
                .get("SOAPAction")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value == action)
        })
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .collect()
}

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let guard = self.buffer.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&guard).into_owned()
    }

    /// Install a TRACE-level subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
