use std::time::{Duration, Instant};

use practicebridge_domain::constants::DEFAULT_TIMEOUT_SECS;
use practicebridge_domain::BridgeError;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::errors::InfraError;
use crate::protocol::{classify, Classification, Procedure};

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";
const ACTION_HEADER: &str = "SOAPAction";
const SNIPPET_CHARS: usize = 200;

/// POSTs request envelopes to the one configured endpoint and classifies
/// what comes back.
///
/// There is no internal retry: transport failures surface as
/// [`BridgeError::Network`] for the caller to retry.
#[derive(Clone, Debug)]
pub struct SoapTransport {
    client: ReqwestClient,
    endpoint: Url,
    action_base: String,
}

impl SoapTransport {
    /// Start building a new transport.
    pub fn builder(endpoint: Url, action_base: impl Into<String>) -> SoapTransportBuilder {
        SoapTransportBuilder::new(endpoint, action_base)
    }

    /// Value of the action header for `procedure`, quotes included.
    pub fn action(&self, procedure: Procedure) -> String {
        format!("\"{}{}\"", self.action_base, procedure)
    }

    /// Send one envelope and return the body of a success-classified response.
    ///
    /// 4xx bodies are inspected like any other payload; 5xx, timeouts and
    /// connection failures are transport errors.
    pub async fn post(&self, procedure: Procedure, envelope: String) -> Result<String, BridgeError> {
        let action = HeaderValue::from_str(&self.action(procedure))
            .map_err(|err| BridgeError::Config(format!("invalid action header: {err}")))?;
        let started = Instant::now();

        debug!(procedure = %procedure, endpoint = %self.endpoint, "sending request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .header(ACTION_HEADER, action)
            .body(envelope)
            .send()
            .await
            .map_err(|err| {
                warn!(procedure = %procedure, error = %err, "request failed");
                BridgeError::from(InfraError::from(err))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| BridgeError::Network(format!("failed to read response body: {err}")))?;

        debug!(
            procedure = %procedure,
            %status,
            duration_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "received response"
        );

        if status.is_server_error() {
            let detail = crate::protocol::classify::fault_message(&body).unwrap_or_else(|| snippet(&body));
            return Err(BridgeError::Network(format!("HTTP {}: {detail}", status.as_u16())));
        }

        match classify(&body) {
            Classification::Success if status.is_client_error() => Err(client_error(status, &body)),
            classification => classification.into_result().map(|()| body),
        }
    }
}

fn client_error(status: StatusCode, body: &str) -> BridgeError {
    let detail = snippet(body);
    let message = if detail.is_empty() {
        format!("HTTP {} {}", status.as_u16(), status.canonical_reason().unwrap_or("client error"))
    } else {
        format!("HTTP {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BridgeError::Auth(message),
        _ => BridgeError::Application(message),
    }
}

fn snippet(body: &str) -> String {
    body.trim().chars().take(SNIPPET_CHARS).collect()
}

/// Builder for [`SoapTransport`].
#[derive(Debug)]
pub struct SoapTransportBuilder {
    endpoint: Url,
    action_base: String,
    timeout: Duration,
}

impl SoapTransportBuilder {
    fn new(endpoint: Url, action_base: impl Into<String>) -> Self {
        Self {
            endpoint,
            action_base: action_base.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    /// `BridgeError::Config` for an endpoint that is not http(s) or a client
    /// that cannot be constructed.
    pub fn build(self) -> Result<SoapTransport, BridgeError> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(BridgeError::Config(format!(
                "unsupported endpoint scheme '{}'",
                self.endpoint.scheme()
            )));
        }

        let client =
            ReqwestClient::builder().timeout(self.timeout).no_proxy().build().map_err(|err| {
                let infra: InfraError = err.into();
                BridgeError::from(infra)
            })?;

        Ok(SoapTransport { client, endpoint: self.endpoint, action_base: self.action_base })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const ACTION_BASE: &str = "http://www.kareo.com/api/schemas/KareoServices/";

    fn transport(server: &MockServer) -> SoapTransport {
        SoapTransport::builder(Url::parse(&server.uri()).unwrap(), ACTION_BASE)
            .timeout(Duration::from_millis(500))
            .build()
            .expect("transport")
    }

    fn fault_body(message: &str) -> String {
        format!(
            "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body><s:Fault>\
             <faultcode>s:Client</faultcode><faultstring>{message}</faultstring></s:Fault></s:Body></s:Envelope>"
        )
    }

    #[test]
    fn non_http_endpoint_is_a_config_error() {
        let err = SoapTransport::builder(Url::parse("ftp://pm.example.test/soap").unwrap(), ACTION_BASE)
            .build()
            .unwrap_err();

        assert_eq!(err, BridgeError::Config("unsupported endpoint scheme 'ftp'".into()));
    }

    #[tokio::test]
    async fn sends_action_and_content_type_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("SOAPAction", format!("\"{ACTION_BASE}GetPractices\"").as_str()))
            .and(header("content-type", XML_CONTENT_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_string("<GetPracticesResult/>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport(&server).post(Procedure::GetPractices, "<x/>".into()).await.unwrap();

        assert_eq!(body, "<GetPracticesResult/>");
    }

    #[tokio::test]
    async fn server_errors_are_transport_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(fault_body("Internal failure")))
            .expect(1)
            .mount(&server)
            .await;

        let err = transport(&server).post(Procedure::GetPractices, "<x/>".into()).await.unwrap_err();

        assert_eq!(err, BridgeError::Network("HTTP 500: Internal failure".into()));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn client_error_bodies_are_inspected_for_faults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(fault_body("Bad PracticeId")))
            .mount(&server)
            .await;

        let err = transport(&server).post(Procedure::GetPractices, "<x/>".into()).await.unwrap_err();

        assert_eq!(err, BridgeError::Fault { code: "s:Client".into(), message: "Bad PracticeId".into() });
    }

    #[tokio::test]
    async fn plain_unauthorized_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = transport(&server).post(Procedure::GetPractices, "<x/>".into()).await.unwrap_err();

        assert!(matches!(err, BridgeError::Auth(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn embedded_error_in_success_response_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<ErrorResponse><IsError>true</IsError><ErrorMessage>Patient not found</ErrorMessage></ErrorResponse>",
            ))
            .mount(&server)
            .await;

        let err = transport(&server).post(Procedure::GetPatient, "<x/>".into()).await.unwrap_err();

        assert_eq!(err, BridgeError::Application("Patient not found".into()));
    }

    #[tokio::test]
    async fn timeout_is_a_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = transport(&server).post(Procedure::GetPractices, "<x/>".into()).await.unwrap_err();

        assert!(err.is_retryable(), "expected network error, got {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let transport = SoapTransport::builder(Url::parse(&format!("http://{addr}")).unwrap(), ACTION_BASE)
            .build()
            .expect("transport");

        let err = transport.post(Procedure::GetPractices, "<x/>".into()).await.unwrap_err();

        match err {
            BridgeError::Network(msg) => assert!(msg.to_lowercase().contains("http")),
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
