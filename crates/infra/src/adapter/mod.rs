//! Practice-management adapter
//!
//! `PmAdapter` is the concrete [`PracticeManagement`] implementation. Every
//! operation composes envelope builder, transport, extractor and normalizer
//! once; appointment creation runs the variant state machine over the same
//! pipeline instead.
//!
//! [`PracticeManagement`]: practicebridge_core::PracticeManagement

mod appointments;
mod operations;

use std::sync::Arc;
use std::time::Instant;

use practicebridge_core::DocumentMetadataStore;
use practicebridge_domain::constants::MAX_LOGGED_BODY_CHARS;
use practicebridge_domain::{BridgeError, Document, Result};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub use appointments::CreatedAppointment;

use crate::config::AdapterConfig;
use crate::http::SoapTransport;
use crate::protocol::{extract, EnvelopeBuilder, ExtractedResponse, FieldMap, Procedure};
use crate::storage::InMemoryDocumentStore;

/// The protocol adapter.
///
/// Holds no mutable state beyond the transport, which is built on first use
/// and memoized. A failed build leaves the cell empty so the next call
/// retries it.
pub struct PmAdapter {
    config: Arc<AdapterConfig>,
    transport: OnceCell<SoapTransport>,
    documents: Arc<dyn DocumentMetadataStore>,
}

impl PmAdapter {
    /// Adapter backed by an in-memory document store.
    pub fn new(config: Arc<AdapterConfig>) -> Self {
        Self::with_document_store(config, Arc::new(InMemoryDocumentStore::new()))
    }

    pub fn with_document_store(
        config: Arc<AdapterConfig>,
        documents: Arc<dyn DocumentMetadataStore>,
    ) -> Self {
        Self { config, transport: OnceCell::new(), documents }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Check if the practice-management endpoint answers
    ///
    /// Issues a GetPractices call.
    ///
    /// # Returns
    /// * `Ok(true)` - Endpoint reachable and credentials accepted
    /// * `Ok(false)` - Endpoint unreachable or timed out
    ///
    /// # Errors
    /// Any non-transport failure (rejected credentials, faults) is returned.
    pub async fn check_connectivity(&self) -> Result<bool> {
        match self.call(Procedure::GetPractices, &FieldMap::new(), &self.practice_filter()).await {
            Ok(_) => Ok(true),
            Err(BridgeError::Network(message)) => {
                warn!(error = %message, "connectivity check failed: network error");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Documents previously created for `patient_id`, from the local store.
    pub async fn documents_for_patient(&self, patient_id: &str) -> Result<Vec<Document>> {
        let patient_id = required_id("patient id", patient_id)?;
        self.documents.list_for_patient(patient_id).await
    }

    /// # Errors
    /// `BridgeError::NotFound` if no document with that id was recorded.
    pub async fn get_document(&self, document_id: &str) -> Result<Document> {
        let document_id = required_id("document id", document_id)?;
        self.documents
            .get(document_id)
            .await?
            .ok_or_else(|| BridgeError::NotFound(format!("document {document_id}")))
    }

    async fn transport(&self) -> Result<&SoapTransport> {
        self.transport
            .get_or_try_init(|| async {
                debug!(endpoint = %self.config.endpoint, "initializing transport");
                SoapTransport::builder(self.config.endpoint.clone(), self.config.action_base.clone())
                    .timeout(self.config.timeout)
                    .build()
            })
            .await
    }

    fn builder(&self) -> EnvelopeBuilder<'_> {
        EnvelopeBuilder::new(&self.config.namespace, &self.config.credential, self.config.timezone)
    }

    fn practice_filter(&self) -> FieldMap {
        FieldMap::new().with("PracticeName", self.config.credential.practice_name.clone())
    }

    /// Build, send and extract one procedure call.
    async fn call(
        &self,
        procedure: Procedure,
        fields: &FieldMap,
        filters: &FieldMap,
    ) -> Result<ExtractedResponse> {
        let envelope = self.builder().build(procedure, fields, filters)?;
        let body = self.send(procedure, envelope).await?;
        extract(&body, procedure)
    }

    /// Send a finished envelope; returns the raw body of a success response.
    ///
    /// Error messages leave here with every secret redacted, since remote
    /// faults may echo the header back.
    async fn send(&self, procedure: Procedure, envelope: String) -> Result<String> {
        let credential = &self.config.credential;
        if self.config.debug.envelopes {
            info!(procedure = %procedure, envelope = %credential.redact(&envelope), "outgoing envelope");
        }

        let transport = self.transport().await?;
        let started = Instant::now();
        let outcome = transport
            .post(procedure, envelope)
            .await
            .map_err(|err| err.map_message(|message| credential.redact(message)));
        let duration_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(body) => {
                debug!(procedure = %procedure, duration_ms, "call succeeded");
                if self.config.debug.responses {
                    info!(
                        procedure = %procedure,
                        body = %credential.redact(&truncate(body, MAX_LOGGED_BODY_CHARS)),
                        "response body"
                    );
                }
            }
            Err(err) => {
                warn!(
                    procedure = %procedure,
                    duration_ms,
                    kind = err.label(),
                    error = %err,
                    "call failed"
                );
            }
        }
        outcome
    }
}

fn required_id<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(BridgeError::InvalidInput(format!("{what} is required")))
    } else {
        Ok(trimmed)
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}... [truncated]", &body[..cut]),
        None => body.to_string(),
    }
}
