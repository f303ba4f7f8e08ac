//! Appointment creation: input checks, reason resolution and the variant
//! state machine wired to the raw and typed pipelines.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use practicebridge_core::appointments::resolve_reason;
use practicebridge_core::{
    AppointmentCreation, AppointmentPayload, CreationOrchestrator, PayloadVariant,
    PracticeManagement, ReasonDirectory, TypedFallback, VariantExecutor,
};
use practicebridge_domain::{
    Appointment, AppointmentRequest, AppointmentStatus, BridgeError, PracticeRef, ProviderRef,
    Reason, ReasonRef, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{required_id, PmAdapter};
use crate::normalize::outbound::appointment_payload_fields;
use crate::protocol::datetime::coerce;
use crate::protocol::typed::create_appointment_envelope;
use crate::protocol::{appointment_id, extract, FieldMap, Procedure};

/// A booked appointment together with how the booking went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAppointment {
    pub appointment: Appointment,
    pub creation: AppointmentCreation,
}

impl PmAdapter {
    /// Create an appointment and report which payload strategy the backend
    /// accepted.
    ///
    /// Everything that can be rejected locally is rejected before the first
    /// network call: credential, identifiers and times. The reason id is
    /// resolved next, then the variants are tried.
    ///
    /// # Errors
    /// - `BridgeError::InvalidInput` for local validation failures or an
    ///   unresolvable appointment reason
    /// - The first terminal failure of the state machine, message verbatim
    pub async fn book_appointment(&self, request: &AppointmentRequest) -> Result<CreatedAppointment> {
        self.config.credential.validate()?;
        required_id("patient id", &request.patient_id)?;
        let has_resource = !request.provider_id.trim().is_empty()
            || request.resource_ids.iter().any(|id| !id.trim().is_empty());
        if !has_resource {
            return Err(BridgeError::InvalidInput("provider id is required".into()));
        }

        let timezone = self.config.timezone;
        let start_time = coerce("StartTime", &request.start_time, timezone)?
            .ok_or_else(|| BridgeError::InvalidInput("StartTime is required".into()))?;
        let end_time = coerce("EndTime", &request.end_time, timezone)?
            .ok_or_else(|| BridgeError::InvalidInput("EndTime is required".into()))?;
        if instant(&end_time) < instant(&start_time) {
            return Err(BridgeError::InvalidInput("EndTime must not precede StartTime".into()));
        }

        let reason =
            resolve_reason(request.reason_id.as_deref(), &self.config.reason_defaults, self).await?;
        debug!(reason_id = %reason.id, source = ?reason.source, "appointment reason resolved");

        let overrides = request.region.as_deref().and_then(|region| {
            let found = self.config.region(region);
            if found.is_none() {
                warn!(region, "no overrides configured for region");
            }
            found
        });

        let mut normalized = request.clone();
        normalized.start_time = start_time;
        normalized.end_time = end_time;
        let canonical = AppointmentPayload::canonical(&normalized, reason.id.clone(), overrides);

        let creation = CreationOrchestrator::new(self, self, self.config.client_mode)
            .run(&canonical)
            .await?;

        let appointment = match self.get_appointment(&creation.appointment_id).await {
            Ok(appointment) => appointment,
            Err(err) => {
                warn!(
                    appointment_id = %creation.appointment_id,
                    error = %err,
                    "created appointment could not be read back, using request values"
                );
                from_request(&creation.appointment_id, &canonical, reason.name.clone())
            }
        };

        info!(
            appointment_id = %creation.appointment_id,
            strategy = %creation.strategy,
            attempts = creation.attempts,
            "appointment booked"
        );
        Ok(CreatedAppointment { appointment, creation })
    }
}

fn created_id(extracted_id: Option<String>) -> Result<String> {
    extracted_id.ok_or_else(|| {
        BridgeError::Application("CreateAppointment response carried no appointment id".into())
    })
}

fn instant(wire: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(wire).ok()
}

fn from_request(id: &str, payload: &AppointmentPayload, reason_name: Option<String>) -> Appointment {
    Appointment {
        id: Some(id.to_string()),
        patient_id: Some(payload.patient_id.clone()),
        patient_name: match (&payload.patient_first_name, &payload.patient_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (first, last) => first.clone().or_else(|| last.clone()),
        },
        patient_case_id: payload.patient_case_id.clone(),
        practice: PracticeRef { id: payload.practice_id.clone(), name: None },
        provider: ProviderRef { id: payload.provider_id.clone(), full_name: None },
        reason: ReasonRef { id: Some(payload.reason_id.clone()), name: reason_name },
        service_location_id: payload.service_location_id.clone(),
        resource_id: payload.resource_id.clone(),
        status: payload.status.parse::<AppointmentStatus>().ok(),
        appointment_type: payload.appointment_type.clone(),
        start_time: Some(payload.start_time.clone()),
        end_time: Some(payload.end_time.clone()),
        notes: payload.notes.clone(),
        created_at: None,
        last_modified_at: None,
    }
}

#[async_trait]
impl VariantExecutor for PmAdapter {
    async fn submit_variant(
        &self,
        variant: PayloadVariant,
        payload: &AppointmentPayload,
    ) -> Result<String> {
        let fields = appointment_payload_fields(payload);
        let envelope = self.builder().build(Procedure::CreateAppointment, &fields, &FieldMap::new())?;
        debug!(%variant, "sending raw appointment variant");

        let body = self.send(Procedure::CreateAppointment, envelope).await?;
        let extracted = extract(&body, Procedure::CreateAppointment)?;
        created_id(appointment_id(&extracted, &body))
    }
}

#[async_trait]
impl TypedFallback for PmAdapter {
    async fn submit_typed(&self, payload: &AppointmentPayload) -> Result<String> {
        let envelope = create_appointment_envelope(
            &self.config.namespace,
            &self.config.credential,
            payload,
            self.config.timezone,
        )?;

        let body = self.send(Procedure::CreateAppointment, envelope).await?;
        let extracted = extract(&body, Procedure::CreateAppointment)?;
        created_id(appointment_id(&extracted, &body))
    }
}

#[async_trait]
impl ReasonDirectory for PmAdapter {
    async fn list_reasons(&self) -> Result<Vec<Reason>> {
        PracticeManagement::list_reasons(self).await
    }
}
