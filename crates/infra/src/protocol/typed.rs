//! Typed appointment-creation request
//!
//! The last-resort path for appointment creation: the same logical request,
//! produced by serde serialization of typed structs rather than the
//! field-map envelope builder.

use chrono_tz::Tz;
use practicebridge_core::AppointmentPayload;
use practicebridge_domain::constants::{ARRAYS_NAMESPACE, SOAP_ENVELOPE_NAMESPACE};
use practicebridge_domain::{BridgeError, Result};
use serde::Serialize;

use super::credentials::Credential;
use super::datetime::coerce;

#[derive(Debug, Serialize)]
#[serde(rename = "soapenv:Envelope")]
struct Envelope<'a> {
    #[serde(rename = "@xmlns:soapenv")]
    soapenv: &'static str,
    #[serde(rename = "@xmlns:sch")]
    sch: &'a str,
    #[serde(rename = "@xmlns:arr")]
    arr: &'static str,
    #[serde(rename = "soapenv:Header")]
    header: (),
    #[serde(rename = "soapenv:Body")]
    body: Body<'a>,
}

#[derive(Debug, Serialize)]
struct Body<'a> {
    #[serde(rename = "sch:CreateAppointment")]
    call: Call<'a>,
}

#[derive(Debug, Serialize)]
struct Call<'a> {
    #[serde(rename = "sch:request")]
    request: Request<'a>,
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    #[serde(rename = "sch:RequestHeader")]
    header: RequestHeader<'a>,
    #[serde(rename = "sch:Appointment")]
    appointment: TypedAppointment,
}

#[derive(Debug, Serialize)]
struct RequestHeader<'a> {
    #[serde(rename = "sch:CustomerKey")]
    customer_key: &'a str,
    #[serde(rename = "sch:Password")]
    password: &'a str,
    #[serde(rename = "sch:User")]
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct PatientSummary {
    #[serde(rename = "sch:FirstName", skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(rename = "sch:LastName", skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(rename = "sch:PatientId")]
    patient_id: i64,
}

#[derive(Debug, Serialize)]
struct ResourceIds {
    #[serde(rename = "arr:long")]
    items: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct TypedAppointment {
    #[serde(rename = "sch:AppointmentReasonId")]
    reason_id: i64,
    #[serde(rename = "sch:AppointmentStatus")]
    status: String,
    #[serde(rename = "sch:AppointmentType", skip_serializing_if = "Option::is_none")]
    appointment_type: Option<String>,
    #[serde(rename = "sch:EndTime")]
    end_time: String,
    #[serde(rename = "sch:IsRecurring")]
    is_recurring: bool,
    #[serde(rename = "sch:Notes", skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(rename = "sch:PatientCaseId", skip_serializing_if = "Option::is_none")]
    patient_case_id: Option<i64>,
    #[serde(rename = "sch:PatientId")]
    patient_id: i64,
    #[serde(rename = "sch:PatientSummary")]
    patient_summary: PatientSummary,
    #[serde(rename = "sch:PracticeGuid", skip_serializing_if = "Option::is_none")]
    practice_guid: Option<String>,
    #[serde(rename = "sch:PracticeId", skip_serializing_if = "Option::is_none")]
    practice_id: Option<i64>,
    #[serde(rename = "sch:ProviderGuid", skip_serializing_if = "Option::is_none")]
    provider_guid: Option<String>,
    #[serde(rename = "sch:ProviderId", skip_serializing_if = "Option::is_none")]
    provider_id: Option<i64>,
    #[serde(rename = "sch:ResourceGuid", skip_serializing_if = "Option::is_none")]
    resource_guid: Option<String>,
    #[serde(rename = "sch:ResourceId", skip_serializing_if = "Option::is_none")]
    resource_id: Option<i64>,
    #[serde(rename = "sch:ResourceIds", skip_serializing_if = "Option::is_none")]
    resource_ids: Option<ResourceIds>,
    #[serde(rename = "sch:ServiceLocationId", skip_serializing_if = "Option::is_none")]
    service_location_id: Option<i64>,
    #[serde(rename = "sch:StartTime")]
    start_time: String,
    #[serde(rename = "sch:WasCreatedOnline")]
    was_created_online: bool,
}

impl TypedAppointment {
    fn from_payload(payload: &AppointmentPayload, tz: Tz) -> Result<Self> {
        let patient_id = numeric("PatientId", &payload.patient_id)?;
        let resource_ids = payload
            .resource_ids
            .iter()
            .map(|id| numeric("ResourceIds", id))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            reason_id: numeric("AppointmentReasonId", &payload.reason_id)?,
            status: payload.status.clone(),
            appointment_type: payload.appointment_type.clone(),
            end_time: required_time("EndTime", &payload.end_time, tz)?,
            is_recurring: payload.is_recurring,
            notes: payload.notes.clone(),
            patient_case_id: optional_numeric("PatientCaseId", payload.patient_case_id.as_deref())?,
            patient_id,
            patient_summary: PatientSummary {
                first_name: payload.patient_first_name.clone(),
                last_name: payload.patient_last_name.clone(),
                patient_id,
            },
            practice_guid: payload.practice_guid.clone(),
            practice_id: optional_numeric("PracticeId", payload.practice_id.as_deref())?,
            provider_guid: payload.provider_guid.clone(),
            provider_id: optional_numeric("ProviderId", payload.provider_id.as_deref())?,
            resource_guid: payload.resource_guid.clone(),
            resource_id: optional_numeric("ResourceId", payload.resource_id.as_deref())?,
            resource_ids: (!resource_ids.is_empty()).then_some(ResourceIds { items: resource_ids }),
            service_location_id: optional_numeric(
                "ServiceLocationId",
                payload.service_location_id.as_deref(),
            )?,
            start_time: required_time("StartTime", &payload.start_time, tz)?,
            was_created_online: payload.was_created_online,
        })
    }
}

/// Serialize a CreateAppointment request from the canonical payload.
///
/// # Errors
/// `BridgeError::InvalidInput` for a missing credential, non-numeric
/// identifiers or unusable times.
pub fn create_appointment_envelope(
    namespace: &str,
    credential: &Credential,
    payload: &AppointmentPayload,
    timezone: Tz,
) -> Result<String> {
    credential.validate()?;

    let envelope = Envelope {
        soapenv: SOAP_ENVELOPE_NAMESPACE,
        sch: namespace,
        arr: ARRAYS_NAMESPACE,
        header: (),
        body: Body {
            call: Call {
                request: Request {
                    header: RequestHeader {
                        customer_key: credential.customer_key.expose(),
                        password: credential.password.expose(),
                        user: credential.user.expose(),
                    },
                    appointment: TypedAppointment::from_payload(payload, timezone)?,
                },
            },
        },
    };

    quick_xml::se::to_string(&envelope)
        .map_err(|err| BridgeError::Internal(format!("failed to serialize typed request: {err}")))
}

fn numeric(field: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| BridgeError::InvalidInput(format!("{field} must be numeric, got {value:?}")))
}

fn optional_numeric(field: &str, value: Option<&str>) -> Result<Option<i64>> {
    value.map(|value| numeric(field, value)).transpose()
}

fn required_time(field: &str, value: &str, tz: Tz) -> Result<String> {
    coerce(field, value, tz)?
        .ok_or_else(|| BridgeError::InvalidInput(format!("{field} is required")))
}
