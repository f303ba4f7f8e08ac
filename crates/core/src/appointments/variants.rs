//! Appointment payload variants
//!
//! The appointment service enforces one of (at least) two incompatible schema
//! generations and gives no way to ask which. Each variant is a cumulative
//! restriction of the canonical payload; they are tried in declaration order.

use std::fmt;

use practicebridge_domain::AppointmentRequest;
use serde::{Deserialize, Serialize};

/// Field names of the creation payload as the remote schema spells them.
pub mod field {
    pub const PRACTICE_ID: &str = "PracticeId";
    pub const PRACTICE_GUID: &str = "PracticeGuid";
    pub const SERVICE_LOCATION_ID: &str = "ServiceLocationId";
    pub const PATIENT_ID: &str = "PatientId";
    pub const PATIENT_FIRST_NAME: &str = "FirstName";
    pub const PATIENT_LAST_NAME: &str = "LastName";
    pub const PATIENT_CASE_ID: &str = "PatientCaseId";
    pub const PROVIDER_ID: &str = "ProviderId";
    pub const PROVIDER_GUID: &str = "ProviderGuid";
    pub const RESOURCE_ID: &str = "ResourceId";
    pub const RESOURCE_GUID: &str = "ResourceGuid";
    pub const RESOURCE_IDS: &str = "ResourceIds";
    pub const REASON_ID: &str = "AppointmentReasonId";
    pub const STATUS: &str = "AppointmentStatus";
    pub const APPOINTMENT_TYPE: &str = "AppointmentType";
    pub const START_TIME: &str = "StartTime";
    pub const END_TIME: &str = "EndTime";
    pub const NOTES: &str = "Notes";
    pub const IS_RECURRING: &str = "IsRecurring";
    pub const WAS_CREATED_ONLINE: &str = "WasCreatedOnline";
}

/// One candidate payload shape, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayloadVariant {
    Canonical,
    WithoutCaseId,
    WithoutFallbackResources,
    ResourceCollection,
}

impl PayloadVariant {
    /// All variants, highest priority first.
    pub const ORDER: [PayloadVariant; 4] = [
        PayloadVariant::Canonical,
        PayloadVariant::WithoutCaseId,
        PayloadVariant::WithoutFallbackResources,
        PayloadVariant::ResourceCollection,
    ];

    /// Fields this variant drops from the canonical payload. Cumulative: each
    /// variant drops everything the previous one did.
    pub fn omitted_fields(self) -> &'static [&'static str] {
        const CASE: &[&str] = &[field::PATIENT_CASE_ID];
        const FALLBACK: &[&str] = &[
            field::PATIENT_CASE_ID,
            field::RESOURCE_ID,
            field::PRACTICE_GUID,
            field::PROVIDER_GUID,
            field::RESOURCE_GUID,
        ];
        const COLLECTION: &[&str] = &[
            field::PATIENT_CASE_ID,
            field::RESOURCE_ID,
            field::PRACTICE_GUID,
            field::PROVIDER_GUID,
            field::RESOURCE_GUID,
            field::PROVIDER_ID,
        ];

        match self {
            Self::Canonical => &[],
            Self::WithoutCaseId => CASE,
            Self::WithoutFallbackResources => FALLBACK,
            Self::ResourceCollection => COLLECTION,
        }
    }

    /// Derive this variant's payload from the canonical one.
    pub fn apply(self, canonical: &AppointmentPayload) -> AppointmentPayload {
        let mut payload = canonical.clone();
        for name in self.omitted_fields() {
            payload.clear(name);
        }
        payload
    }
}

impl fmt::Display for PayloadVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Canonical => "canonical",
            Self::WithoutCaseId => "without_case_id",
            Self::WithoutFallbackResources => "without_fallback_resources",
            Self::ResourceCollection => "resource_collection",
        };
        f.write_str(label)
    }
}

/// GUID overrides configured per region. They populate the fallback
/// resource fields dropped from the third variant on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOverrides {
    pub practice_guid: Option<String>,
    pub provider_guid: Option<String>,
    pub resource_guid: Option<String>,
}

/// Canonical appointment-creation payload, before any variant is applied.
///
/// Date/time values are kept as supplied; coercion into the wire form is
/// the envelope builder's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentPayload {
    pub practice_id: Option<String>,
    pub practice_guid: Option<String>,
    pub service_location_id: Option<String>,
    pub patient_id: String,
    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
    pub patient_case_id: Option<String>,
    pub provider_id: Option<String>,
    pub provider_guid: Option<String>,
    pub resource_id: Option<String>,
    pub resource_guid: Option<String>,
    pub resource_ids: Vec<String>,
    pub reason_id: String,
    pub status: String,
    pub appointment_type: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub is_recurring: bool,
    pub was_created_online: bool,
}

impl AppointmentPayload {
    /// Build the canonical payload from a caller request, the resolved reason
    /// and the region overrides (if any).
    pub fn canonical(
        request: &AppointmentRequest,
        reason_id: impl Into<String>,
        overrides: Option<&RegionOverrides>,
    ) -> Self {
        let provider_id = non_empty(Some(request.provider_id.as_str()));
        let resource_id = non_empty(request.resource_id.as_deref());

        let mut resource_ids: Vec<String> =
            request.resource_ids.iter().filter_map(|id| non_empty(Some(id.as_str()))).collect();
        if resource_ids.is_empty() {
            resource_ids.extend(provider_id.iter().cloned());
            resource_ids.extend(resource_id.iter().cloned());
        }
        let mut seen = std::collections::HashSet::new();
        resource_ids.retain(|id| seen.insert(id.clone()));

        let overrides = overrides.cloned().unwrap_or_default();

        Self {
            practice_id: non_empty(request.practice_id.as_deref()),
            practice_guid: overrides.practice_guid,
            service_location_id: non_empty(request.service_location_id.as_deref()),
            patient_id: request.patient_id.trim().to_string(),
            patient_first_name: non_empty(request.patient_first_name.as_deref()),
            patient_last_name: non_empty(request.patient_last_name.as_deref()),
            patient_case_id: non_empty(request.patient_case_id.as_deref()),
            provider_id,
            provider_guid: overrides.provider_guid,
            resource_id,
            resource_guid: overrides.resource_guid,
            resource_ids,
            reason_id: reason_id.into(),
            status: request
                .status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "Scheduled".to_string()),
            appointment_type: non_empty(request.appointment_type.as_deref())
                .or_else(|| Some("P".to_string())),
            start_time: request.start_time.clone(),
            end_time: request.end_time.clone(),
            notes: non_empty(request.notes.as_deref()),
            is_recurring: false,
            was_created_online: true,
        }
    }

    /// Names of the fields that carry a value, in wire spelling.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let optional = [
            (field::PRACTICE_ID, self.practice_id.is_some()),
            (field::PRACTICE_GUID, self.practice_guid.is_some()),
            (field::SERVICE_LOCATION_ID, self.service_location_id.is_some()),
            (field::PATIENT_FIRST_NAME, self.patient_first_name.is_some()),
            (field::PATIENT_LAST_NAME, self.patient_last_name.is_some()),
            (field::PATIENT_CASE_ID, self.patient_case_id.is_some()),
            (field::PROVIDER_ID, self.provider_id.is_some()),
            (field::PROVIDER_GUID, self.provider_guid.is_some()),
            (field::RESOURCE_ID, self.resource_id.is_some()),
            (field::RESOURCE_GUID, self.resource_guid.is_some()),
            (field::RESOURCE_IDS, !self.resource_ids.is_empty()),
            (field::APPOINTMENT_TYPE, self.appointment_type.is_some()),
            (field::NOTES, self.notes.is_some()),
        ];

        let mut fields = vec![
            field::PATIENT_ID,
            field::REASON_ID,
            field::STATUS,
            field::START_TIME,
            field::END_TIME,
            field::IS_RECURRING,
            field::WAS_CREATED_ONLINE,
        ];
        fields.extend(optional.iter().filter(|(_, present)| *present).map(|(name, _)| *name));
        fields
    }

    fn clear(&mut self, name: &str) {
        match name {
            field::PATIENT_CASE_ID => self.patient_case_id = None,
            field::RESOURCE_ID => self.resource_id = None,
            field::PRACTICE_GUID => self.practice_guid = None,
            field::PROVIDER_GUID => self.provider_guid = None,
            field::RESOURCE_GUID => self.resource_guid = None,
            field::PROVIDER_ID => self.provider_id = None,
            _ => {}
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
