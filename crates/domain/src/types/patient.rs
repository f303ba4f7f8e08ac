//! Patient records

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::shared::{Address, EmergencyContact, Insurance, PracticeRef, ProviderRef};
use crate::impl_wire_enum_conversions;

/// Administrative gender as the backend records it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl_wire_enum_conversions!(Gender {
    Male => "Male" | "M",
    Female => "Female" | "F",
    Unknown => "Unknown" | "U",
});

/// Normalized patient.
///
/// `id` is the backend's numeric identifier rendered as text; it is `None`
/// only for a patient that has not been created yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Patient {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_phone: Option<String>,
    pub medical_record_number: Option<String>,
    pub address: Address,
    pub emergency_contact: EmergencyContact,
    pub insurance: Insurance,
    pub primary_provider: ProviderRef,
    pub practice: PracticeRef,
    pub created_at: Option<String>,
    pub last_modified_at: Option<String>,
}

/// Search criteria for patient listing. Empty criteria list every patient
/// of the configured practice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub practice_name: Option<String>,
    pub modified_since: Option<String>,
}
