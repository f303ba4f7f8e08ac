//! Appointment records and creation requests

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::shared::{PracticeRef, ProviderRef, ReasonRef};
use crate::impl_wire_enum_conversions;

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub enum AppointmentStatus {
    Scheduled,
    Tentative,
    ReminderSent,
    Confirmed,
    CheckedIn,
    ReadyToBeSeen,
    Seen,
    CheckedOut,
    NoShow,
    Rescheduled,
    Cancelled,
}

impl_wire_enum_conversions!(AppointmentStatus {
    Scheduled => "Scheduled",
    Tentative => "Tentative",
    ReminderSent => "ReminderSent" | "Reminder Sent",
    Confirmed => "Confirmed",
    CheckedIn => "CheckedIn" | "Check-in" | "Checked In",
    ReadyToBeSeen => "ReadyToBeSeen" | "Ready To Be Seen",
    Seen => "Seen",
    CheckedOut => "CheckedOut" | "Check-out" | "Checked Out",
    NoShow => "NoShow" | "No Show" | "No-Show",
    Rescheduled => "Rescheduled",
    Cancelled => "Cancelled" | "Canceled",
});

/// Normalized appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Appointment {
    pub id: Option<String>,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_case_id: Option<String>,
    pub practice: PracticeRef,
    pub provider: ProviderRef,
    pub reason: ReasonRef,
    pub service_location_id: Option<String>,
    pub resource_id: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub last_modified_at: Option<String>,
}

/// Caller-facing request to book an appointment.
///
/// `reason_id` may be left empty; the adapter resolves it from configuration
/// or the live reason directory before anything is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct AppointmentRequest {
    pub patient_id: String,
    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
    pub patient_case_id: Option<String>,
    pub practice_id: Option<String>,
    pub service_location_id: Option<String>,
    pub provider_id: String,
    pub resource_id: Option<String>,
    #[serde(default)]
    pub resource_ids: Vec<String>,
    pub reason_id: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    /// Region key used to look up configured GUID overrides.
    pub region: Option<String>,
}

/// Listing criteria for appointments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub patient_id: Option<String>,
    pub practice_name: Option<String>,
    pub status: Option<AppointmentStatus>,
}
