//! Practice directory records: practices, providers and appointment reasons.

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::shared::{Address, PracticeRef};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Practice {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub npi: Option<String>,
    pub tax_id: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Provider {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub degree: Option<String>,
    pub specialty: Option<String>,
    pub npi: Option<String>,
    pub email: Option<String>,
    pub provider_type: Option<String>,
    pub active: Option<bool>,
    pub practice: PracticeRef,
}

/// Appointment reason (visit type) as configured in the practice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Reason {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub name: Option<String>,
    pub default_duration_minutes: Option<u32>,
    pub default_color: Option<String>,
    pub practice_id: Option<String>,
}
