//! Patient documents

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

/// Metadata of a document stored against a patient.
///
/// The backend can create documents but cannot list them, so these records
/// are what the local metadata store keeps, keyed by `id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Document {
    pub id: Option<String>,
    pub patient_id: Option<String>,
    pub practice_id: Option<String>,
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub label: Option<String>,
    pub status: Option<String>,
    pub document_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

/// Upload request. `file_content` is base64 as the backend expects it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub patient_id: String,
    pub name: String,
    pub file_name: String,
    pub label: Option<String>,
    pub document_date: Option<String>,
    pub notes: Option<String>,
    pub file_content: String,
}
