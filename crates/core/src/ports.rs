//! Port interfaces for the practice-management integration
//!
//! `PracticeManagement` is what the scheduling application consumes; the
//! remaining traits are the seams the adapter plugs into.

use async_trait::async_trait;
use practicebridge_domain::{
    Appointment, AppointmentFilter, AppointmentRequest, Document, NewDocument, Patient,
    PatientFilter, Practice, Provider, Reason, Result,
};

/// One operation per domain action. Every method returns a normalized record
/// or a typed [`practicebridge_domain::BridgeError`].
#[async_trait]
pub trait PracticeManagement: Send + Sync {
    // Patients
    async fn create_patient(&self, patient: &Patient) -> Result<Patient>;
    async fn get_patient(&self, patient_id: &str) -> Result<Patient>;
    async fn update_patient(&self, patient: &Patient) -> Result<Patient>;
    async fn delete_patient(&self, patient_id: &str) -> Result<()>;
    async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>>;

    // Appointments
    async fn create_appointment(&self, request: &AppointmentRequest) -> Result<Appointment>;
    async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment>;
    async fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment>;
    async fn delete_appointment(&self, appointment_id: &str) -> Result<()>;
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>>;

    /// Summary listing followed by throttled per-id detail lookups. Items
    /// whose lookup fails are left out.
    async fn list_appointments_detailed(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>>;

    // Directory
    async fn list_providers(&self) -> Result<Vec<Provider>>;
    async fn list_practices(&self) -> Result<Vec<Practice>>;
    async fn list_reasons(&self) -> Result<Vec<Reason>>;

    // Documents
    async fn create_document(&self, document: &NewDocument) -> Result<Document>;
}

/// Local store for document metadata.
///
/// The remote protocol supports document creation only, so listing and
/// lookup are served from here.
#[async_trait]
pub trait DocumentMetadataStore: Send + Sync {
    async fn save(&self, document: &Document) -> Result<()>;

    async fn get(&self, document_id: &str) -> Result<Option<Document>>;

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Document>>;
}

/// Live appointment-reason directory
#[async_trait]
pub trait ReasonDirectory: Send + Sync {
    async fn list_reasons(&self) -> Result<Vec<Reason>>;
}
