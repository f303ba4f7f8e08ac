//! `PracticeManagement` for the adapter: patients, appointment reads and
//! updates, directory listings and documents.

use async_trait::async_trait;
use chrono::Utc;
use practicebridge_core::{fetch_in_batches, PracticeManagement};
use practicebridge_domain::{
    Appointment, AppointmentFilter, AppointmentRequest, BridgeError, Document, NewDocument,
    Patient, PatientFilter, Practice, Provider, Reason, Result,
};
use tracing::{debug, info, warn};

use super::{required_id, PmAdapter};
use crate::normalize::outbound::{
    appointment_filter, appointment_update_fields, document_fields, patient_fields, patient_filter,
};
use crate::normalize::rules::{
    APPOINTMENT_RULES, DOCUMENT_RULES, PATIENT_RULES, PRACTICE_RULES, PROVIDER_RULES, REASON_RULES,
};
use crate::normalize::{normalize, normalize_all, overlay};
use crate::protocol::{FieldMap, Procedure};

#[async_trait]
impl PracticeManagement for PmAdapter {
    async fn create_patient(&self, patient: &Patient) -> Result<Patient> {
        let practice_name = &self.config.credential.practice_name;
        let fields = patient_fields(patient, None, practice_name);
        let response = self.call(Procedure::CreatePatient, &fields, &FieldMap::new()).await?;

        let created: Patient = overlay(patient, &response.result, PATIENT_RULES)?;
        if created.id.is_none() {
            return Err(BridgeError::Application(
                "CreatePatient response carried no patient id".into(),
            ));
        }
        info!(patient_id = ?created.id, "patient created");
        Ok(created)
    }

    async fn get_patient(&self, patient_id: &str) -> Result<Patient> {
        let patient_id = required_id("patient id", patient_id)?;
        let fields = FieldMap::new().with("PatientID", patient_id);
        let response = self.call(Procedure::GetPatient, &fields, &FieldMap::new()).await?;

        let patient: Patient = normalize(&response.result, PATIENT_RULES)?;
        if patient.id.is_none() {
            return Err(BridgeError::NotFound(format!("patient {patient_id}")));
        }
        Ok(patient)
    }

    async fn update_patient(&self, patient: &Patient) -> Result<Patient> {
        let patient_id = required_id("patient id", patient.id.as_deref().unwrap_or_default())?;
        let practice_name = &self.config.credential.practice_name;
        let fields = patient_fields(patient, Some(patient_id), practice_name);
        let response = self.call(Procedure::UpdatePatient, &fields, &FieldMap::new()).await?;

        overlay(patient, &response.result, PATIENT_RULES)
    }

    async fn delete_patient(&self, patient_id: &str) -> Result<()> {
        let patient_id = required_id("patient id", patient_id)?;
        let fields = FieldMap::new().with("PatientId", patient_id);
        self.call(Procedure::DeletePatient, &fields, &FieldMap::new()).await?;
        info!(patient_id, "patient deleted");
        Ok(())
    }

    async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>> {
        let filters = patient_filter(filter, &self.config.credential.practice_name);
        let response = self.call(Procedure::GetPatients, &FieldMap::new(), &filters).await?;
        debug!(count = response.records.len(), "patients listed");
        normalize_all(&response.records, PATIENT_RULES)
    }

    async fn create_appointment(&self, request: &AppointmentRequest) -> Result<Appointment> {
        Ok(self.book_appointment(request).await?.appointment)
    }

    async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment> {
        let appointment_id = required_id("appointment id", appointment_id)?;
        let fields = FieldMap::new().with("AppointmentID", appointment_id);
        let response = self.call(Procedure::GetAppointment, &fields, &FieldMap::new()).await?;

        let appointment: Appointment = normalize(&response.result, APPOINTMENT_RULES)?;
        if appointment.id.is_none() {
            return Err(BridgeError::NotFound(format!("appointment {appointment_id}")));
        }
        Ok(appointment)
    }

    async fn update_appointment(&self, appointment: &Appointment) -> Result<Appointment> {
        required_id("appointment id", appointment.id.as_deref().unwrap_or_default())?;
        let fields = appointment_update_fields(appointment);
        let response = self.call(Procedure::UpdateAppointment, &fields, &FieldMap::new()).await?;

        overlay(appointment, &response.result, APPOINTMENT_RULES)
    }

    async fn delete_appointment(&self, appointment_id: &str) -> Result<()> {
        let appointment_id = required_id("appointment id", appointment_id)?;
        let fields = FieldMap::new().with("AppointmentID", appointment_id);
        self.call(Procedure::DeleteAppointment, &fields, &FieldMap::new()).await?;
        info!(appointment_id, "appointment deleted");
        Ok(())
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let filters = appointment_filter(filter, &self.config.credential.practice_name);
        let response = self.call(Procedure::GetAppointments, &FieldMap::new(), &filters).await?;
        debug!(count = response.records.len(), "appointments listed");
        normalize_all(&response.records, APPOINTMENT_RULES)
    }

    async fn list_appointments_detailed(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>> {
        let summaries = self.list_appointments(filter).await?;
        let ids: Vec<String> = summaries.into_iter().filter_map(|summary| summary.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        if !self.config.post_listing_delay.is_zero() {
            tokio::time::sleep(self.config.post_listing_delay).await;
        }

        let report =
            fetch_in_batches(&ids, &self.config.batch, |id| async move { self.get_appointment(&id).await })
                .await;

        if !report.failures.is_empty() {
            warn!(
                requested = ids.len(),
                failed = report.failures.len(),
                "some appointment details could not be fetched"
            );
        }
        Ok(report.into_items())
    }

    async fn list_providers(&self) -> Result<Vec<Provider>> {
        let response =
            self.call(Procedure::GetProviders, &FieldMap::new(), &self.practice_filter()).await?;
        normalize_all(&response.records, PROVIDER_RULES)
    }

    async fn list_practices(&self) -> Result<Vec<Practice>> {
        let response =
            self.call(Procedure::GetPractices, &FieldMap::new(), &self.practice_filter()).await?;
        normalize_all(&response.records, PRACTICE_RULES)
    }

    async fn list_reasons(&self) -> Result<Vec<Reason>> {
        let fields = FieldMap::new().with("PracticeID", self.config.practice_id.clone());
        let response = self.call(Procedure::GetAppointmentReasons, &fields, &FieldMap::new()).await?;
        normalize_all(&response.records, REASON_RULES)
    }

    async fn create_document(&self, document: &NewDocument) -> Result<Document> {
        required_id("patient id", &document.patient_id)?;
        let fields = document_fields(document, self.config.practice_id.as_deref());
        let response = self.call(Procedure::CreateDocument, &fields, &FieldMap::new()).await?;

        let sent = Document {
            id: None,
            patient_id: Some(document.patient_id.trim().to_string()),
            practice_id: self.config.practice_id.clone(),
            name: Some(document.name.clone()),
            file_name: Some(document.file_name.clone()),
            label: document.label.clone(),
            status: None,
            document_date: document.document_date.clone(),
            notes: document.notes.clone(),
            created_at: Some(Utc::now().to_rfc3339()),
        };
        let created: Document = overlay(&sent, &response.result, DOCUMENT_RULES)?;
        if created.id.is_none() {
            return Err(BridgeError::Application(
                "CreateDocument response carried no document id".into(),
            ));
        }

        self.documents.save(&created).await?;
        info!(document_id = ?created.id, patient_id = %document.patient_id, "document created");
        Ok(created)
    }
}
