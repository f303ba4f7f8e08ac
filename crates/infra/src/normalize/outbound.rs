//! Domain record → request field maps.

use practicebridge_core::appointments::variants::field;
use practicebridge_core::AppointmentPayload;
use practicebridge_domain::{Appointment, AppointmentFilter, NewDocument, Patient, PatientFilter};

use crate::protocol::{FieldMap, FieldValue};

const DEFAULT_CASE_NAME: &str = "Default Case";
const DEFAULT_PAYER_SCENARIO: &str = "Commercial";

/// Patient fields for CreatePatient (`patient_id = None`) or UpdatePatient.
///
/// `practice_name` fills the practice reference when the record has none.
pub fn patient_fields(patient: &Patient, patient_id: Option<&str>, practice_name: &str) -> FieldMap {
    let mut map = FieldMap::new()
        .with("AddressLine1", patient.address.address_line1.clone())
        .with("AddressLine2", patient.address.address_line2.clone())
        .with("City", patient.address.city.clone())
        .with("Country", patient.address.country.clone())
        .with("DateofBirth", patient.date_of_birth.clone())
        .with(
            "DefaultRenderingProvider",
            FieldMap::new()
                .with("FullName", patient.primary_provider.full_name.clone())
                .with("ProviderID", patient.primary_provider.id.clone()),
        )
        .with("EmailAddress", patient.email.clone())
        .with("EmergencyName", patient.emergency_contact.name.clone())
        .with("EmergencyPhone", patient.emergency_contact.phone.clone())
        .with("FirstName", patient.first_name.clone())
        .with("Gender", patient.gender.map(|gender| gender.to_string()))
        .with("HomePhone", patient.home_phone.clone())
        .with("LastName", patient.last_name.clone())
        .with("MedicalRecordNumber", patient.medical_record_number.clone())
        .with("MiddleName", patient.middle_name.clone())
        .with("MobilePhone", patient.mobile_phone.clone())
        .with(
            "Practice",
            FieldMap::new().with("PracticeID", patient.practice.id.clone()).with(
                "PracticeName",
                patient.practice.name.clone().unwrap_or_else(|| practice_name.to_string()),
            ),
        )
        .with("State", patient.address.state.clone())
        .with("WorkPhone", patient.work_phone.clone())
        .with("ZipCode", patient.address.zip_code.clone());

    match patient_id {
        Some(id) => map.insert("PatientID", id),
        None => {
            if let Some(case) = insurance_case(patient) {
                map.insert("Cases", FieldValue::List(vec![FieldValue::Map(case)]));
            }
        }
    }

    map
}

fn insurance_case(patient: &Patient) -> Option<FieldMap> {
    let insurance = &patient.insurance;
    insurance.company_name.as_ref()?;

    let policy = FieldMap::new()
        .with("CompanyName", insurance.company_name.clone())
        .with("PlanName", insurance.plan_name.clone())
        .with("PolicyGroupNumber", insurance.group_number.clone())
        .with("PolicyHolderFullName", insurance.holder_name.clone())
        .with("PolicyNumber", insurance.policy_number.clone())
        .with("Precedence", 1i64);

    Some(
        FieldMap::new()
            .with("CaseName", DEFAULT_CASE_NAME)
            .with("IsPrimaryCase", true)
            .with("PayerScenario", DEFAULT_PAYER_SCENARIO)
            .with("Policies", FieldValue::List(vec![FieldValue::Map(policy)])),
    )
}

/// One appointment-creation payload variant as a field map.
pub fn appointment_payload_fields(payload: &AppointmentPayload) -> FieldMap {
    let summary = FieldMap::new()
        .with(field::PATIENT_FIRST_NAME, payload.patient_first_name.clone())
        .with(field::PATIENT_LAST_NAME, payload.patient_last_name.clone())
        .with(field::PATIENT_ID, payload.patient_id.clone());

    FieldMap::new()
        .with(field::PRACTICE_ID, payload.practice_id.clone())
        .with(field::PRACTICE_GUID, payload.practice_guid.clone())
        .with(field::SERVICE_LOCATION_ID, payload.service_location_id.clone())
        .with(field::PATIENT_ID, payload.patient_id.clone())
        .with("PatientSummary", summary)
        .with(field::PATIENT_CASE_ID, payload.patient_case_id.clone())
        .with(field::PROVIDER_ID, payload.provider_id.clone())
        .with(field::PROVIDER_GUID, payload.provider_guid.clone())
        .with(field::RESOURCE_ID, payload.resource_id.clone())
        .with(field::RESOURCE_GUID, payload.resource_guid.clone())
        .with(field::RESOURCE_IDS, payload.resource_ids.clone())
        .with(field::REASON_ID, payload.reason_id.clone())
        .with(field::STATUS, payload.status.clone())
        .with(field::APPOINTMENT_TYPE, payload.appointment_type.clone())
        .with(field::START_TIME, payload.start_time.clone())
        .with(field::END_TIME, payload.end_time.clone())
        .with(field::NOTES, payload.notes.clone())
        .with(field::IS_RECURRING, payload.is_recurring)
        .with(field::WAS_CREATED_ONLINE, payload.was_created_online)
}

/// UpdateAppointment fields. The caller's `ID`-suffixed spelling is fine:
/// the procedure rewrites it.
pub fn appointment_update_fields(appointment: &Appointment) -> FieldMap {
    FieldMap::new()
        .with("AppointmentID", appointment.id.clone())
        .with("AppointmentReasonID", appointment.reason.id.clone())
        .with(field::STATUS, appointment.status.map(|status| status.to_string()))
        .with(field::APPOINTMENT_TYPE, appointment.appointment_type.clone())
        .with(field::END_TIME, appointment.end_time.clone())
        .with(field::NOTES, appointment.notes.clone())
        .with("PatientCaseID", appointment.patient_case_id.clone())
        .with("PatientID", appointment.patient_id.clone())
        .with("PracticeID", appointment.practice.id.clone())
        .with("ProviderID", appointment.provider.id.clone())
        .with("ResourceID", appointment.resource_id.clone())
        .with("ServiceLocationID", appointment.service_location_id.clone())
        .with(field::START_TIME, appointment.start_time.clone())
}

pub fn patient_filter(filter: &PatientFilter, practice_name: &str) -> FieldMap {
    FieldMap::new()
        .with("DateOfBirth", filter.date_of_birth.clone())
        .with("FirstName", filter.first_name.clone())
        .with("FromLastModifiedDate", filter.modified_since.clone())
        .with("LastName", filter.last_name.clone())
        .with("PracticeName", filter.practice_name.clone().unwrap_or_else(|| practice_name.to_string()))
}

pub fn appointment_filter(filter: &AppointmentFilter, practice_name: &str) -> FieldMap {
    FieldMap::new()
        .with("AppointmentStatus", filter.status.map(|status| status.to_string()))
        .with("EndDate", filter.end_date.clone())
        .with("PatientID", filter.patient_id.clone())
        .with("PracticeName", filter.practice_name.clone().unwrap_or_else(|| practice_name.to_string()))
        .with("StartDate", filter.start_date.clone())
}

pub fn document_fields(document: &NewDocument, practice_id: Option<&str>) -> FieldMap {
    FieldMap::new()
        .with("DocumentDate", document.document_date.clone())
        .with("DocumentNotes", document.notes.clone())
        .with("FileContent", document.file_content.clone())
        .with("FileName", document.file_name.clone())
        .with("Label", document.label.clone())
        .with("Name", document.name.clone())
        .with("PatientId", document.patient_id.clone())
        .with("PracticeId", practice_id.map(str::to_string))
}
