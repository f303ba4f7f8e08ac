//! Alias tables, one per domain record.
//!
//! The first alias is the spelling the current schema generation uses and
//! the one written back out by `to_record`.

use super::{Coerce, FieldRule};

const fn t(path: &'static str, sources: &'static [&'static str]) -> FieldRule {
    FieldRule::text(path, sources)
}

pub const PATIENT_RULES: &[FieldRule] = &[
    t("id", &["ID", "PatientID", "PatientId", "Id"]),
    t("guid", &["PatientGuid", "PatientGUID", "Guid"]),
    t("firstName", &["FirstName", "PatientFirstName"]),
    t("middleName", &["MiddleName", "PatientMiddleName"]),
    t("lastName", &["LastName", "PatientLastName"]),
    t("dateOfBirth", &["DOB", "DateofBirth", "DateOfBirth"]),
    FieldRule::with("gender", &["Gender"], Coerce::Gender),
    t("email", &["EmailAddress", "Email"]),
    t("homePhone", &["HomePhone"]),
    t("mobilePhone", &["MobilePhone"]),
    t("workPhone", &["WorkPhone"]),
    t("medicalRecordNumber", &["MedicalRecordNumber", "MRN"]),
    t("address.addressLine1", &["AddressLine1"]),
    t("address.addressLine2", &["AddressLine2"]),
    t("address.city", &["City"]),
    t("address.state", &["State"]),
    t("address.zipCode", &["ZipCode", "Zip"]),
    t("address.country", &["Country"]),
    t("emergencyContact.name", &["EmergencyName", "EmergencyContactName"]),
    t("emergencyContact.phone", &["EmergencyPhone", "EmergencyContactPhone"]),
    t("emergencyContact.relationship", &["EmergencyRelationship", "EmergencyContactRelationship"]),
    t(
        "insurance.companyName",
        &["PrimaryInsurancePolicyCompanyName", "InsuranceCompanyName", "CompanyName"],
    ),
    t("insurance.planName", &["PrimaryInsurancePolicyPlanName", "PlanName"]),
    t("insurance.policyNumber", &["PrimaryInsurancePolicyNumber", "PolicyNumber"]),
    t(
        "insurance.groupNumber",
        &["PrimaryInsurancePolicyGroupNumber", "PolicyGroupNumber", "GroupNumber"],
    ),
    t(
        "insurance.holderName",
        &["PrimaryInsurancePolicyHolderFullName", "PolicyHolderFullName"],
    ),
    t(
        "primaryProvider.id",
        &[
            "DefaultRenderingProviderId",
            "DefaultRenderingProviderID",
            "DefaultRenderingProvider.ProviderID",
            "DefaultRenderingProvider.ProviderId",
        ],
    ),
    t(
        "primaryProvider.fullName",
        &["DefaultRenderingProviderFullName", "DefaultRenderingProvider.FullName"],
    ),
    t("practice.id", &["PracticeId", "PracticeID", "Practice.PracticeID", "Practice.PracticeId"]),
    t("practice.name", &["PracticeName", "Practice.PracticeName"]),
    t("createdAt", &["CreatedDate", "CreatedAt"]),
    t("lastModifiedAt", &["LastModifiedDate", "LastModifiedAt"]),
];

pub const APPOINTMENT_RULES: &[FieldRule] = &[
    t("id", &["ID", "AppointmentID", "AppointmentId", "Id"]),
    t("patientId", &["PatientID", "PatientId", "PatientSummary.PatientId", "PatientSummary.PatientID"]),
    t("patientName", &["PatientFullName", "PatientName"]),
    t("patientCaseId", &["PatientCaseID", "PatientCaseId"]),
    t("practice.id", &["PracticeID", "PracticeId"]),
    t("practice.name", &["PracticeName"]),
    t("provider.id", &["ProviderID", "ProviderId"]),
    t("provider.fullName", &["ProviderFullName", "ProviderName"]),
    t("reason.id", &["AppointmentReasonID", "AppointmentReasonId", "AppointmentReasonID1"]),
    t("reason.name", &["AppointmentReason", "AppointmentReasonName", "AppointmentReason1"]),
    t("serviceLocationId", &["ServiceLocationID", "ServiceLocationId"]),
    t("resourceId", &["ResourceID", "ResourceId", "ResourceID1"]),
    FieldRule::with(
        "status",
        &["ConfirmationStatus", "AppointmentStatus", "Status"],
        Coerce::AppointmentStatus,
    ),
    t("appointmentType", &["Type", "AppointmentType"]),
    t("startTime", &["StartDate", "StartTime"]),
    t("endTime", &["EndDate", "EndTime"]),
    t("notes", &["Notes"]),
    t("createdAt", &["CreatedDate", "CreatedAt"]),
    t("lastModifiedAt", &["LastModifiedDate", "LastModifiedAt"]),
];

pub const PRACTICE_RULES: &[FieldRule] = &[
    t("id", &["ID", "PracticeID", "PracticeId"]),
    t("guid", &["PracticeGuid", "PracticeGUID"]),
    t("name", &["PracticeName", "Name"]),
    FieldRule::with("active", &["Active", "IsActive"], Coerce::Bool),
    t("phone", &["Phone", "PhoneNumber", "PracticeAddressPhone"]),
    t("email", &["Email", "EmailAddress"]),
    t("npi", &["NPI"]),
    t("taxId", &["TaxID", "TaxId"]),
    t("address.addressLine1", &["PracticeAddressLine1", "AddressLine1"]),
    t("address.addressLine2", &["PracticeAddressLine2", "AddressLine2"]),
    t("address.city", &["PracticeCity", "City"]),
    t("address.state", &["PracticeState", "State"]),
    t("address.zipCode", &["PracticeZipCode", "ZipCode"]),
    t("address.country", &["PracticeCountry", "Country"]),
];

pub const PROVIDER_RULES: &[FieldRule] = &[
    t("id", &["ID", "ProviderID", "ProviderId"]),
    t("guid", &["ProviderGuid", "Guid"]),
    t("firstName", &["FirstName"]),
    t("lastName", &["LastName"]),
    t("fullName", &["FullName", "ProviderFullName"]),
    t("degree", &["Degree"]),
    t("specialty", &["SpecialtyName", "Specialty"]),
    t("npi", &["NationalProviderIdentifier", "NPI"]),
    t("email", &["EmailAddress", "Email"]),
    t("providerType", &["Type", "ProviderType"]),
    FieldRule::with("active", &["Active", "IsActive"], Coerce::Bool),
    t("practice.id", &["PracticeID", "PracticeId"]),
    t("practice.name", &["PracticeName"]),
];

pub const REASON_RULES: &[FieldRule] = &[
    t("id", &["ID", "AppointmentReasonID", "AppointmentReasonId"]),
    t("guid", &["AppointmentReasonGuid", "Guid"]),
    t("name", &["Name", "AppointmentReasonName"]),
    FieldRule::with(
        "defaultDurationMinutes",
        &["DefaultDurationMinutes", "DefaultDuration"],
        Coerce::Number,
    ),
    t("defaultColor", &["DefaultColorCode", "DefaultColor"]),
    t("practiceId", &["PracticeID", "PracticeId"]),
];

pub const DOCUMENT_RULES: &[FieldRule] = &[
    t("id", &["DocumentID", "DocumentId", "ID"]),
    t("patientId", &["PatientID", "PatientId"]),
    t("practiceId", &["PracticeID", "PracticeId"]),
    t("name", &["Name", "DocumentName"]),
    t("fileName", &["FileName"]),
    t("label", &["Label"]),
    t("status", &["DocumentStatus", "Status"]),
    t("documentDate", &["DocumentDate"]),
    t("notes", &["DocumentNotes", "Notes"]),
    t("createdAt", &["CreatedDate", "CreatedAt"]),
];
