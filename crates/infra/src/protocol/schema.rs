//! Per-procedure request schemas
//!
//! Element order is data: each procedure lists its fields in the sequence
//! the remote deserializer expects (alphabetical, as its data contracts are
//! declared). Fields not covered by a schema are appended after the covered
//! ones in caller order.

use std::fmt;
use std::str::FromStr;

use practicebridge_domain::BridgeError;

/// Remote operations the adapter issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    CreatePatient,
    GetPatient,
    UpdatePatient,
    DeletePatient,
    GetPatients,
    CreateAppointment,
    GetAppointment,
    UpdateAppointment,
    DeleteAppointment,
    GetAppointments,
    GetProviders,
    GetPractices,
    GetAppointmentReasons,
    CreateDocument,
}

impl Procedure {
    pub const ALL: [Procedure; 14] = [
        Procedure::CreatePatient,
        Procedure::GetPatient,
        Procedure::UpdatePatient,
        Procedure::DeletePatient,
        Procedure::GetPatients,
        Procedure::CreateAppointment,
        Procedure::GetAppointment,
        Procedure::UpdateAppointment,
        Procedure::DeleteAppointment,
        Procedure::GetAppointments,
        Procedure::GetProviders,
        Procedure::GetPractices,
        Procedure::GetAppointmentReasons,
        Procedure::CreateDocument,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Procedure::CreatePatient => "CreatePatient",
            Procedure::GetPatient => "GetPatient",
            Procedure::UpdatePatient => "UpdatePatient",
            Procedure::DeletePatient => "DeletePatient",
            Procedure::GetPatients => "GetPatients",
            Procedure::CreateAppointment => "CreateAppointment",
            Procedure::GetAppointment => "GetAppointment",
            Procedure::UpdateAppointment => "UpdateAppointment",
            Procedure::DeleteAppointment => "DeleteAppointment",
            Procedure::GetAppointments => "GetAppointments",
            Procedure::GetProviders => "GetProviders",
            Procedure::GetPractices => "GetPractices",
            Procedure::GetAppointmentReasons => "GetAppointmentReasons",
            Procedure::CreateDocument => "CreateDocument",
        }
    }

    /// Name of the single result wrapper in a success response.
    pub fn result_element(self) -> String {
        format!("{}Result", self.name())
    }

    pub fn schema(self) -> &'static ProcedureSchema {
        match self {
            Procedure::CreatePatient => &CREATE_PATIENT,
            Procedure::GetPatient => &GET_PATIENT,
            Procedure::UpdatePatient => &UPDATE_PATIENT,
            Procedure::DeletePatient => &DELETE_PATIENT,
            Procedure::GetPatients => &GET_PATIENTS,
            Procedure::CreateAppointment => &CREATE_APPOINTMENT,
            Procedure::GetAppointment => &GET_APPOINTMENT,
            Procedure::UpdateAppointment => &UPDATE_APPOINTMENT,
            Procedure::DeleteAppointment => &DELETE_APPOINTMENT,
            Procedure::GetAppointments => &GET_APPOINTMENTS,
            Procedure::GetProviders => &GET_PROVIDERS,
            Procedure::GetPractices => &GET_PRACTICES,
            Procedure::GetAppointmentReasons => &GET_APPOINTMENT_REASONS,
            Procedure::CreateDocument => &CREATE_DOCUMENT,
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Procedure {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|procedure| procedure.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BridgeError::InvalidInput(format!("unknown procedure: {s}")))
    }
}

/// Scalar element type inside an `arr:` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Long,
    String,
}

impl ScalarKind {
    pub fn element(self) -> &'static str {
        match self {
            ScalarKind::Long => "long",
            ScalarKind::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Bool,
    /// Coerced to one timezone-normalized form; omitted when empty.
    DateTime,
    /// Nested record with a fixed sub-structure, wrapped in the field's own element.
    Record(&'static [FieldSpec]),
    /// Repeating group: each item is wrapped in `item`.
    Records { item: &'static str, fields: &'static [FieldSpec] },
    Scalars(ScalarKind),
}

/// One ordered field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }

    const fn required(self) -> Self {
        Self { name: self.name, kind: self.kind, required: true }
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Text)
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Integer)
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Bool)
}

const fn datetime(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::DateTime)
}

const fn record(name: &'static str, fields: &'static [FieldSpec]) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Record(fields))
}

const fn records(name: &'static str, item: &'static str, fields: &'static [FieldSpec]) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Records { item, fields })
}

const fn scalars(name: &'static str, kind: ScalarKind) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Scalars(kind))
}

/// Where the procedure's fields sit inside `<sch:request>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLayout {
    /// `<sch:Fields>` followed by `<sch:Filter>`.
    FieldsAndFilter,
    /// Every field inside one record element.
    Record(&'static str),
    /// Fields directly after the request header.
    Inline,
}

/// Whether a trailing `ID` on a field key is rewritten to `Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSuffix {
    Keep,
    Rewrite,
}

impl IdSuffix {
    pub fn apply(self, key: &str) -> String {
        match self {
            IdSuffix::Rewrite if key.len() > 2 && key.ends_with("ID") => {
                format!("{}Id", &key[..key.len() - 2])
            }
            _ => key.to_string(),
        }
    }
}

/// Repeating collection inside the result element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub container: &'static str,
    pub item: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureSchema {
    pub procedure: Procedure,
    pub layout: BodyLayout,
    pub id_suffix: IdSuffix,
    pub fields: &'static [FieldSpec],
    pub filters: &'static [FieldSpec],
    pub collection: Option<Collection>,
    /// Single record element inside the result, when the result wraps one.
    pub record: Option<&'static str>,
}

/* -------------------------------------------------------------------------- */
/* Patients */
/* -------------------------------------------------------------------------- */

const PRACTICE_REF: &[FieldSpec] = &[text("PracticeID"), text("PracticeName")];

const PROVIDER_REF: &[FieldSpec] = &[text("FullName"), text("ProviderID")];

const INSURANCE_POLICY: &[FieldSpec] = &[
    text("CompanyName"),
    text("PlanName"),
    text("PolicyGroupNumber"),
    text("PolicyHolderFullName"),
    text("PolicyNumber"),
    int("Precedence"),
];

const PATIENT_CASE: &[FieldSpec] = &[
    text("CaseName"),
    flag("IsPrimaryCase"),
    text("PayerScenario"),
    records("Policies", "PatientInsurancePolicyCreateReq", INSURANCE_POLICY),
];

const PATIENT_FIELDS: &[FieldSpec] = &[
    text("AddressLine1"),
    text("AddressLine2"),
    records("Cases", "PatientCaseCreateReq", PATIENT_CASE),
    text("City"),
    text("Country"),
    datetime("DateofBirth"),
    record("DefaultRenderingProvider", PROVIDER_REF),
    text("EmailAddress"),
    text("EmergencyName"),
    text("EmergencyPhone"),
    text("FirstName").required(),
    text("Gender"),
    text("HomePhone"),
    text("LastName").required(),
    text("MedicalRecordNumber"),
    text("MiddleName"),
    text("MobilePhone"),
    record("Practice", PRACTICE_REF),
    text("State"),
    text("WorkPhone"),
    text("ZipCode"),
];

const UPDATE_PATIENT_FIELDS: &[FieldSpec] = &[
    text("AddressLine1"),
    text("AddressLine2"),
    text("City"),
    text("Country"),
    datetime("DateofBirth"),
    record("DefaultRenderingProvider", PROVIDER_REF),
    text("EmailAddress"),
    text("EmergencyName"),
    text("EmergencyPhone"),
    text("FirstName"),
    text("Gender"),
    text("HomePhone"),
    text("LastName"),
    text("MedicalRecordNumber"),
    text("MiddleName"),
    text("MobilePhone"),
    int("PatientID").required(),
    record("Practice", PRACTICE_REF),
    text("State"),
    text("WorkPhone"),
    text("ZipCode"),
];

static CREATE_PATIENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::CreatePatient,
    layout: BodyLayout::Record("Patient"),
    id_suffix: IdSuffix::Keep,
    fields: PATIENT_FIELDS,
    filters: &[],
    collection: None,
    record: None,
};

static UPDATE_PATIENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::UpdatePatient,
    layout: BodyLayout::Record("Patient"),
    id_suffix: IdSuffix::Keep,
    fields: UPDATE_PATIENT_FIELDS,
    filters: &[],
    collection: None,
    record: None,
};

static GET_PATIENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetPatient,
    layout: BodyLayout::Record("Filter"),
    id_suffix: IdSuffix::Keep,
    fields: &[int("PatientID").required()],
    filters: &[],
    collection: None,
    record: Some("Patient"),
};

static DELETE_PATIENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::DeletePatient,
    layout: BodyLayout::Inline,
    id_suffix: IdSuffix::Keep,
    fields: &[int("PatientId").required()],
    filters: &[],
    collection: None,
    record: None,
};

static GET_PATIENTS: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetPatients,
    layout: BodyLayout::FieldsAndFilter,
    id_suffix: IdSuffix::Keep,
    fields: &[],
    filters: &[
        datetime("DateOfBirth"),
        text("FirstName"),
        datetime("FromLastModifiedDate"),
        text("LastName"),
        text("PracticeName"),
    ],
    collection: Some(Collection { container: "Patients", item: "PatientData" }),
    record: None,
};

/* -------------------------------------------------------------------------- */
/* Appointments */
/* -------------------------------------------------------------------------- */

const PATIENT_SUMMARY: &[FieldSpec] = &[text("FirstName"), text("LastName"), int("PatientId")];

const CREATE_APPOINTMENT_FIELDS: &[FieldSpec] = &[
    int("AppointmentReasonId").required(),
    text("AppointmentStatus"),
    text("AppointmentType"),
    datetime("EndTime").required(),
    flag("IsRecurring"),
    text("Notes"),
    int("PatientCaseId"),
    int("PatientId").required(),
    record("PatientSummary", PATIENT_SUMMARY),
    text("PracticeGuid"),
    int("PracticeId"),
    text("ProviderGuid"),
    int("ProviderId"),
    text("ResourceGuid"),
    int("ResourceId"),
    scalars("ResourceIds", ScalarKind::Long),
    int("ServiceLocationId"),
    datetime("StartTime").required(),
    flag("WasCreatedOnline"),
];

const UPDATE_APPOINTMENT_FIELDS: &[FieldSpec] = &[
    int("AppointmentId").required(),
    int("AppointmentReasonId"),
    text("AppointmentStatus"),
    text("AppointmentType"),
    datetime("EndTime"),
    flag("IsRecurring"),
    text("Notes"),
    int("PatientCaseId"),
    int("PatientId"),
    record("PatientSummary", PATIENT_SUMMARY),
    int("PracticeId"),
    int("ProviderId"),
    int("ResourceId"),
    scalars("ResourceIds", ScalarKind::Long),
    int("ServiceLocationId"),
    datetime("StartTime"),
];

static CREATE_APPOINTMENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::CreateAppointment,
    layout: BodyLayout::Record("Appointment"),
    id_suffix: IdSuffix::Rewrite,
    fields: CREATE_APPOINTMENT_FIELDS,
    filters: &[],
    collection: None,
    record: Some("Appointment"),
};

static UPDATE_APPOINTMENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::UpdateAppointment,
    layout: BodyLayout::Record("Appointment"),
    id_suffix: IdSuffix::Rewrite,
    fields: UPDATE_APPOINTMENT_FIELDS,
    filters: &[],
    collection: None,
    record: Some("Appointment"),
};

static GET_APPOINTMENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetAppointment,
    layout: BodyLayout::Record("Appointment"),
    id_suffix: IdSuffix::Rewrite,
    fields: &[int("AppointmentId").required()],
    filters: &[],
    collection: None,
    record: Some("Appointment"),
};

static DELETE_APPOINTMENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::DeleteAppointment,
    layout: BodyLayout::Record("Appointment"),
    id_suffix: IdSuffix::Rewrite,
    fields: &[int("AppointmentId").required()],
    filters: &[],
    collection: None,
    record: None,
};

static GET_APPOINTMENTS: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetAppointments,
    layout: BodyLayout::FieldsAndFilter,
    id_suffix: IdSuffix::Keep,
    fields: &[],
    filters: &[
        text("AppointmentStatus"),
        datetime("EndDate"),
        text("PatientID"),
        text("PracticeName"),
        datetime("StartDate"),
    ],
    collection: Some(Collection { container: "Appointments", item: "AppointmentData" }),
    record: None,
};

/* -------------------------------------------------------------------------- */
/* Directory */
/* -------------------------------------------------------------------------- */

static GET_PROVIDERS: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetProviders,
    layout: BodyLayout::FieldsAndFilter,
    id_suffix: IdSuffix::Keep,
    fields: &[],
    filters: &[text("PracticeName")],
    collection: Some(Collection { container: "Providers", item: "ProviderData" }),
    record: None,
};

static GET_PRACTICES: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetPractices,
    layout: BodyLayout::FieldsAndFilter,
    id_suffix: IdSuffix::Keep,
    fields: &[],
    filters: &[text("PracticeName")],
    collection: Some(Collection { container: "Practices", item: "PracticeData" }),
    record: None,
};

static GET_APPOINTMENT_REASONS: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::GetAppointmentReasons,
    layout: BodyLayout::Inline,
    id_suffix: IdSuffix::Rewrite,
    fields: &[int("PracticeId")],
    filters: &[],
    collection: Some(Collection {
        container: "AppointmentReasons",
        item: "AppointmentReasonData",
    }),
    record: None,
};

/* -------------------------------------------------------------------------- */
/* Documents */
/* -------------------------------------------------------------------------- */

static CREATE_DOCUMENT: ProcedureSchema = ProcedureSchema {
    procedure: Procedure::CreateDocument,
    layout: BodyLayout::Record("Document"),
    id_suffix: IdSuffix::Keep,
    fields: &[
        datetime("DocumentDate"),
        text("DocumentNotes"),
        text("FileContent").required(),
        text("FileName").required(),
        text("Label"),
        text("Name"),
        int("PatientId").required(),
        int("PracticeId"),
    ],
    filters: &[],
    collection: None,
    record: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_procedure_has_a_schema_for_itself() {
        for procedure in Procedure::ALL {
            assert_eq!(procedure.schema().procedure, procedure);
            assert_eq!(procedure.name().parse::<Procedure>().unwrap(), procedure);
        }
    }

    #[test]
    fn id_suffix_rewrite_only_touches_trailing_id() {
        assert_eq!(IdSuffix::Rewrite.apply("PracticeID"), "PracticeId");
        assert_eq!(IdSuffix::Rewrite.apply("IDNumber"), "IDNumber");
        assert_eq!(IdSuffix::Rewrite.apply("ID"), "ID");
        assert_eq!(IdSuffix::Keep.apply("PatientID"), "PatientID");
    }

    #[test]
    fn appointment_procedures_rewrite_id_suffix() {
        for procedure in [
            Procedure::CreateAppointment,
            Procedure::UpdateAppointment,
            Procedure::GetAppointment,
            Procedure::DeleteAppointment,
            Procedure::GetAppointmentReasons,
        ] {
            assert_eq!(procedure.schema().id_suffix, IdSuffix::Rewrite, "{procedure}");
        }
        assert_eq!(Procedure::CreatePatient.schema().id_suffix, IdSuffix::Keep);
    }

    #[test]
    fn schema_field_lists_are_sorted() {
        for procedure in Procedure::ALL {
            let schema = procedure.schema();
            for list in [schema.fields, schema.filters] {
                let names: Vec<&str> = list.iter().map(|spec| spec.name).collect();
                let mut sorted = names.clone();
                sorted.sort_by_key(|name| name.to_ascii_lowercase());
                assert_eq!(names, sorted, "{procedure}");
            }
        }
    }

    #[test]
    fn unknown_procedure_is_rejected() {
        assert!(matches!("GetInvoices".parse::<Procedure>(), Err(BridgeError::InvalidInput(_))));
    }
}
