//! Normalized domain records
//!
//! These are the only shapes the scheduling application ever sees. The remote
//! schema's PascalCase / `ID` / `Id` drift is resolved by the normalizer in
//! `practicebridge-infra`; nested sub-records are always present with `None`
//! leaves so consumers never branch on presence.

pub mod appointment;
pub mod directory;
pub mod document;
pub mod patient;
pub mod shared;

pub use appointment::{Appointment, AppointmentFilter, AppointmentRequest, AppointmentStatus};
pub use directory::{Practice, Provider, Reason};
pub use document::{Document, NewDocument};
pub use patient::{Gender, Patient, PatientFilter};
pub use shared::{Address, EmergencyContact, Insurance, PracticeRef, ProviderRef, ReasonRef};
