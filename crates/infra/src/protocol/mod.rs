//! Legacy RPC protocol: request schemas, envelope construction, credential
//! injection, response classification and extraction.

pub mod classify;
pub mod credentials;
pub mod datetime;
pub mod envelope;
pub mod extractor;
pub mod schema;
pub mod typed;
pub mod values;

pub use classify::{classify, Classification};
pub use credentials::{Credential, Secret};
pub use envelope::EnvelopeBuilder;
pub use extractor::{appointment_id, extract, ExtractedResponse, FlatRecord, XmlNode};
pub use schema::{BodyLayout, FieldKind, FieldSpec, IdSuffix, Procedure, ProcedureSchema};
pub use values::{FieldMap, FieldValue};
