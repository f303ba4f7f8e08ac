//! Domain-level constants shared by the adapter crates.

/// Default element namespace of the practice-management schema.
pub const DEFAULT_SCHEMA_NAMESPACE: &str = "http://www.kareo.com/api/schemas/";

/// Outer envelope namespace.
pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace used for scalar collection items (`<arr:long>`, `<arr:string>`).
pub const ARRAYS_NAMESPACE: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";

/// Messages the appointment service returns when the payload does not match
/// the schema generation it enforces. Compared exactly after trimming.
pub const SCHEMA_TRANSLATION_FAILURES: &[&str] = &[
    "Error translating AppointmentCreate to CreateAppointmentV3Request",
    "Error translating AppointmentCreate to CreateAppointmentV2Request",
];

/// Placeholder written wherever a credential value would otherwise be logged.
pub const REDACTED: &str = "***";

// Throttling defaults (milliseconds unless noted)
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_CALL_DELAY_MS: u64 = 250;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 1_000;
pub const DEFAULT_POST_LISTING_DELAY_MS: u64 = 500;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound for response bodies echoed into debug logs.
pub const MAX_LOGGED_BODY_CHARS: usize = 4_000;
