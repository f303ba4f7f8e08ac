//! Appointment creation: payload variants, reason resolution and the
//! retry/fallback state machine.

pub mod orchestrator;
pub mod reason;
pub mod variants;

pub use orchestrator::{
    is_schema_translation_failure, AppointmentCreation, ClientMode, CreationOrchestrator,
    CreationStrategy, Transition, TypedFallback, VariantExecutor,
};
pub use reason::{resolve_reason, ReasonDefaults, ReasonSource, ResolvedReason};
pub use variants::{AppointmentPayload, PayloadVariant, RegionOverrides};
