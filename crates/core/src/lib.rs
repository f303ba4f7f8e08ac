//! # PracticeBridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The appointment-creation state machine and its payload variants
//! - Appointment-reason resolution
//! - The batch throttling policy
//!
//! ## Architecture Principles
//! - Only depends on `practicebridge-domain`
//! - No HTTP or markup code
//! - All external dependencies via traits

pub mod appointments;
pub mod batch;
pub mod ports;

pub use appointments::{
    AppointmentCreation, AppointmentPayload, ClientMode, CreationOrchestrator, CreationStrategy,
    PayloadVariant, ReasonDefaults, RegionOverrides, TypedFallback, VariantExecutor,
};
pub use batch::{fetch_in_batches, BatchPolicy, BatchReport};
pub use ports::{DocumentMetadataStore, PracticeManagement, ReasonDirectory};
