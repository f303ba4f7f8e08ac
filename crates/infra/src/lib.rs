//! # PracticeBridge Infrastructure
//!
//! The practice-management protocol adapter and its I/O.
//!
//! This crate contains:
//! - Procedure schemas, envelope construction and credential injection
//! - The HTTP transport and response classification
//! - Response extraction and normalization to domain records
//! - `PmAdapter`, the concrete `PracticeManagement` implementation
//! - An in-memory document metadata store
//! - Configuration loading and tracing initialization
//!
//! ## Architecture
//! - Implements traits defined in `practicebridge-core`
//! - Depends on `practicebridge-domain` and `practicebridge-core`
//! - Contains all "impure" code (network, environment, files)

pub mod adapter;
pub mod config;
pub mod errors;
pub mod http;
pub mod normalize;
pub mod observability;
pub mod protocol;
pub mod storage;

// Re-export commonly used items
pub use adapter::{CreatedAppointment, PmAdapter};
pub use config::AdapterConfig;
pub use errors::InfraError;
pub use http::SoapTransport;
pub use observability::{init_tracing, LoggingConfig};
pub use protocol::{Credential, Secret};
pub use storage::InMemoryDocumentStore;
