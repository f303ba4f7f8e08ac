//! # PracticeBridge Domain
//!
//! Business domain types for the practice-management integration.
//!
//! This crate contains:
//! - Normalized domain records (Patient, Appointment, Practice, Provider,
//!   Reason, Document)
//! - Domain error types and Result definitions
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other PracticeBridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
