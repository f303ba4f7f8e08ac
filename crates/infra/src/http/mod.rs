//! HTTP transport for the practice-management endpoint.

pub mod client;

pub use client::{SoapTransport, SoapTransportBuilder};
