//! Configuration loading and management
//!
//! This module provides utilities for loading adapter configuration
//! from environment variables and files.

pub mod loader;
pub mod settings;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
pub use settings::{AdapterConfig, DebugToggles, RawConfig, RawRegion};
