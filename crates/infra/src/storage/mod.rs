//! Document metadata storage.

pub mod memory;

pub use memory::InMemoryDocumentStore;
