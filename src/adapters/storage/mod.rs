//! Storage Adapters
//!
//! Implementations of the AccountDocumentStore port.
//!
//! ## Available Adapters
//!
//! - **JsonFileStore** - The roster as one JSON document on disk
//! - **InMemoryDocumentStore** - The roster in memory (testing)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryDocumentStore, JsonFileStore};
//!
//! // Production: file-based storage
//! let store = JsonFileStore::new("./accounts.json");
//!
//! // Testing: in-memory storage
//! let store = InMemoryDocumentStore::new();
//! ```

mod in_memory_store;
mod json_file_store;

pub use in_memory_store::InMemoryDocumentStore;
pub use json_file_store::JsonFileStore;
