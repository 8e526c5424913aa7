//! Storage Adapters
//!
//! Implementations of the KeyValueStore port for persisting dashboard state.
//!
//! ## Available Adapters
//!
//! - **FileKeyValueStore** - One JSON file per entry on disk
//! - **InMemoryKeyValueStore** - Stores entries in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
//!
//! let store = FileKeyValueStore::new("./data");
//! let store = InMemoryKeyValueStore::new();
//! ```

mod file_key_value_store;
mod in_memory_key_value_store;

pub use file_key_value_store::FileKeyValueStore;
pub use in_memory_key_value_store::InMemoryKeyValueStore;
