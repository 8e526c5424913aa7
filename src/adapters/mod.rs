//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `ai` - Generative model providers and the model-backed insight gateway
//! - `storage` - Key-value persistence (file, in-memory)
//! - `ingest` - CSV/JSON file boundary and demo data

pub mod ai;
pub mod ingest;
pub mod storage;
