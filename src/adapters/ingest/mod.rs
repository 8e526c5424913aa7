//! Ingestion boundary.
//!
//! Turns `.csv` / `.json` files into a [`Dataset`](crate::domain::Dataset)
//! and generates deterministic demo data. Unsupported extensions are
//! rejected here, before anything reaches the controller.

mod file_loader;
mod synthetic;

pub use file_loader::{load_dataset, parse_csv, parse_json, IngestError};
pub use synthetic::{synthetic_dataset, SYNTHETIC_HEADERS};
