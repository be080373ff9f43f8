//! Record storage for the dojo.
//!
//! This module provides the persisted record set and the stores that hold
//! it: file-based for the CLI and in-memory for tests.

pub mod file;
pub mod memory;
pub mod records;
pub mod traits;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;
pub use records::{RaiseOutcome, Records, RECORDS_SCHEMA_VERSION};
pub use traits::RecordStore;
