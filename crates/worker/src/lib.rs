//! Background worker for the user import service.
//!
//! A single long-running task drains the upload event queue:
//! 1. Parse the stored CSV
//! 2. Upsert valid users into the record store
//! 3. Delete the source file, whatever happened before
//! 4. Repeat

pub mod ingestion;
pub mod scheduler;

pub use ingestion::*;
pub use scheduler::*;
