//! Storage for the user import service.
//!
//! - [`StorageGateway`]: raw uploads on the local filesystem
//! - [`RecordStore`]: validated user records, in memory

pub mod config;
pub mod gateway;
pub mod health;
pub mod records;

pub use config::*;
pub use gateway::*;
pub use records::*;
