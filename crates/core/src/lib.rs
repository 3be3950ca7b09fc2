//! Core types, CSV parsing, and validation for the user import service.

pub mod error;
pub mod event;
pub mod limits;
pub mod parser;
pub mod user;

pub use error::{Error, Result};
pub use event::*;
pub use parser::*;
pub use user::*;
