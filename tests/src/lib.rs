//! Shared harness for the user import integration tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
