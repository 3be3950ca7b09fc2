//! HTTP API layer for the user import service.
//!
//! Thin glue over the core: multipart intake feeding [`UploadService`],
//! read-only user reporting, health and metrics.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;
pub mod upload;

pub use routes::router;
pub use state::AppState;
pub use upload::UploadService;
