//! HTTP API module.
//!
//! The axum server, its request/response types, and the log broadcaster
//! behind `/api/logs`.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{build_router, start_server, AppState};
pub use types::*;
