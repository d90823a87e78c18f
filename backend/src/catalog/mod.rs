//! Course catalog: live ingestion, the current snapshot, and queries over it.
//!
//! - [`CatalogService`] - One fetch-and-ingest run, empty on failure
//! - [`CatalogStore`] - Owned current snapshot with guarded refresh
//! - [`CourseQuery`] - Search, department filter and sort
//! - [`fallback_catalog`] - Embedded catalog shown before the first live load

pub mod fixture;
pub mod query;
pub mod service;
pub mod store;

pub use fixture::fallback_catalog;
pub use query::{departments, CourseQuery, SortKey};
pub use service::CatalogService;
pub use store::{CatalogSnapshot, CatalogStore, RefreshOutcome, SnapshotOrigin};
