//! # CoursePilot - elective course catalog from student reviews
//!
//! CoursePilot turns the free-form responses of a course-review form,
//! published as a spreadsheet export, into a typed catalog of courses and
//! reviews, and serves it with search, sorting and AI summaries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Sheet (CSV) │────▶│   Parser    │────▶│  Transform  │────▶│   Catalog   │
//! │ HTTP / file │     │ (auto-enc)  │     │ (fuzzy map) │     │ (snapshot)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                              ┌─────────────┐       ▼
//!                                              │ AI advisor  │◀── HTTP API
//!                                              └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coursepilot::{ingest_file, RecordMapper};
//!
//! let result = ingest_file("responses.csv", &RecordMapper::default())?;
//! for course in &result.data.courses {
//!     println!("{} {:.1}", course.name, course.average_rating);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`models`] - Domain models (ReviewEntry, CourseEntry, CatalogData)
//! - [`parser`] - Tokenizer, header index and decoding
//! - [`transform`] - Field resolution, canonicalization, grouping, pipeline
//! - [`source`] - Spreadsheet export sources
//! - [`catalog`] - Catalog service, snapshot store and queries
//! - [`ai`] - AI summaries and Q&A
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Sources and catalog
pub mod catalog;
pub mod source;

// AI
pub mod ai;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AiError, CatalogError, ConfigError, ServerError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CatalogData, CourseEntry, ReviewEntry, TimestampSource};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_bytes, detect_encoding, tokenize, HeaderIndex, ParsedSheet, SheetRow};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    canonical_department, ingest_bytes, ingest_file, ingest_text, validate_year, Clock, Field,
    FieldMap, FieldResolver, FixedClock, IngestResult, MatchStrategy, RecordMapper, SheetInfo,
    SystemClock,
};

// =============================================================================
// Re-exports - Catalog
// =============================================================================

pub use catalog::{CatalogService, CatalogStore, CourseQuery, RefreshOutcome, SortKey};
pub use source::{FileSheetSource, HttpSheetSource, SheetSource};

// =============================================================================
// Re-exports - AI / API
// =============================================================================

pub use ai::{AiClient, CourseAdvisor, TextGenerator};
pub use config::AppConfig;

// Server
pub mod server {
    pub use crate::api::server::{build_router, start_server, AppState};
}
