//! Error types for the CoursePilot catalog.
//!
//! - [`SourceError`] - Spreadsheet export fetch errors
//! - [`AiError`] - Text-generation client errors
//! - [`ConfigError`] - Environment and field-map configuration errors
//! - [`CatalogError`] - Top-level errors surfaced by the CLI
//! - [`ServerError`] - HTTP server errors
//!
//! Ingestion itself never fails: the catalog service logs a [`SourceError`]
//! and answers with an empty catalog. The other types only reach callers
//! that explicitly ask for them.

use thiserror::Error;

// =============================================================================
// Spreadsheet Source Errors
// =============================================================================

/// Errors while fetching the published spreadsheet export.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (DNS, connect, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Sheet fetch failed with status {0}")]
    Status(u16),

    /// The body could not be read.
    #[error("Failed to read sheet body: {0}")]
    Body(String),

    /// Local export file could not be read.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// AI Client Errors
// =============================================================================

/// Errors from the text-generation collaborator.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured.
    #[error("Missing API key: set GEMINI_API_KEY or API_KEY")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// The API answered with an error payload or status.
    #[error("API error: {0}")]
    ApiError(String),

    /// The response body was not the expected JSON.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },

    /// Field map file could not be read.
    #[error("Failed to read field map: {0}")]
    Io(#[from] std::io::Error),

    /// Field map file is not valid JSON for a field map.
    #[error("Invalid field map: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Catalog Errors (top-level)
// =============================================================================

/// Top-level errors for CLI commands.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Spreadsheet source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// AI error.
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Export serialization error.
    #[error("Export error: {0}")]
    Export(String),

    /// Requested course is not in the catalog.
    #[error("Course not found: {0}")]
    CourseNotFound(String),
}

impl From<csv::Error> for CatalogError {
    fn from(e: csv::Error) -> Self {
        CatalogError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Export(e.to_string())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error at start-up.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for spreadsheet source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CLI-level catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
