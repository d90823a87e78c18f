//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first when
//! present) with compiled defaults for everything but the AI key.
//!
//! | Variable | Default |
//! |---|---|
//! | `COURSEPILOT_SHEET_URL` | the published review sheet |
//! | `COURSEPILOT_SHEET_FILE` | unset (use the URL) |
//! | `COURSEPILOT_FORM_URL` | the review form |
//! | `COURSEPILOT_PORT` | `3000` |
//! | `COURSEPILOT_FIELDS` | unset (built-in field map) |
//! | `GEMINI_API_KEY` / `API_KEY` | unset (AI disabled) |
//! | `COURSEPILOT_AI_MODEL` | `gemini-3-flash-preview` |

use std::path::PathBuf;
use std::sync::Arc;

use crate::ai::{AiClient, CourseAdvisor, DEFAULT_MODEL};
use crate::api::logs::log_warning;
use crate::error::{ConfigError, ConfigResult};
use crate::source::{FileSheetSource, HttpSheetSource, SheetSource};
use crate::transform::FieldMap;

/// Published CSV export of the review responses sheet.
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRYOX-ShsAwxP5tYCuY5zHSGs1CFI8Zb7etmYZzHOWdnqxPGfMCapy6vyliFGNRlpfs0IROPxjJBxCr/pub?output=csv";

/// External form where students submit reviews.
pub const DEFAULT_FORM_URL: &str = "https://forms.gle/zd6nTbFLMtp8dofd7";

pub const DEFAULT_PORT: u16 = 3000;

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sheet_url: String,
    /// Local export used instead of the URL when set.
    pub sheet_file: Option<PathBuf>,
    pub form_url: String,
    pub port: u16,
    /// JSON field map overriding the built-in one.
    pub fields_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub ai_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            sheet_file: None,
            form_url: DEFAULT_FORM_URL.to_string(),
            port: DEFAULT_PORT,
            fields_path: None,
            api_key: None,
            ai_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("COURSEPILOT_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
                name: "COURSEPILOT_PORT".to_string(),
                value,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            sheet_url: get("COURSEPILOT_SHEET_URL").unwrap_or(defaults.sheet_url),
            sheet_file: get("COURSEPILOT_SHEET_FILE").map(PathBuf::from),
            form_url: get("COURSEPILOT_FORM_URL").unwrap_or(defaults.form_url),
            port,
            fields_path: get("COURSEPILOT_FIELDS").map(PathBuf::from),
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            ai_model: get("COURSEPILOT_AI_MODEL").unwrap_or(defaults.ai_model),
        })
    }

    /// The configured field map, or the built-in one.
    pub fn field_map(&self) -> ConfigResult<FieldMap> {
        match &self.fields_path {
            Some(path) => FieldMap::from_file(path),
            None => Ok(FieldMap::builtin()),
        }
    }

    /// Local export file if configured, else the published sheet.
    pub fn sheet_source(&self) -> Arc<dyn SheetSource> {
        match &self.sheet_file {
            Some(path) => Arc::new(FileSheetSource::new(path)),
            None => Arc::new(HttpSheetSource::new(&self.sheet_url)),
        }
    }

    /// Advisor backed by Gemini, or a disabled one without a key.
    pub fn advisor(&self) -> CourseAdvisor {
        match AiClient::from_key(self.api_key.as_deref(), &self.ai_model) {
            Ok(client) => CourseAdvisor::from_client(Some(client)),
            Err(e) => {
                log_warning(format!("{}; AI summaries disabled", e));
                CourseAdvisor::default()
            }
        }
    }
}
