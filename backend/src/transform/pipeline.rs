//! High-level ingestion API: export text → reviews → courses.
//!
//! # Example
//!
//! ```rust,ignore
//! use coursepilot::transform::{ingest_file, RecordMapper};
//!
//! let result = ingest_file("responses.csv", &RecordMapper::default())?;
//! println!("{} courses", result.data.courses.len());
//! ```

use serde::Serialize;
use std::path::Path;

use super::grouper::aggregate;
use super::mapper::{Clock, RecordMapper};
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::SourceResult;
use crate::models::CatalogData;
use crate::parser::{decode_bytes, read_export_file, DecodedText, ParsedSheet};

/// What the ingestion saw in the export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub encoding: String,
    pub headers: Vec<String>,
    /// Data rows after blank-line removal.
    pub row_count: usize,
    /// Rows dropped for lacking a course name.
    pub discarded: usize,
}

/// Catalog plus sheet metadata.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub data: CatalogData,
    pub info: SheetInfo,
}

/// Run the whole pipeline over already-decoded export text.
///
/// Never fails: an export with fewer than two records yields an empty
/// catalog.
pub fn ingest_text<C: Clock>(text: &str, mapper: &RecordMapper<C>) -> CatalogData {
    ingest_decoded(
        DecodedText {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
        },
        mapper,
    )
    .data
}

/// Run the pipeline over raw export bytes (encoding auto-detected).
pub fn ingest_bytes<C: Clock>(bytes: &[u8], mapper: &RecordMapper<C>) -> IngestResult {
    ingest_decoded(decode_bytes(bytes), mapper)
}

/// Run the pipeline over a local export file.
pub fn ingest_file<C: Clock, P: AsRef<Path>>(
    path: P,
    mapper: &RecordMapper<C>,
) -> SourceResult<IngestResult> {
    log_info(format!("📖 Reading export file: {}", path.as_ref().display()));
    let decoded = read_export_file(path)?;
    Ok(ingest_decoded(decoded, mapper))
}

fn ingest_decoded<C: Clock>(decoded: DecodedText, mapper: &RecordMapper<C>) -> IngestResult {
    let sheet = ParsedSheet::parse(&decoded.text);

    let mut info = SheetInfo {
        encoding: decoded.encoding,
        headers: sheet.headers().to_vec(),
        row_count: sheet.len(),
        discarded: 0,
    };

    if sheet.is_empty() {
        log_warning("Export has no data rows");
        return IngestResult {
            data: CatalogData::empty(),
            info,
        };
    }

    log_success(format!("Read {} rows, {} columns", sheet.len(), info.headers.len()));
    log_info_indent(format!("Encoding: {}", info.encoding), 1);

    let ingested_at = mapper.now();
    let reviews = mapper.map_sheet(&sheet, ingested_at);
    let mapped = reviews.len();

    let (courses, reviews) = aggregate(reviews);
    info.discarded = mapped - reviews.len();
    if info.discarded > 0 {
        log_warning(format!("{} rows without a course name skipped", info.discarded));
    }
    log_success(format!("{} reviews across {} courses", reviews.len(), courses.len()));

    IngestResult {
        data: CatalogData {
            courses,
            reviews,
            ingested_at: Some(ingested_at),
        },
        info,
    }
}
