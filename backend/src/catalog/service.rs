//! Catalog service: fetch the live sheet and turn it into a catalog.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::api::logs::{log_error, log_info};
use crate::models::CatalogData;
use crate::source::SheetSource;
use crate::transform::{ingest_text, Clock, RecordMapper, SystemClock};

/// Fetch → tokenize → map → aggregate.
pub struct CatalogService<C: Clock = SystemClock> {
    source: Arc<dyn SheetSource>,
    mapper: RecordMapper<C>,
}

impl CatalogService<SystemClock> {
    /// Service with the built-in field map and the wall clock.
    pub fn with_source(source: Arc<dyn SheetSource>) -> Self {
        Self::new(source, RecordMapper::default())
    }
}

impl<C: Clock> CatalogService<C> {
    pub fn new(source: Arc<dyn SheetSource>, mapper: RecordMapper<C>) -> Self {
        Self { source, mapper }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.mapper.now()
    }

    /// One ingestion run. Never fails: any fetch error is logged and yields
    /// an empty catalog, leaving the fallback decision to the caller.
    pub async fn fetch_live(&self) -> CatalogData {
        log_info(format!("🌐 Fetching review sheet: {}", self.source.describe()));

        match self.source.fetch().await {
            Ok(text) => ingest_text(&text, &self.mapper),
            Err(e) => {
                log_error(format!("Error loading live reviews: {}", e));
                CatalogData::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, SourceResult};
    use crate::transform::{FieldMap, FixedClock};
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct StaticSource(&'static str);

    #[async_trait]
    impl SheetSource for StaticSource {
        async fn fetch(&self) -> SourceResult<String> {
            Ok(self.0.to_string())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct DownSource;

    #[async_trait]
    impl SheetSource for DownSource {
        async fn fetch(&self) -> SourceResult<String> {
            Err(SourceError::Request("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "down".to_string()
        }
    }

    fn service(source: Arc<dyn SheetSource>) -> CatalogService<FixedClock> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());
        CatalogService::new(source, RecordMapper::with_clock(FieldMap::builtin(), clock))
    }

    #[tokio::test]
    async fn test_fetch_live_ingests() {
        let svc = service(Arc::new(StaticSource("Course,Department,Rating\nCS101,CS,5\nCS101,,3\n")));
        let data = svc.fetch_live().await;

        assert_eq!(data.courses.len(), 1);
        assert_eq!(data.courses[0].department, "CSE");
        assert_eq!(data.ingested_at, Some(svc.now()));
    }

    #[tokio::test]
    async fn test_network_error_yields_empty() {
        let data = service(Arc::new(DownSource)).fetch_live().await;
        assert!(data.courses.is_empty());
        assert!(data.reviews.is_empty());
    }

    #[tokio::test]
    async fn test_sparse_sheet_yields_empty() {
        let data = service(Arc::new(StaticSource("Course,Rating\n"))).fetch_live().await;
        assert!(data.is_empty());
    }
}
