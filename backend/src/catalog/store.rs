//! The process-wide current catalog.
//!
//! One owned snapshot, replaced wholesale on a successful refresh and kept
//! as-is otherwise. Readers get an `Arc` to an immutable snapshot, so a
//! refresh never tears a response in half.
//!
//! ```text
//!            refresh()                     fetch_live()
//! Fixture ─────────────▶ [refreshing] ──────────────────▶ ≥1 course ──▶ Live (replaced)
//!    ▲                        │                            0 courses ──▶ unchanged
//!    │                        └─ refresh() again ─▶ AlreadyRunning
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::fixture::fallback_catalog;
use super::service::CatalogService;
use crate::api::logs::{log_info, log_success, log_warning};
use crate::models::CatalogData;
use crate::transform::{Clock, SystemClock};

/// Where the current snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotOrigin {
    Fixture,
    Live,
}

/// An immutable catalog version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub id: String,
    pub origin: SnapshotOrigin,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: CatalogData,
}

impl CatalogSnapshot {
    fn new(origin: SnapshotOrigin, data: CatalogData, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            origin,
            updated_at,
            data,
        }
    }
}

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RefreshOutcome {
    /// Another refresh was in flight; this one did nothing.
    AlreadyRunning,
    /// The live sheet replaced the catalog.
    Updated { courses: usize, reviews: usize },
    /// The fetch failed or produced no courses; the catalog is unchanged.
    Retained,
}

/// Owns the current snapshot and serializes refreshes.
pub struct CatalogStore<C: Clock = SystemClock> {
    service: CatalogService<C>,
    current: RwLock<Arc<CatalogSnapshot>>,
    refreshing: AtomicBool,
}

impl<C: Clock> CatalogStore<C> {
    /// Store seeded with the fallback fixture.
    pub fn new(service: CatalogService<C>) -> Self {
        Self::with_initial(service, SnapshotOrigin::Fixture, fallback_catalog())
    }

    pub fn with_initial(service: CatalogService<C>, origin: SnapshotOrigin, data: CatalogData) -> Self {
        let snapshot = CatalogSnapshot::new(origin, data, service.now());
        Self {
            service,
            current: RwLock::new(Arc::new(snapshot)),
            refreshing: AtomicBool::new(false),
        }
    }

    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Re-ingest the live sheet; replace the snapshot only if it produced at
    /// least one course. Overlapping calls are ignored.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log_warning("Refresh already in progress, ignoring request");
            return RefreshOutcome::AlreadyRunning;
        }
        let _guard = RefreshGuard(&self.refreshing);

        let data = self.service.fetch_live().await;

        if data.courses.is_empty() {
            let kept = self.snapshot().await;
            log_info(format!(
                "No live courses, keeping {} catalog ({} courses)",
                match kept.origin {
                    SnapshotOrigin::Fixture => "fallback",
                    SnapshotOrigin::Live => "previous live",
                },
                kept.data.courses.len()
            ));
            return RefreshOutcome::Retained;
        }

        let outcome = RefreshOutcome::Updated {
            courses: data.courses.len(),
            reviews: data.reviews.len(),
        };
        let updated_at = data.ingested_at.unwrap_or_else(|| self.service.now());
        let snapshot = CatalogSnapshot::new(SnapshotOrigin::Live, data, updated_at);

        *self.current.write().await = Arc::new(snapshot);
        log_success("Catalog updated from live sheet");

        outcome
    }
}

/// Clears the in-flight flag however the refresh ends.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, SourceResult};
    use crate::source::SheetSource;
    use crate::transform::{FieldMap, FixedClock, RecordMapper};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Serves queued answers in order; waits on `gate` first when set.
    struct ScriptedSource {
        answers: Mutex<Vec<SourceResult<String>>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSource {
        fn new(answers: Vec<SourceResult<String>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl SheetSource for ScriptedSource {
        async fn fetch(&self) -> SourceResult<String> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                return Err(SourceError::Status(503));
            }
            answers.remove(0)
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    const SHEET: &str = "Course,Department,Rating\nCS101,CS,5\nCS101,,3\nOptics,,4\n";

    fn store(source: ScriptedSource) -> CatalogStore<FixedClock> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());
        let service = CatalogService::new(
            Arc::new(source),
            RecordMapper::with_clock(FieldMap::builtin(), clock),
        );
        CatalogStore::new(service)
    }

    #[tokio::test]
    async fn test_starts_with_fixture() {
        let store = store(ScriptedSource::new(vec![]));
        let snapshot = store.snapshot().await;

        assert_eq!(snapshot.origin, SnapshotOrigin::Fixture);
        assert_eq!(snapshot.data.courses.len(), 6);
        assert!(!store.is_refreshing());
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces() {
        let store = store(ScriptedSource::new(vec![Ok(SHEET.to_string())]));
        let before = store.snapshot().await;

        let outcome = store.refresh().await;
        assert_eq!(outcome, RefreshOutcome::Updated { courses: 2, reviews: 3 });

        let after = store.snapshot().await;
        assert_eq!(after.origin, SnapshotOrigin::Live);
        assert_ne!(after.id, before.id);
        assert_eq!(after.data.courses[0].name, "CS101");
        // Readers holding the old snapshot are unaffected
        assert_eq!(before.data.courses.len(), 6);
    }

    #[tokio::test]
    async fn test_failed_refresh_retains_fixture() {
        let store = store(ScriptedSource::new(vec![Err(SourceError::Request(
            "dns".to_string(),
        ))]));
        let before = store.snapshot().await;

        assert_eq!(store.refresh().await, RefreshOutcome::Retained);
        let after = store.snapshot().await;
        assert_eq!(after.id, before.id);
        assert_eq!(after.origin, SnapshotOrigin::Fixture);
        assert!(!store.is_refreshing());
    }

    #[tokio::test]
    async fn test_empty_sheet_retains_previous_live() {
        let store = store(ScriptedSource::new(vec![
            Ok(SHEET.to_string()),
            Ok("Course,Rating\n".to_string()),
        ]));

        store.refresh().await;
        let live = store.snapshot().await;

        assert_eq!(store.refresh().await, RefreshOutcome::Retained);
        assert_eq!(store.snapshot().await.id, live.id);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_ignored() {
        let gate = Arc::new(Notify::new());
        let mut source = ScriptedSource::new(vec![Ok(SHEET.to_string())]);
        source.gate = Some(Arc::clone(&gate));
        let store = Arc::new(store(source));

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        });

        while !store.is_refreshing() {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.refresh().await, RefreshOutcome::AlreadyRunning);

        gate.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, RefreshOutcome::Updated { .. }));
        assert!(!store.is_refreshing());
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(RefreshOutcome::Updated { courses: 2, reviews: 3 }).unwrap();
        assert_eq!(json["outcome"], "updated");
        assert_eq!(json["courses"], 2);
        assert_eq!(
            serde_json::to_value(RefreshOutcome::AlreadyRunning).unwrap()["outcome"],
            "alreadyRunning"
        );
    }
}
