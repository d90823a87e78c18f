//! Hand-authored fallback catalog, shown until a live fetch succeeds.

use crate::api::logs::log_error;
use crate::models::CatalogData;

/// Embedded at build time so the fallback cannot go missing at run time.
const FALLBACK_JSON: &str = include_str!("../../fixtures/fallback.json");

/// Parse the embedded fallback catalog.
///
/// A broken fixture is logged and degrades to an empty catalog rather than
/// taking the service down.
pub fn fallback_catalog() -> CatalogData {
    match serde_json::from_str::<CatalogData>(FALLBACK_JSON) {
        Ok(data) => data,
        Err(e) => {
            log_error(format!("Fallback catalog is invalid: {}", e));
            CatalogData::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_parses() {
        let data = fallback_catalog();
        assert_eq!(data.courses.len(), 6);
        assert_eq!(data.reviews.len(), 4);
        assert!(data.ingested_at.is_none());
    }

    #[test]
    fn test_fallback_reviews_point_at_courses() {
        let data = fallback_catalog();
        for review in &data.reviews {
            assert!(data.course(&review.course_id).is_some(), "{}", review.id);
        }
        assert_eq!(data.reviews_for("2").len(), 2);
    }
}
