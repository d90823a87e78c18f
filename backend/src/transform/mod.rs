//! Transformation module.
//!
//! This module turns parsed sheet rows into the course catalog:
//! - Fields: field map (which title fragments feed which field)
//! - Resolver: fuzzy column lookup
//! - Canon: department and year-of-study canonicalization
//! - Mapper: rows to reviews
//! - Grouper: reviews to courses
//! - Pipeline: the whole chain over text, bytes or a file

pub mod canon;
pub mod fields;
pub mod grouper;
pub mod mapper;
pub mod pipeline;
pub mod resolver;

pub use canon::{canonical_department, validate_year};
pub use fields::{Field, FieldMap, FieldSpec};
pub use grouper::{aggregate, reviews_to_courses};
pub use mapper::{parse_rating, Clock, FixedClock, RecordMapper, SystemClock};
pub use pipeline::*;
pub use resolver::{normalize, FieldResolver, MatchStrategy};
