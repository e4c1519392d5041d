//! Media sales engine
//!
//! Turns the loosely-typed rows of the sales sheet into filter options, a
//! filtered record list and a per-referrer ranking. Every operation is a
//! pure function of its inputs; callers recompute whenever the records or
//! the selections change.

pub mod aggregate;
pub mod error;
pub mod facets;
pub mod filter;
pub mod month;
pub mod record;
pub mod view;

pub use aggregate::{aggregate, grand_total, AggregateEntry};
pub use error::{MonthKeyError, RecordError};
pub use facets::{extract_facets, FacetOptions, Facets};
pub use filter::{filter, FilterCriteria, MonthFloor, RecordPredicate};
pub use month::{normalize, normalize_str, DateLike, MonthKey, NormalizedMonth};
pub use record::{
    coerce_amount, parse_records, parse_utc_offset, FieldNames, ParsedRecords, RecordSchema,
    SalesRecord, UNRECORDED_REFERRER,
};
pub use view::{SalesView, ViewOptions};
