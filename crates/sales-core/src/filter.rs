//! Record filtering
//!
//! User selections and deployment-wide restrictions are both expressed as
//! [`RecordPredicate`]s and combined with tuples, so a standing month floor
//! can sit under whatever the operator picked without either knowing about
//! the other.

use serde::{Deserialize, Serialize};

use crate::month::{MonthKey, NormalizedMonth};
use crate::record::SalesRecord;

/// Anything that can accept or reject a record
pub trait RecordPredicate {
    fn matches(&self, record: &SalesRecord) -> bool;
}

/// Operator selections. `None` in a field means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub month: Option<MonthKey>,
    pub store: Option<String>,
    /// Matched against the referrer key, so the unrecorded sentinel selects
    /// records without a referrer.
    pub referrer: Option<String>,
}

impl FilterCriteria {
    /// Criteria that match every record
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_any(&self) -> bool {
        self.month.is_none() && self.store.is_none() && self.referrer.is_none()
    }
}

impl RecordPredicate for FilterCriteria {
    fn matches(&self, record: &SalesRecord) -> bool {
        let month_ok = self
            .month
            .as_ref()
            .is_none_or(|month| record.month().key() == Some(month));
        let store_ok = self
            .store
            .as_deref()
            .is_none_or(|store| record.store_name.as_deref() == Some(store));
        let referrer_ok = self
            .referrer
            .as_deref()
            .is_none_or(|referrer| record.referrer_key() == referrer);

        month_ok && store_ok && referrer_ok
    }
}

/// Standing restriction to records dated in or after a month.
///
/// Records whose month cannot be read do not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFloor(pub MonthKey);

impl MonthFloor {
    pub fn admits(&self, month: &NormalizedMonth) -> bool {
        month.key().is_some_and(|key| key >= &self.0)
    }
}

impl RecordPredicate for MonthFloor {
    fn matches(&self, record: &SalesRecord) -> bool {
        self.admits(&record.month())
    }
}

/// An absent predicate accepts everything
impl<P: RecordPredicate> RecordPredicate for Option<P> {
    fn matches(&self, record: &SalesRecord) -> bool {
        self.as_ref().is_none_or(|p| p.matches(record))
    }
}

impl<P: RecordPredicate + ?Sized> RecordPredicate for &P {
    fn matches(&self, record: &SalesRecord) -> bool {
        (**self).matches(record)
    }
}

/// Both predicates must accept
impl<A: RecordPredicate, B: RecordPredicate> RecordPredicate for (A, B) {
    fn matches(&self, record: &SalesRecord) -> bool {
        self.0.matches(record) && self.1.matches(record)
    }
}

/// Records accepted by `predicate`, in their original order.
pub fn filter<P: RecordPredicate + ?Sized>(records: &[SalesRecord], predicate: &P) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|record| predicate.matches(record))
        .cloned()
        .collect()
}
