//! Selectable values for each filter dimension

use serde::Serialize;
use std::collections::BTreeSet;

use crate::filter::MonthFloor;
use crate::month::MonthKey;
use crate::record::{SalesRecord, UNRECORDED_REFERRER};

#[derive(Debug, Clone)]
pub struct FacetOptions {
    /// Hide months before this one
    pub window_start: Option<MonthKey>,
    /// List the unrecorded sentinel among the referrers
    pub include_unrecorded_referrer: bool,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            window_start: None,
            include_unrecorded_referrer: true,
        }
    }
}

/// Sorted, deduplicated option lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub months: Vec<MonthKey>,
    pub stores: Vec<String>,
    pub referrers: Vec<String>,
}

pub fn extract_facets(records: &[SalesRecord], options: &FacetOptions) -> Facets {
    let floor = options.window_start.clone().map(MonthFloor);

    let mut months = BTreeSet::new();
    let mut stores = BTreeSet::new();
    let mut referrers = BTreeSet::new();

    for record in records {
        let month = record.month();
        if floor.as_ref().is_none_or(|f| f.admits(&month)) {
            months.extend(month.into_key());
        }

        if let Some(store) = &record.store_name {
            stores.insert(store.as_str());
        }

        let referrer = record.referrer_key();
        if options.include_unrecorded_referrer || record.referrer.is_some() {
            referrers.insert(referrer);
        }
    }

    Facets {
        months: months.into_iter().collect(),
        stores: stores.into_iter().map(str::to_string).collect(),
        referrers: referrers.into_iter().map(str::to_string).collect(),
    }
}
