//! Referrer-level sales totals

use serde::Serialize;
use std::collections::HashMap;

use crate::record::SalesRecord;

/// One row of the referrer ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry {
    pub referrer_key: String,
    pub total_amount: f64,
    pub record_count: usize,
}

/// Total sales per referrer, largest first.
///
/// Referrers with equal totals stay in the order they were first seen.
pub fn aggregate(records: &[SalesRecord]) -> Vec<AggregateEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<AggregateEntry> = Vec::new();

    for record in records {
        let key = record.referrer_key();
        let slot = *index.entry(key).or_insert_with(|| {
            entries.push(AggregateEntry {
                referrer_key: key.to_string(),
                total_amount: 0.0,
                record_count: 0,
            });
            entries.len() - 1
        });

        let entry = &mut entries[slot];
        entry.total_amount += record.amount();
        entry.record_count += 1;
    }

    // sort_by is stable, so ties keep first-seen order
    entries.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    entries
}

/// Sum of every record's amount
pub fn grand_total(records: &[SalesRecord]) -> f64 {
    records.iter().map(SalesRecord::amount).sum()
}
