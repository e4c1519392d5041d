//! Everything a screen or report needs, recomputed from scratch

use crate::aggregate::{aggregate, grand_total, AggregateEntry};
use crate::facets::{extract_facets, FacetOptions, Facets};
use crate::filter::{filter, FilterCriteria, MonthFloor};
use crate::month::MonthKey;
use crate::record::SalesRecord;

/// Per-deployment behavior
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Ignore records before this month, both in the month list and in results
    pub month_floor: Option<MonthKey>,
    pub include_unrecorded_referrer: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            month_floor: None,
            include_unrecorded_referrer: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SalesView {
    pub facets: Facets,
    pub filtered: Vec<SalesRecord>,
    pub summary: Vec<AggregateEntry>,
    /// Sum over `filtered`
    pub grand_total: f64,
}

impl SalesView {
    pub fn build(records: &[SalesRecord], criteria: &FilterCriteria, options: &ViewOptions) -> Self {
        let facets = extract_facets(
            records,
            &FacetOptions {
                window_start: options.month_floor.clone(),
                include_unrecorded_referrer: options.include_unrecorded_referrer,
            },
        );

        let floor = options.month_floor.clone().map(MonthFloor);
        let filtered = filter(records, &(floor, criteria));
        let summary = aggregate(&filtered);
        let grand_total = grand_total(&filtered);

        Self {
            facets,
            filtered,
            summary,
            grand_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::DateLike;

    fn record(date: &str, referrer: &str, sales: f64) -> SalesRecord {
        SalesRecord {
            contract_date: DateLike::Text(date.to_string()),
            referrer: Some(referrer.to_string()),
            store_name: Some("A店".to_string()),
            total_sales: Some(sales),
        }
    }

    #[test]
    fn test_floor_applies_to_results_and_months() {
        let records = vec![
            record("2025/05/31", "甲", 100.0),
            record("2025/06/01", "乙", 200.0),
            record("2025/07/01", "甲", 300.0),
        ];
        let options = ViewOptions {
            month_floor: Some("2025-06".parse().unwrap()),
            ..Default::default()
        };
        let view = SalesView::build(&records, &FilterCriteria::any(), &options);

        assert_eq!(view.facets.months.len(), 2);
        assert_eq!(view.filtered.len(), 2);
        assert_eq!(view.grand_total, 500.0);
        assert_eq!(view.summary[0].referrer_key, "甲");
        assert_eq!(view.summary[0].total_amount, 300.0);
    }

    #[test]
    fn test_empty_records_give_empty_view() {
        let view = SalesView::build(&[], &FilterCriteria::any(), &ViewOptions::default());
        assert!(view.facets.months.is_empty());
        assert!(view.filtered.is_empty());
        assert!(view.summary.is_empty());
        assert_eq!(view.grand_total, 0.0);
    }
}
