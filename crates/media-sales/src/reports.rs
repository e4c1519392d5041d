//! Report generation (console tables and CSV outputs)

use anyhow::{Context, Result};
use csv::Writer;
use sales_core::{DateLike, Facets, FilterCriteria, SalesRecord, SalesView};
use std::path::{Path, PathBuf};
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::constants;

/// One line of the referrer ranking table
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "紹介者")]
    referrer: String,
    #[tabled(rename = "件数")]
    records: usize,
    #[tabled(rename = "合計売上")]
    total: String,
}

/// One line of the itemized records table
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "契約月")]
    month: String,
    #[tabled(rename = "紹介者")]
    referrer: String,
    #[tabled(rename = "店舗名")]
    store: String,
    #[tabled(rename = "合計売上")]
    total: String,
}

impl From<&SalesRecord> for RecordRow {
    fn from(record: &SalesRecord) -> Self {
        Self {
            month: month_cell(record),
            referrer: record
                .referrer
                .clone()
                .unwrap_or_else(|| constants::BLANK_CELL.to_string()),
            store: record
                .store_name
                .clone()
                .unwrap_or_else(|| constants::BLANK_CELL.to_string()),
            total: record
                .total_sales
                .map(format_yen)
                .unwrap_or_else(|| constants::BLANK_CELL.to_string()),
        }
    }
}

// =============================================================================
// Console Output
// =============================================================================

/// Print the referrer ranking followed by the itemized records
pub fn print_view(view: &SalesView, criteria: &FilterCriteria) {
    println!("\n============================================================");
    println!("                    媒体別売上 (Sales by Media)");
    println!("============================================================");
    println!("  Filter: {}", describe_criteria(criteria));
    println!("  Records: {}\n", view.filtered.len());

    if view.filtered.is_empty() {
        println!("  No records match the current selection.");
        println!("============================================================");
        return;
    }

    println!("紹介者ごとの合計売上:");
    let rows: Vec<SummaryRow> = view
        .summary
        .iter()
        .map(|entry| SummaryRow {
            referrer: entry.referrer_key.clone(),
            records: entry.record_count,
            total: format_yen(entry.total_amount),
        })
        .collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::new(1..), Alignment::right());
    println!("{}", table);
    println!("  Total: {}\n", format_yen(view.grand_total));

    println!("売上明細:");
    let rows: Vec<RecordRow> = view.filtered.iter().map(RecordRow::from).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::new(3..), Alignment::right());
    println!("{}", table);
    println!("============================================================");
}

/// Print the selectable values for each filter
pub fn print_facets(facets: &Facets) {
    let months: Vec<&str> = facets.months.iter().map(|m| m.as_str()).collect();

    println!("契約月 ({}):", months.len());
    print_options(&months);
    println!("\n店舗名 ({}):", facets.stores.len());
    print_options(&facets.stores);
    println!("\n紹介者 ({}):", facets.referrers.len());
    print_options(&facets.referrers);
}

fn print_options<S: AsRef<str>>(options: &[S]) {
    if options.is_empty() {
        println!("  (none)");
    }
    for option in options {
        println!("  {}", option.as_ref());
    }
}

/// Human-readable summary of the active selections
pub fn describe_criteria(criteria: &FilterCriteria) -> String {
    if criteria.is_any() {
        return "全期間 / 全店舗 / 全紹介者".to_string();
    }

    let month = criteria
        .month
        .as_ref()
        .map_or("全期間".to_string(), |m| m.to_string());
    let store = criteria.store.as_deref().unwrap_or("全店舗");
    let referrer = criteria.referrer.as_deref().unwrap_or("全紹介者");
    format!("{} / {} / {}", month, store, referrer)
}

// =============================================================================
// CSV Output
// =============================================================================

/// Generate all CSV reports, returning the written paths
pub fn generate_all_reports(output_dir: &Path, view: &SalesView) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    Ok(vec![
        generate_summary(output_dir, view)?,
        generate_records(output_dir, view)?,
    ])
}

/// Generate referrer_summary.csv
fn generate_summary(output_dir: &Path, view: &SalesView) -> Result<PathBuf> {
    let path = output_dir.join(constants::SUMMARY_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Rank", "Referrer", "Records", "Total_Sales"])?;

    for (rank, entry) in view.summary.iter().enumerate() {
        wtr.write_record([
            &(rank + 1).to_string(),
            &entry.referrer_key,
            &entry.record_count.to_string(),
            &entry.total_amount.to_string(),
        ])?;
    }

    wtr.write_record(["", "TOTAL", &view.filtered.len().to_string(), &view.grand_total.to_string()])?;

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(path)
}

/// Generate sales_records.csv
fn generate_records(output_dir: &Path, view: &SalesView) -> Result<PathBuf> {
    let path = output_dir.join(constants::RECORDS_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Contract_Month",
        "Contract_Date",
        "Referrer",
        "Store",
        "Total_Sales",
    ])?;

    for record in &view.filtered {
        let month = record.month();
        wtr.write_record([
            month.key().map_or("", |m| m.as_str()),
            &raw_date(&record.contract_date),
            record.referrer.as_deref().unwrap_or(""),
            record.store_name.as_deref().unwrap_or(""),
            &record.total_sales.map(|a| a.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(path)
}

// =============================================================================
// Formatting
// =============================================================================

fn month_cell(record: &SalesRecord) -> String {
    record
        .month()
        .into_key()
        .map_or_else(|| constants::BLANK_CELL.to_string(), String::from)
}

fn raw_date(date: &DateLike) -> String {
    match date {
        DateLike::Missing => String::new(),
        DateLike::Text(text) => text.clone(),
        DateLike::Instant(instant) => instant.to_rfc3339(),
    }
}

/// Format an amount with thousands separators and the yen suffix
pub fn format_yen(amount: f64) -> String {
    format!("{} {}", format_amount(amount), constants::CURRENCY_SUFFIX)
}

/// Group digits by thousands, keeping up to three fraction digits
pub fn format_amount(amount: f64) -> String {
    let rendered = format!("{:.*}", constants::AMOUNT_FRACTION_DIGITS, amount.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((&rendered, ""));
    let frac_part = frac_part.trim_end_matches('0');

    // Values that round to zero print without a sign
    let negative = amount < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };

    let grouped = group_thousands(int_part);
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
