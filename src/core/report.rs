//! Report generation business logic.
//!
//! Aggregations are single-pass reductions over any collection of time entries, so
//! they compose with the filters in [`crate::core::filter`]. Groups are keyed by id
//! in a `BTreeMap` for stable ordering, and only groups with at least one matching
//! entry appear.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::{
    core::{filter::AdminEntryFilter, time_entry::list_time_entries},
    entities::time_entry,
    errors::{Error, Result, ValidationErrors},
};

/// Billable versus non-billable hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BillableBreakdown {
    /// Hours on billable entries
    pub billable_hours: f64,
    /// Hours on non-billable entries
    pub non_billable_hours: f64,
    /// Sum of both
    pub total_hours: f64,
}

fn sum_by_key<'a, I, K, V>(entries: I, key: K, value: V) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = &'a time_entry::Model>,
    K: Fn(&time_entry::Model) -> i64,
    V: Fn(&time_entry::Model) -> f64,
{
    entries.into_iter().fold(BTreeMap::new(), |mut totals, entry| {
        *totals.entry(key(entry)).or_insert(0.0) += value(entry);
        totals
    })
}

/// Total hours per employee.
#[must_use]
pub fn hours_by_employee<'a, I>(entries: I) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = &'a time_entry::Model>,
{
    sum_by_key(entries, |entry| entry.employee_id, |entry| entry.duration)
}

/// Total hours per client.
#[must_use]
pub fn hours_by_client<'a, I>(entries: I) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = &'a time_entry::Model>,
{
    sum_by_key(entries, |entry| entry.client_id, |entry| entry.duration)
}

/// Splits total hours into billable and non-billable.
#[must_use]
pub fn billable_breakdown<'a, I>(entries: I) -> BillableBreakdown
where
    I: IntoIterator<Item = &'a time_entry::Model>,
{
    let mut breakdown = entries
        .into_iter()
        .fold(BillableBreakdown::default(), |mut acc, entry| {
            if entry.billable {
                acc.billable_hours += entry.duration;
            } else {
                acc.non_billable_hours += entry.duration;
            }
            acc
        });
    breakdown.total_hours = breakdown.billable_hours + breakdown.non_billable_hours;
    breakdown
}

/// Billed amount per employee, counting billable entries only.
///
/// Employees whose entries in the set are all non-billable do not appear.
#[must_use]
pub fn revenue_by_consultant<'a, I>(entries: I) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = &'a time_entry::Model>,
{
    sum_by_key(
        entries.into_iter().filter(|entry| entry.billable),
        |entry| entry.employee_id,
        |entry| entry.amount,
    )
}

/// Every aggregation for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    /// First day covered (inclusive)
    pub start_date: NaiveDate,
    /// Last day covered (inclusive)
    pub end_date: NaiveDate,
    /// Number of entries in the range
    pub entry_count: usize,
    /// Hours per employee
    pub hours_by_employee: BTreeMap<i64, f64>,
    /// Hours per client
    pub hours_by_client: BTreeMap<i64, f64>,
    /// Billable split
    pub breakdown: BillableBreakdown,
    /// Billable revenue per employee
    pub revenue_by_consultant: BTreeMap<i64, f64>,
}

/// Builds a [`PeriodReport`] from entries already restricted to the range.
#[must_use]
pub fn summarize_period(
    entries: &[time_entry::Model],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> PeriodReport {
    PeriodReport {
        start_date,
        end_date,
        entry_count: entries.len(),
        hours_by_employee: hours_by_employee(entries),
        hours_by_client: hours_by_client(entries),
        breakdown: billable_breakdown(entries),
        revenue_by_consultant: revenue_by_consultant(entries),
    }
}

/// Checks that a reporting range is not inverted.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
    if end_date < start_date {
        let mut errors = ValidationErrors::new();
        errors.add("end_date", "End date must be on or after start date");
        return Err(Error::Validation(errors));
    }
    Ok(())
}

/// Loads the entries in `[start_date, end_date]` and aggregates them.
pub async fn generate_period_report(
    db: &DatabaseConnection,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PeriodReport> {
    validate_date_range(start_date, end_date)?;
    let entries = list_time_entries(db, &AdminEntryFilter::date_range(start_date, end_date)).await?;
    Ok(summarize_period(&entries, start_date, end_date))
}

/// Formats an amount as currency, e.g. `"1,250.00"`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

/// Formats hours with up to two decimals, e.g. `"3.5h"`.
#[must_use]
pub fn format_hours(hours: f64) -> String {
    let formatted = format!("{hours:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}h")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::filter::{AdminEntryFilter, filter_entries_for_admin};
    use crate::test_utils::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap_or_default()
    }

    fn entries() -> Vec<time_entry::Model> {
        vec![
            sample_entry(1, 1, 10, day(1), 2.0, true),
            sample_entry(2, 2, 10, day(5), 3.0, false),
            sample_entry(3, 1, 11, day(10), 1.5, false),
            sample_entry(4, 1, 10, day(15), 4.0, true),
            sample_entry(5, 3, 11, day(20), 2.5, false),
        ]
    }

    #[test]
    fn test_hours_by_employee_matches_raw_sums() {
        let all = entries();
        let totals = hours_by_employee(&all);
        assert_eq!(totals.len(), 3);
        for (employee_id, hours) in &totals {
            let raw: f64 = all
                .iter()
                .filter(|entry| entry.employee_id == *employee_id)
                .map(|entry| entry.duration)
                .sum();
            assert_eq!(*hours, raw);
        }
        assert_eq!(totals[&1], 7.5);
    }

    #[test]
    fn test_hours_by_client_matches_raw_sums() {
        let all = entries();
        let totals = hours_by_client(&all);
        assert_eq!(totals[&10], 9.0);
        assert_eq!(totals[&11], 4.0);
        assert_eq!(totals.values().sum::<f64>(), 13.0);
    }

    #[test]
    fn test_billable_breakdown() {
        let breakdown = billable_breakdown(&entries());
        assert_eq!(breakdown.billable_hours, 6.0);
        assert_eq!(breakdown.non_billable_hours, 7.0);
        assert_eq!(breakdown.total_hours, 13.0);
    }

    #[test]
    fn test_revenue_by_consultant_excludes_non_billable_only_employees() {
        let all = entries();
        let revenue = revenue_by_consultant(&all);
        // Employees 2 and 3 only have non-billable entries
        assert_eq!(revenue.len(), 1);
        let raw: f64 = all
            .iter()
            .filter(|entry| entry.billable)
            .map(|entry| entry.amount)
            .sum();
        assert_eq!(revenue[&1], raw);
        assert!(!revenue.contains_key(&2));
    }

    #[test]
    fn test_aggregations_compose_with_filters() {
        let all = entries();
        let filtered = filter_entries_for_admin(&all, &AdminEntryFilter::date_range(day(5), day(15)));
        let totals = hours_by_employee(filtered.iter().copied());
        assert_eq!(totals[&1], 5.5);
        assert_eq!(totals[&2], 3.0);
        assert!(!totals.contains_key(&3));
    }

    #[test]
    fn test_empty_input() {
        let none: Vec<time_entry::Model> = Vec::new();
        assert!(hours_by_employee(&none).is_empty());
        assert_eq!(billable_breakdown(&none), BillableBreakdown::default());
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range(day(1), day(1)).is_ok());
        assert!(matches!(
            validate_date_range(day(2), day(1)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(525.0), "525.00");
        assert_eq!(format_currency(1250.5), "1,250.50");
        assert_eq!(format_currency(1_234_567.891), "1,234,567.89");
        assert_eq!(format_currency(-42.1), "-42.10");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(3.5), "3.5h");
        assert_eq!(format_hours(8.0), "8h");
        assert_eq!(format_hours(0.25), "0.25h");
    }

    #[tokio::test]
    async fn test_generate_period_report_integration() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        create_test_entry(&fixture, Some(100.0), 2.0, true).await?;
        create_test_entry(&fixture, Some(100.0), 1.0, false).await?;

        let today = test_now().date_naive();
        let report = generate_period_report(&fixture.db, today, today).await?;
        assert_eq!(report.entry_count, 2);
        assert_eq!(report.breakdown.total_hours, 3.0);
        assert_eq!(report.revenue_by_consultant[&fixture.employee.id], 200.0);

        let earlier = today - chrono::Duration::days(1);
        let empty = generate_period_report(&fixture.db, earlier, earlier).await?;
        assert_eq!(empty.entry_count, 0);
        assert!(empty.revenue_by_consultant.is_empty());
        Ok(())
    }
}
