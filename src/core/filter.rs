//! Time entry filtering for the employee and administrator views.
//!
//! Filters are conjunctive: an entry is kept only when it satisfies every supplied
//! constraint, and absent constraints impose nothing. Results keep input order.
//! Date bounds are inclusive on both ends.

use chrono::NaiveDate;

use crate::entities::time_entry;

/// Returns true when `date` lies within the optional inclusive bounds.
#[must_use]
pub fn within_dates(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|start| date >= start) && end.is_none_or(|end| date <= end)
}

/// Optional constraints an employee can apply to their own entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeEntryFilter {
    /// Only entries for this client
    pub client_id: Option<i64>,
    /// Earliest activity date (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Latest activity date (inclusive)
    pub end_date: Option<NaiveDate>,
    /// Only billable (`true`) or non-billable (`false`) entries
    pub billable: Option<bool>,
}

impl EmployeeEntryFilter {
    /// Whether `entry` satisfies every supplied constraint.
    #[must_use]
    pub fn matches(&self, entry: &time_entry::Model) -> bool {
        self.client_id.is_none_or(|id| entry.client_id == id)
            && within_dates(entry.activity_date, self.start_date, self.end_date)
            && self.billable.is_none_or(|billable| entry.billable == billable)
    }
}

/// Optional constraints an administrator can apply across all entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminEntryFilter {
    /// Only entries logged by this employee
    pub employee_id: Option<i64>,
    /// Only entries for this client
    pub client_id: Option<i64>,
    /// Earliest activity date (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Latest activity date (inclusive)
    pub end_date: Option<NaiveDate>,
    /// Only billable (`true`) or non-billable (`false`) entries
    pub billable: Option<bool>,
}

impl AdminEntryFilter {
    /// A filter restricted to a date range only.
    #[must_use]
    pub const fn date_range(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            employee_id: None,
            client_id: None,
            start_date: Some(start_date),
            end_date: Some(end_date),
            billable: None,
        }
    }

    /// Whether `entry` satisfies every supplied constraint.
    #[must_use]
    pub fn matches(&self, entry: &time_entry::Model) -> bool {
        self.employee_id.is_none_or(|id| entry.employee_id == id)
            && EmployeeEntryFilter {
                client_id: self.client_id,
                start_date: self.start_date,
                end_date: self.end_date,
                billable: self.billable,
            }
            .matches(entry)
    }
}

/// Restricts `entries` to those owned by `employee_id`, then applies `filter`.
#[must_use]
pub fn filter_entries_for_employee<'a>(
    entries: &'a [time_entry::Model],
    employee_id: i64,
    filter: &EmployeeEntryFilter,
) -> Vec<&'a time_entry::Model> {
    entries
        .iter()
        .filter(|entry| entry.employee_id == employee_id && filter.matches(entry))
        .collect()
}

/// Applies every supplied constraint in `filter` to `entries`.
#[must_use]
pub fn filter_entries_for_admin<'a>(
    entries: &'a [time_entry::Model],
    filter: &AdminEntryFilter,
) -> Vec<&'a time_entry::Model> {
    entries.iter().filter(|entry| filter.matches(entry)).collect()
}
