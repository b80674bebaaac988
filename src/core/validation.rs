//! Field validation for rates, durations, activity dates, and allocation percentages.
//!
//! Validators never fail: an invalid value is reported through the returned
//! [`ValidationResult`], so several fields can be checked and collected into one
//! [`ValidationErrors`] without short-circuiting.

use chrono::{DateTime, Duration, NaiveDate};

use crate::errors::ValidationErrors;

/// Oldest activity date accepted, counted back from the reference day.
pub const MAX_ACTIVITY_AGE_DAYS: i64 = 30;

/// Longest duration a single entry may record.
pub const MAX_DURATION_HOURS: f64 = 24.0;

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the value passed
    pub valid: bool,
    /// Reason for failure, present only when `valid` is false
    pub error: Option<String>,
}

impl ValidationResult {
    /// A passing result.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// A failing result with a message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }

    /// Adds the failure (if any) to `errors` under `field`.
    pub fn record(self, errors: &mut ValidationErrors, field: &str) {
        if let Some(message) = self.error {
            errors.add(field, message);
        }
    }
}

/// Parses user input as a finite number.
#[must_use]
pub fn parse_numeric(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses user input as a calendar date.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (the date part is kept).
#[must_use]
pub fn parse_activity_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

/// A rate is valid when it is a finite number greater than zero.
#[must_use]
pub fn validate_rate(rate: f64) -> ValidationResult {
    if !rate.is_finite() {
        return ValidationResult::invalid("Rate must be a valid number");
    }
    if rate <= 0.0 {
        return ValidationResult::invalid("Rate must be greater than 0");
    }
    ValidationResult::ok()
}

/// A duration is valid when it is a finite number in `(0, 24]`.
#[must_use]
pub fn validate_duration(duration: f64) -> ValidationResult {
    if !duration.is_finite() {
        return ValidationResult::invalid("Duration must be a valid number");
    }
    if duration <= 0.0 {
        return ValidationResult::invalid("Duration must be greater than 0");
    }
    if duration > MAX_DURATION_HOURS {
        return ValidationResult::invalid("Duration cannot exceed 24 hours");
    }
    ValidationResult::ok()
}

/// Checks a typed activity date against `reference` at day granularity.
///
/// The date must not be after `reference` nor more than 30 days before it.
#[must_use]
pub fn check_activity_date(date: NaiveDate, reference: NaiveDate) -> ValidationResult {
    if date > reference {
        return ValidationResult::invalid("Activity date cannot be in the future");
    }
    if date < reference - Duration::days(MAX_ACTIVITY_AGE_DAYS) {
        return ValidationResult::invalid("Activity date cannot be more than 30 days in the past");
    }
    ValidationResult::ok()
}

/// Validates raw activity date input against `reference`.
#[must_use]
pub fn validate_activity_date(input: &str, reference: NaiveDate) -> ValidationResult {
    parse_activity_date(input).map_or_else(
        || ValidationResult::invalid("Activity date must be a valid date"),
        |date| check_activity_date(date, reference),
    )
}

/// An allocation percentage is valid when it is a finite number in `[0, 100]`.
#[must_use]
pub fn validate_allocation_percentage(percentage: f64) -> ValidationResult {
    if !percentage.is_finite() {
        return ValidationResult::invalid("Allocation percentage must be a valid number");
    }
    if !(0.0..=100.0).contains(&percentage) {
        return ValidationResult::invalid("Allocation percentage must be between 0 and 100");
    }
    ValidationResult::ok()
}

/// Typed time entry fields to validate. Absent fields are skipped, which lets the
/// same check serve creates (everything present) and patches (only changed fields).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeEntryFields {
    /// Hourly rate
    pub rate: Option<f64>,
    /// Hours worked
    pub duration: Option<f64>,
    /// Day the work was performed
    pub activity_date: Option<NaiveDate>,
}

/// Runs every applicable validator and collects all failures.
#[must_use]
pub fn validate_time_entry_fields(
    fields: &TimeEntryFields,
    reference: NaiveDate,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if let Some(rate) = fields.rate {
        validate_rate(rate).record(&mut errors, "rate");
    }
    if let Some(duration) = fields.duration {
        validate_duration(duration).record(&mut errors, "duration");
    }
    if let Some(date) = fields.activity_date {
        check_activity_date(date, reference).record(&mut errors, "activity_date");
    }
    errors
}

/// Raw form input as submitted by a user, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeEntryForm {
    /// Activity date text
    pub activity_date: String,
    /// Rate text
    pub rate: String,
    /// Duration text
    pub duration: String,
}

/// Validates a raw form: every field is parsed and checked, and all failures are
/// returned together. The form is valid when the result is empty.
#[must_use]
pub fn validate_time_entry_form(form: &TimeEntryForm, reference: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match parse_numeric(&form.rate) {
        Some(rate) => validate_rate(rate).record(&mut errors, "rate"),
        None => errors.add("rate", "Rate must be a valid number"),
    }
    match parse_numeric(&form.duration) {
        Some(duration) => validate_duration(duration).record(&mut errors, "duration"),
        None => errors.add("duration", "Duration must be a valid number"),
    }
    validate_activity_date(&form.activity_date, reference).record(&mut errors, "activity_date");

    errors
}
