//! Unified error types for the time-tracking and billing core.
//!
//! Every core operation returns [`Result`]. Business failures (validation, ownership,
//! modification window, invoice numbering) get their own variants so callers can
//! tell them apart; persistence and I/O failures are wrapped transparently.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Field-level validation failures, keyed by field name.
///
/// A field with no failures is absent from the map, so an empty value means the
/// input was valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns true when no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(())` when empty, otherwise [`Error::Validation`] carrying every field.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

/// Errors surfaced by every core operation.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more input fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// The requester does not own the record.
    #[error("You can only modify your own time entries")]
    Forbidden,

    /// The requester owns the record but the edit window has closed.
    #[error("Time entries can only be modified within {hours} hours of creation")]
    ModificationWindowExpired {
        /// Length of the modification window
        hours: i64,
    },

    /// The requested status change is not allowed from the current status.
    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A unique value could not be allocated.
    #[error("Duplicate entry: {message}")]
    DuplicateEntry {
        /// What collided
        message: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet encode/decode failure.
    #[error("Spreadsheet error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encode failure while recording audit values.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collects_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("rate", "Rate must be greater than 0");
        errors.add("duration", "Duration must be greater than 0");
        errors.add("rate", "Rate must be a number");

        assert_eq!(errors.fields().len(), 2);
        assert_eq!(errors.field("rate").map(<[String]>::len), Some(2));
        assert!(errors.field("activity_date").is_none());
        assert!(matches!(errors.into_result(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("rate", "bad");
        errors.add("duration", "worse");
        assert_eq!(errors.to_string(), "duration: worse; rate: bad");
    }
}
