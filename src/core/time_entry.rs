//! Time entry business logic - Logging, editing, deleting, and reviewing work time.
//!
//! Field edits and deletion are reserved for the owning employee within 24 hours of
//! creation. Status changes are reserved for administrators (enforced at the request
//! boundary) and are allowed at any time. Every write validates its input before any
//! database write, runs inside a database transaction, and records an audit entry
//! alongside the change.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

use crate::{
    core::{
        audit::{AuditInput, record_audit},
        filter::AdminEntryFilter,
        rate::resolve_rate,
        validation::{TimeEntryFields, validate_time_entry_fields},
    },
    entities::{Client, EntryStatus, Service, TimeEntry, time_entry},
    errors::{Error, Result, ValidationErrors},
};

/// Hours after creation during which the owner may edit or delete an entry.
pub const MODIFICATION_WINDOW_HOURS: i64 = 24;

const ENTITY_TYPE: &str = "time_entry";

/// Tolerance for binary representation error when a value sits on a half cent.
const HALF_CENT_TOLERANCE: f64 = 1e-7;

/// Rounds to 2 decimal places, half away from zero on the cent boundary.
///
/// Decimal ties such as `1.005` are stored slightly below the half cent, so the
/// scaled value is nudged away from zero before rounding.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    let cents = value * 100.0;
    (cents + cents.signum() * HALF_CENT_TOLERANCE).round() / 100.0
}

/// Billed amount for an entry: `rate * duration` rounded to cents, or 0 when not billable.
#[must_use]
pub fn calculate_amount(rate: f64, duration: f64, billable: bool) -> f64 {
    if billable {
        round_to_cents(rate * duration)
    } else {
        0.0
    }
}

/// Checks that `user_id` may edit or delete `entry` at `now`.
///
/// Ownership is checked first: a non-owner always gets [`Error::Forbidden`], even
/// inside the window. An owner past the window gets
/// [`Error::ModificationWindowExpired`].
pub fn check_modification_access(
    entry: &time_entry::Model,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    if entry.employee_id != user_id {
        return Err(Error::Forbidden);
    }
    if now - entry.created_at > Duration::hours(MODIFICATION_WINDOW_HOURS) {
        return Err(Error::ModificationWindowExpired {
            hours: MODIFICATION_WINDOW_HOURS,
        });
    }
    Ok(())
}

/// Boolean form of [`check_modification_access`].
#[must_use]
pub fn can_user_modify_entry(entry: &time_entry::Model, user_id: i64, now: DateTime<Utc>) -> bool {
    check_modification_access(entry, user_id, now).is_ok()
}

/// Data for a new time entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    /// Client the work was done for
    pub client_id: i64,
    /// Service category
    pub service_id: i64,
    /// Day the work was performed
    pub activity_date: NaiveDate,
    /// Free-text description
    pub memo: Option<String>,
    /// Hourly rate; resolved from the rate table when None
    pub rate: Option<f64>,
    /// Hours worked
    pub duration: f64,
    /// Whether the time is chargeable to the client
    pub billable: bool,
}

/// Partial update of a time entry.
///
/// A `Some` field overrides the stored value; `None` keeps it. `memo` is doubly
/// optional so that "clear the memo" (`Some(None)`) differs from "leave it" (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeEntryPatch {
    /// New client
    pub client_id: Option<i64>,
    /// New service
    pub service_id: Option<i64>,
    /// New activity date
    pub activity_date: Option<NaiveDate>,
    /// New memo, or `Some(None)` to clear it
    pub memo: Option<Option<String>>,
    /// New rate
    pub rate: Option<f64>,
    /// New duration
    pub duration: Option<f64>,
    /// New billable flag
    pub billable: Option<bool>,
}

impl TimeEntryPatch {
    /// True when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The fields of this patch that need validation.
    #[must_use]
    pub const fn fields_to_validate(&self) -> TimeEntryFields {
        TimeEntryFields {
            rate: self.rate,
            duration: self.duration,
            activity_date: self.activity_date,
        }
    }

    /// Merges the patch over `entry` and recomputes the amount from the effective
    /// rate, duration and billable flag.
    #[must_use]
    pub fn apply(&self, entry: &time_entry::Model, now: DateTime<Utc>) -> time_entry::Model {
        let rate = self.rate.unwrap_or(entry.rate);
        let duration = self.duration.unwrap_or(entry.duration);
        let billable = self.billable.unwrap_or(entry.billable);

        time_entry::Model {
            client_id: self.client_id.unwrap_or(entry.client_id),
            service_id: self.service_id.unwrap_or(entry.service_id),
            activity_date: self.activity_date.unwrap_or(entry.activity_date),
            memo: self.memo.clone().unwrap_or_else(|| entry.memo.clone()),
            rate,
            duration,
            billable,
            amount: calculate_amount(rate, duration, billable),
            updated_at: now,
            ..entry.clone()
        }
    }
}

/// Verifies that the referenced client and service exist and are active.
async fn check_references<C>(db: &C, client_id: i64, service_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::new();

    let client = Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Client", client_id))?;
    if !client.is_active {
        errors.add("client_id", "Client is inactive");
    }

    let service = Service::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Service", service_id))?;
    if !service.is_active {
        errors.add("service_id", "Service is inactive");
    }

    errors.into_result()
}

/// Logs a new time entry for `employee_id`.
///
/// The rate, duration and activity date are validated first and all failures are
/// reported together. When no rate is given the effective rate for the employee and
/// service is used; if none is configured the entry is rejected. New entries start
/// as [`EntryStatus::Pending`].
#[instrument(skip(db, input), fields(client_id = input.client_id, service_id = input.service_id))]
pub async fn create_time_entry(
    db: &DatabaseConnection,
    employee_id: i64,
    input: NewTimeEntry,
    now: DateTime<Utc>,
) -> Result<time_entry::Model> {
    let fields = TimeEntryFields {
        rate: input.rate,
        duration: Some(input.duration),
        activity_date: Some(input.activity_date),
    };
    validate_time_entry_fields(&fields, now.date_naive()).into_result()?;

    let txn = db.begin().await?;

    check_references(&txn, input.client_id, input.service_id).await?;

    let rate = match input.rate {
        Some(rate) => rate,
        None => resolve_rate(&txn, input.service_id, Some(employee_id))
            .await?
            .ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add("rate", "No rate is configured for this service");
                Error::Validation(errors)
            })?,
    };

    let entry = time_entry::ActiveModel {
        employee_id: Set(employee_id),
        client_id: Set(input.client_id),
        service_id: Set(input.service_id),
        activity_date: Set(input.activity_date),
        memo: Set(input.memo),
        rate: Set(rate),
        duration: Set(input.duration),
        billable: Set(input.billable),
        amount: Set(calculate_amount(rate, input.duration, input.billable)),
        status: Set(EntryStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = entry.insert(&txn).await?;

    record_audit(
        &txn,
        AuditInput::created(employee_id, ENTITY_TYPE, created.id, &created)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!(
        "Time entry {} logged: {}h, amount {:.2}",
        created.id, created.duration, created.amount
    );
    Ok(created)
}

/// Retrieves a time entry by its ID.
pub async fn get_time_entry<C>(db: &C, entry_id: i64) -> Result<Option<time_entry::Model>>
where
    C: ConnectionTrait,
{
    TimeEntry::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_entry<C>(db: &C, entry_id: i64) -> Result<time_entry::Model>
where
    C: ConnectionTrait,
{
    get_time_entry(db, entry_id)
        .await?
        .ok_or_else(|| Error::not_found("Time entry", entry_id))
}

/// Applies `patch` to an entry on behalf of its owner.
///
/// Order of checks: existence, ownership and window, then field validation. The
/// amount is recomputed from the merged rate, duration and billable flag.
#[instrument(skip(db, patch))]
pub async fn update_time_entry(
    db: &DatabaseConnection,
    entry_id: i64,
    user_id: i64,
    patch: TimeEntryPatch,
    now: DateTime<Utc>,
) -> Result<time_entry::Model> {
    let txn = db.begin().await?;

    let existing = find_entry(&txn, entry_id).await?;
    check_modification_access(&existing, user_id, now).inspect_err(|e| {
        warn!("User {user_id} denied edit of time entry {entry_id}: {e}");
    })?;
    validate_time_entry_fields(&patch.fields_to_validate(), now.date_naive()).into_result()?;

    if patch.is_empty() {
        return Ok(existing);
    }

    let merged = patch.apply(&existing, now);
    if patch.client_id.is_some() || patch.service_id.is_some() {
        check_references(&txn, merged.client_id, merged.service_id).await?;
    }

    let mut active: time_entry::ActiveModel = existing.clone().into();
    active.client_id = Set(merged.client_id);
    active.service_id = Set(merged.service_id);
    active.activity_date = Set(merged.activity_date);
    active.memo = Set(merged.memo.clone());
    active.rate = Set(merged.rate);
    active.duration = Set(merged.duration);
    active.billable = Set(merged.billable);
    active.amount = Set(merged.amount);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    record_audit(
        &txn,
        AuditInput::updated(user_id, ENTITY_TYPE, entry_id, &existing, &updated)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!("Time entry {entry_id} updated by user {user_id}");
    Ok(updated)
}

/// Deletes an entry on behalf of its owner and returns the removed record.
#[instrument(skip(db))]
pub async fn delete_time_entry(
    db: &DatabaseConnection,
    entry_id: i64,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<time_entry::Model> {
    let txn = db.begin().await?;

    let existing = find_entry(&txn, entry_id).await?;
    check_modification_access(&existing, user_id, now).inspect_err(|e| {
        warn!("User {user_id} denied delete of time entry {entry_id}: {e}");
    })?;

    TimeEntry::delete_by_id(entry_id).exec(&txn).await?;
    record_audit(
        &txn,
        AuditInput::deleted(user_id, ENTITY_TYPE, entry_id, &existing)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!("Time entry {entry_id} deleted by user {user_id}");
    Ok(existing)
}

/// Validates a review status change.
///
/// Returns `Ok(false)` when `to` equals `from` (nothing to do). Entries may move
/// from pending to approved or rejected and between approved and rejected, but
/// never back to pending.
pub fn validate_status_transition(from: EntryStatus, to: EntryStatus) -> Result<bool> {
    if from == to {
        return Ok(false);
    }
    if to == EntryStatus::Pending {
        return Err(Error::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(true)
}

/// Sets the review status of an entry on behalf of an administrator.
///
/// Unlike field edits this is not restricted by ownership or the modification window.
#[instrument(skip(db))]
pub async fn set_entry_status(
    db: &DatabaseConnection,
    entry_id: i64,
    admin_id: i64,
    status: EntryStatus,
    now: DateTime<Utc>,
) -> Result<time_entry::Model> {
    let txn = db.begin().await?;

    let existing = find_entry(&txn, entry_id).await?;
    if !validate_status_transition(existing.status, status)? {
        return Ok(existing);
    }

    let mut active: time_entry::ActiveModel = existing.clone().into();
    active.status = Set(status);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    record_audit(
        &txn,
        AuditInput::updated(admin_id, ENTITY_TYPE, entry_id, &existing, &updated)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!(
        "Time entry {entry_id} moved from {} to {status} by admin {admin_id}",
        existing.status
    );
    Ok(updated)
}

/// Loads entries matching `filter`, ordered by activity date then id.
pub async fn list_time_entries<C>(db: &C, filter: &AdminEntryFilter) -> Result<Vec<time_entry::Model>>
where
    C: ConnectionTrait,
{
    let mut query = TimeEntry::find();
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(time_entry::Column::EmployeeId.eq(employee_id));
    }
    if let Some(client_id) = filter.client_id {
        query = query.filter(time_entry::Column::ClientId.eq(client_id));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(time_entry::Column::ActivityDate.gte(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(time_entry::Column::ActivityDate.lte(end));
    }
    if let Some(billable) = filter.billable {
        query = query.filter(time_entry::Column::Billable.eq(billable));
    }

    query
        .order_by_asc(time_entry::Column::ActivityDate)
        .order_by_asc(time_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::audit::{AuditLogFilter, list_audit_logs};
    use crate::entities::AuditAction;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[test]
    fn test_calculate_amount() {
        assert_eq!(calculate_amount(150.0, 3.5, true), 525.0);
        assert_eq!(calculate_amount(150.0, 3.5, false), 0.0);
        assert_eq!(calculate_amount(80.0, 1.25, true), 100.0);
        assert_eq!(calculate_amount(33.33, 0.333, true), 11.1);
    }

    #[test]
    fn test_round_to_cents_half_up() {
        assert_eq!(round_to_cents(10.125), 10.13);
        assert_eq!(round_to_cents(10.124), 10.12);
        assert_eq!(round_to_cents(0.5), 0.5);
        assert_eq!(round_to_cents(-10.125), -10.13);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_calculate_amount_rounds_decimal_half_cents_up() {
        // Both products are a decimal half cent that binary floats store just below it
        assert_eq!(calculate_amount(1.005, 1.0, true), 1.01);
        assert_eq!(calculate_amount(100.5, 0.01, true), 1.01);
        assert_eq!(calculate_amount(10.7, 0.25, true), 2.68);
        assert_eq!(calculate_amount(33.35, 0.15, true), 5.0);
    }

    #[test]
    fn test_modification_access_owner_within_window() {
        let entry = sample_entry(1, 7, 1, test_now().date_naive(), 2.0, true);
        let now = entry.created_at + Duration::hours(24);
        assert!(check_modification_access(&entry, 7, now).is_ok());
        assert!(can_user_modify_entry(&entry, 7, now));
    }

    #[test]
    fn test_modification_access_wrong_owner_within_window() {
        let entry = sample_entry(1, 7, 1, test_now().date_naive(), 2.0, true);
        let now = entry.created_at + Duration::hours(1);
        assert!(matches!(
            check_modification_access(&entry, 8, now),
            Err(Error::Forbidden)
        ));
        assert!(!can_user_modify_entry(&entry, 8, now));
    }

    #[test]
    fn test_modification_access_owner_outside_window() {
        let entry = sample_entry(1, 7, 1, test_now().date_naive(), 2.0, true);
        let now = entry.created_at + Duration::hours(24) + Duration::seconds(1);
        assert!(matches!(
            check_modification_access(&entry, 7, now),
            Err(Error::ModificationWindowExpired { hours: 24 })
        ));
    }

    #[test]
    fn test_patch_apply_retains_absent_fields() {
        let entry = sample_entry(1, 7, 1, test_now().date_naive(), 2.0, true);
        let patch = TimeEntryPatch {
            duration: Some(4.0),
            ..TimeEntryPatch::default()
        };
        let merged = patch.apply(&entry, test_now());
        assert_eq!(merged.duration, 4.0);
        assert_eq!(merged.rate, entry.rate);
        assert_eq!(merged.memo, entry.memo);
        assert_eq!(merged.amount, calculate_amount(entry.rate, 4.0, true));
    }

    #[test]
    fn test_patch_apply_can_clear_memo() {
        let entry = sample_entry(1, 7, 1, test_now().date_naive(), 2.0, true);
        assert!(entry.memo.is_some());
        let patch = TimeEntryPatch {
            memo: Some(None),
            billable: Some(false),
            ..TimeEntryPatch::default()
        };
        let merged = patch.apply(&entry, test_now());
        assert!(merged.memo.is_none());
        assert_eq!(merged.amount, 0.0);
    }

    #[test]
    fn test_status_transitions() {
        use EntryStatus::{Approved, Pending, Rejected};
        assert!(validate_status_transition(Pending, Approved).unwrap());
        assert!(validate_status_transition(Pending, Rejected).unwrap());
        assert!(validate_status_transition(Approved, Rejected).unwrap());
        assert!(validate_status_transition(Rejected, Approved).unwrap());
        assert!(!validate_status_transition(Pending, Pending).unwrap());
        assert!(matches!(
            validate_status_transition(Approved, Pending),
            Err(Error::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_time_entry_validation_before_any_query() -> Result<()> {
        // No query results are configured: validation must fail before touching the database
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let input = NewTimeEntry {
            client_id: 1,
            service_id: 1,
            activity_date: test_now().date_naive() + Duration::days(1),
            memo: None,
            rate: Some(-10.0),
            duration: 25.0,
            billable: true,
        };
        let result = create_time_entry(&db, 1, input, test_now()).await;
        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.fields().len(), 3);
        assert!(errors.field("rate").is_some());
        assert!(errors.field("duration").is_some());
        assert!(errors.field("activity_date").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_time_entry_integration() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_time_entry(
            &fixture.db,
            fixture.employee.id,
            NewTimeEntry {
                client_id: fixture.client.id,
                service_id: fixture.service.id,
                activity_date: test_now().date_naive(),
                memo: Some("Quarterly review".to_string()),
                rate: Some(150.0),
                duration: 3.5,
                billable: true,
            },
            test_now(),
        )
        .await?;

        assert_eq!(entry.amount, 525.0);
        assert_eq!(entry.status, EntryStatus::Pending);
        assert_eq!(entry.employee_id, fixture.employee.id);
        assert_eq!(entry.created_at, test_now());

        let audits = list_audit_logs(&fixture.db, &AuditLogFilter::default()).await?;
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action, AuditAction::Create);
        assert_eq!(audits[0].entity_id, entry.id);
        assert!(audits[0].old_values.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_time_entry_resolves_rate() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, None, 2.0, true).await?;
        // Fixture service default is 150
        assert_eq!(entry.rate, 150.0);
        assert_eq!(entry.amount, 300.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_time_entry_without_any_rate() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let bare = crate::core::service::create_service(&fixture.db, "Unpriced", None).await?;
        let result = create_time_entry(
            &fixture.db,
            fixture.employee.id,
            NewTimeEntry {
                client_id: fixture.client.id,
                service_id: bare.id,
                activity_date: test_now().date_naive(),
                memo: None,
                rate: None,
                duration: 1.0,
                billable: true,
            },
            test_now(),
        )
        .await;
        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.field("rate").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_time_entry_inactive_client() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        crate::core::client::set_client_active(&fixture.db, fixture.client.id, false).await?;
        let result = create_test_entry(&fixture, Some(100.0), 1.0, true).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_time_entry_recomputes_amount() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 3.5, true).await?;

        let later = test_now() + Duration::hours(2);
        let patch = TimeEntryPatch {
            duration: Some(2.0),
            ..TimeEntryPatch::default()
        };
        let updated = update_time_entry(&fixture.db, entry.id, fixture.employee.id, patch, later).await?;

        assert_eq!(updated.duration, 2.0);
        assert_eq!(updated.rate, 150.0);
        assert_eq!(updated.amount, 300.0);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, entry.created_at);

        let audits = list_audit_logs(
            &fixture.db,
            &AuditLogFilter {
                action: Some(AuditAction::Update),
                ..AuditLogFilter::default()
            },
        )
        .await?;
        assert_eq!(audits.len(), 1);
        let old_values = audits[0].old_values.clone().unwrap();
        let new_values = audits[0].new_values.clone().unwrap();
        assert_eq!(old_values["duration"], json!(3.5));
        assert_eq!(new_values["duration"], json!(2.0));
        assert_eq!(new_values["amount"], json!(300.0));
        // Unchanged keys are not recorded
        assert!(old_values.get("rate").is_none());
        assert!(new_values.get("memo").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_time_entry_after_window_expired() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 3.5, true).await?;

        let later = test_now() + Duration::hours(25);
        let patch = TimeEntryPatch {
            memo: Some(Some("late edit".to_string())),
            ..TimeEntryPatch::default()
        };
        let result = update_time_entry(&fixture.db, entry.id, fixture.employee.id, patch, later).await;
        assert!(matches!(
            result,
            Err(Error::ModificationWindowExpired { hours: 24 })
        ));

        let unchanged = get_time_entry(&fixture.db, entry.id).await?.unwrap();
        assert_eq!(unchanged, entry);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_time_entry_by_other_user() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 3.5, true).await?;

        let patch = TimeEntryPatch {
            duration: Some(1.0),
            ..TimeEntryPatch::default()
        };
        let result = update_time_entry(&fixture.db, entry.id, fixture.admin.id, patch, test_now()).await;
        assert!(matches!(result, Err(Error::Forbidden)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_time_entry_invalid_patch() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 3.5, true).await?;

        let patch = TimeEntryPatch {
            rate: Some(0.0),
            duration: Some(30.0),
            ..TimeEntryPatch::default()
        };
        let result = update_time_entry(&fixture.db, entry.id, fixture.employee.id, patch, test_now()).await;
        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.field("rate").is_some());
        assert!(errors.field("duration").is_some());

        let unchanged = get_time_entry(&fixture.db, entry.id).await?.unwrap();
        assert_eq!(unchanged.duration, 3.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_entry() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let result = update_time_entry(
            &fixture.db,
            999,
            fixture.employee.id,
            TimeEntryPatch::default(),
            test_now(),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { id: 999, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_time_entry() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 1.0, true).await?;

        let result = delete_time_entry(&fixture.db, entry.id, fixture.admin.id, test_now()).await;
        assert!(matches!(result, Err(Error::Forbidden)));

        let removed = delete_time_entry(&fixture.db, entry.id, fixture.employee.id, test_now()).await?;
        assert_eq!(removed.id, entry.id);
        assert!(get_time_entry(&fixture.db, entry.id).await?.is_none());

        let audits = list_audit_logs(
            &fixture.db,
            &AuditLogFilter {
                action: Some(AuditAction::Delete),
                ..AuditLogFilter::default()
            },
        )
        .await?;
        assert_eq!(audits.len(), 1);
        assert!(audits[0].new_values.is_none());
        assert!(audits[0].old_values.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_time_entry_outside_window() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 1.0, true).await?;
        let late = test_now() + Duration::hours(25);

        let result = delete_time_entry(&fixture.db, entry.id, fixture.employee.id, late).await;
        assert!(matches!(
            result,
            Err(Error::ModificationWindowExpired { hours: 24 })
        ));
        // A non-owner past the window is still reported as forbidden
        let result = delete_time_entry(&fixture.db, entry.id, fixture.admin.id, late).await;
        assert!(matches!(result, Err(Error::Forbidden)));

        assert!(get_time_entry(&fixture.db, entry.id).await?.is_some());
        let audits = list_audit_logs(
            &fixture.db,
            &AuditLogFilter {
                action: Some(AuditAction::Delete),
                ..AuditLogFilter::default()
            },
        )
        .await?;
        assert!(audits.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_entry_status_ignores_window() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        let entry = create_test_entry(&fixture, Some(150.0), 1.0, true).await?;
        let much_later = test_now() + Duration::days(10);

        let approved =
            set_entry_status(&fixture.db, entry.id, fixture.admin.id, EntryStatus::Approved, much_later).await?;
        assert_eq!(approved.status, EntryStatus::Approved);

        let rejected =
            set_entry_status(&fixture.db, entry.id, fixture.admin.id, EntryStatus::Rejected, much_later).await?;
        assert_eq!(rejected.status, EntryStatus::Rejected);

        let result =
            set_entry_status(&fixture.db, entry.id, fixture.admin.id, EntryStatus::Pending, much_later).await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_time_entries_filters() -> Result<()> {
        let fixture = setup_with_catalog().await?;
        create_test_entry(&fixture, Some(100.0), 1.0, true).await?;
        create_test_entry(&fixture, Some(100.0), 2.0, false).await?;

        let billable = list_time_entries(
            &fixture.db,
            &AdminEntryFilter {
                employee_id: Some(fixture.employee.id),
                billable: Some(true),
                ..AdminEntryFilter::default()
            },
        )
        .await?;
        assert_eq!(billable.len(), 1);
        assert_eq!(billable[0].duration, 1.0);

        let all = list_time_entries(&fixture.db, &AdminEntryFilter::default()).await?;
        assert_eq!(all.len(), 2);
        Ok(())
    }
}
