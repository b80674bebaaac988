//! Rate business logic - Resolves and records hourly rates.
//!
//! Each service has a default rate (`employee_id` is `None`) and may have per-employee
//! overrides. Resolution is pure precedence: an employee override always beats the
//! default, regardless of which is higher. Within each class the row with the latest
//! `effective_from` is the one in force.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

use crate::{
    core::{
        audit::{AuditInput, record_audit},
        validation::validate_rate,
    },
    entities::{Rate, Service, rate},
    errors::{Error, Result, ValidationErrors},
};

/// Data for a new rate row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewRate {
    /// Service being priced
    pub service_id: i64,
    /// Employee override, or None for the service default
    pub employee_id: Option<i64>,
    /// Hourly rate, must be greater than 0
    pub hourly_rate: f64,
    /// First day the rate applies
    pub effective_from: NaiveDate,
}

fn latest<'a>(candidates: impl Iterator<Item = &'a rate::Model>) -> Option<&'a rate::Model> {
    candidates.max_by_key(|rate| (rate.effective_from, rate.id))
}

/// Resolves the hourly rate for a service, preferring the employee's override.
///
/// Returns `None` when the service has neither an override for `employee_id` nor a
/// default; callers must then supply a rate by hand or reject the entry.
#[must_use]
pub fn get_effective_rate(
    rates: &[rate::Model],
    service_id: i64,
    employee_id: Option<i64>,
) -> Option<f64> {
    let for_service = || rates.iter().filter(move |rate| rate.service_id == service_id);

    employee_id
        .and_then(|employee| latest(for_service().filter(|rate| rate.employee_id == Some(employee))))
        .or_else(|| latest(for_service().filter(|rate| rate.employee_id.is_none())))
        .map(|rate| rate.hourly_rate)
}

/// Retrieves every rate row for a service, oldest first.
pub async fn get_rates_for_service<C>(db: &C, service_id: i64) -> Result<Vec<rate::Model>>
where
    C: ConnectionTrait,
{
    Rate::find()
        .filter(rate::Column::ServiceId.eq(service_id))
        .order_by_asc(rate::Column::EffectiveFrom)
        .order_by_asc(rate::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads the service's rates and applies [`get_effective_rate`].
pub async fn resolve_rate<C>(db: &C, service_id: i64, employee_id: Option<i64>) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    let rates = get_rates_for_service(db, service_id).await?;
    Ok(get_effective_rate(&rates, service_id, employee_id))
}

/// Validates and inserts a rate row without auditing. Used for seeding and by [`set_rate`].
pub async fn create_rate<C>(db: &C, new_rate: NewRate) -> Result<rate::Model>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::new();
    validate_rate(new_rate.hourly_rate).record(&mut errors, "hourly_rate");
    errors.into_result()?;

    Service::find_by_id(new_rate.service_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Service", new_rate.service_id))?;

    let model = rate::ActiveModel {
        service_id: Set(new_rate.service_id),
        employee_id: Set(new_rate.employee_id),
        hourly_rate: Set(new_rate.hourly_rate),
        effective_from: Set(new_rate.effective_from),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Records a new default or employee-specific rate on behalf of an administrator.
///
/// Earlier rows are kept as history; the new row wins resolution from its
/// `effective_from` date onward.
#[instrument(skip(db))]
pub async fn set_rate(
    db: &DatabaseConnection,
    actor_id: i64,
    new_rate: NewRate,
    now: DateTime<Utc>,
) -> Result<rate::Model> {
    let txn = db.begin().await?;

    let created = create_rate(&txn, new_rate).await?;
    record_audit(
        &txn,
        AuditInput::created(actor_id, "rate", created.id, &created)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!(
        "Rate {} set for service {} (employee {:?})",
        created.hourly_rate, created.service_id, created.employee_id
    );
    Ok(created)
}
