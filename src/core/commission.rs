//! Commission and allocation business logic.
//!
//! An employee's commission is their allocation percentage of the billable amount
//! they generated. Allocations are kept as history; the row with the latest
//! `effective_from` is the one in force.
//!
//! [`calculate_commission`] feeds reports, so out-of-domain input yields 0 instead of
//! an error. Allocation writes, by contrast, reject out-of-range percentages.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    core::{
        audit::{AuditInput, record_audit},
        filter::AdminEntryFilter,
        report::{revenue_by_consultant, validate_date_range},
        time_entry::{list_time_entries, round_to_cents},
        validation::validate_allocation_percentage,
    },
    entities::{EmployeeAllocation, User, employee_allocation},
    errors::{Error, Result, ValidationErrors},
};

const ENTITY_TYPE: &str = "employee_allocation";

/// Commission owed on `billable_amount` at `allocation_percentage`.
///
/// Returns 0 when the amount is negative or not finite, or when the percentage
/// lies outside `[0, 100]`.
#[must_use]
pub fn calculate_commission(billable_amount: f64, allocation_percentage: f64) -> f64 {
    if !billable_amount.is_finite() || billable_amount < 0.0 {
        return 0.0;
    }
    if !validate_allocation_percentage(allocation_percentage).valid {
        return 0.0;
    }
    billable_amount * allocation_percentage / 100.0
}

/// The allocation in force for `employee_id`: the one with the latest
/// `effective_from`. `None` means no allocation, which callers treat as 0%.
#[must_use]
pub fn get_effective_allocation(
    allocations: &[employee_allocation::Model],
    employee_id: i64,
) -> Option<&employee_allocation::Model> {
    allocations
        .iter()
        .filter(|allocation| allocation.employee_id == employee_id)
        .max_by_key(|allocation| (allocation.effective_from, allocation.id))
}

fn validate_percentage(percentage: f64) -> Result<()> {
    let mut errors = ValidationErrors::new();
    validate_allocation_percentage(percentage).record(&mut errors, "percentage");
    errors.into_result()
}

/// Retrieves every allocation row for an employee, oldest first.
pub async fn get_allocations_for_employee<C>(
    db: &C,
    employee_id: i64,
) -> Result<Vec<employee_allocation::Model>>
where
    C: ConnectionTrait,
{
    EmployeeAllocation::find()
        .filter(employee_allocation::Column::EmployeeId.eq(employee_id))
        .order_by_asc(employee_allocation::Column::EffectiveFrom)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a new allocation for an employee, effective from `effective_from`.
#[instrument(skip(db))]
pub async fn set_allocation(
    db: &DatabaseConnection,
    actor_id: i64,
    employee_id: i64,
    percentage: f64,
    effective_from: NaiveDate,
    now: DateTime<Utc>,
) -> Result<employee_allocation::Model> {
    validate_percentage(percentage)?;

    let txn = db.begin().await?;

    User::find_by_id(employee_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("User", employee_id))?;

    let allocation = employee_allocation::ActiveModel {
        employee_id: Set(employee_id),
        percentage: Set(percentage),
        effective_from: Set(effective_from),
        ..Default::default()
    };
    let created = allocation.insert(&txn).await?;

    record_audit(
        &txn,
        AuditInput::created(actor_id, ENTITY_TYPE, created.id, &created)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!("Allocation of {percentage}% set for employee {employee_id}");
    Ok(created)
}

/// Changes the percentage of an existing allocation row.
#[instrument(skip(db))]
pub async fn update_allocation(
    db: &DatabaseConnection,
    actor_id: i64,
    allocation_id: i64,
    percentage: f64,
    now: DateTime<Utc>,
) -> Result<employee_allocation::Model> {
    validate_percentage(percentage)?;

    let txn = db.begin().await?;

    let existing = EmployeeAllocation::find_by_id(allocation_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Allocation", allocation_id))?;

    let mut active: employee_allocation::ActiveModel = existing.clone().into();
    active.percentage = Set(percentage);
    let updated = active.update(&txn).await?;

    record_audit(
        &txn,
        AuditInput::updated(actor_id, ENTITY_TYPE, allocation_id, &existing, &updated)?,
        now,
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Commission owed to one employee over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionLine {
    /// Employee
    pub employee_id: i64,
    /// Billable amount they generated
    pub billable_amount: f64,
    /// Allocation percentage in force (0 when none)
    pub allocation_percentage: f64,
    /// Commission, rounded to cents
    pub commission: f64,
}

/// Computes commission lines from entries and allocations.
///
/// Only employees with billable revenue in `entries` appear.
#[must_use]
pub fn commission_lines<'a, I>(
    entries: I,
    allocations: &[employee_allocation::Model],
) -> Vec<CommissionLine>
where
    I: IntoIterator<Item = &'a crate::entities::time_entry::Model>,
{
    revenue_by_consultant(entries)
        .into_iter()
        .map(|(employee_id, billable_amount)| {
            let allocation_percentage = get_effective_allocation(allocations, employee_id)
                .map_or(0.0, |allocation| allocation.percentage);
            CommissionLine {
                employee_id,
                billable_amount,
                allocation_percentage,
                commission: round_to_cents(calculate_commission(
                    billable_amount,
                    allocation_percentage,
                )),
            }
        })
        .collect()
}

/// Loads the period's entries and every allocation, then computes commission per employee.
pub async fn generate_commission_report(
    db: &DatabaseConnection,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<CommissionLine>> {
    validate_date_range(start_date, end_date)?;
    let entries = list_time_entries(db, &AdminEntryFilter::date_range(start_date, end_date)).await?;
    let allocations = EmployeeAllocation::find().all(db).await?;
    Ok(commission_lines(&entries, &allocations))
}

/// Commission per employee keyed by id, for callers that only need the amounts.
#[must_use]
pub fn commission_by_employee(lines: &[CommissionLine]) -> BTreeMap<i64, f64> {
    lines
        .iter()
        .map(|line| (line.employee_id, line.commission))
        .collect()
}
