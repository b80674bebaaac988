//! Shared test utilities for `TimeLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    core::{
        client, rate,
        service,
        time_entry::{self, NewTimeEntry, calculate_amount},
        user,
    },
    entities::{self, EntryStatus, UserRole},
    errors::Result,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed "current time" used across tests: 2026-03-31 12:00 UTC.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Builds an unsaved time entry for the pure filtering and aggregation tests.
///
/// # Defaults
/// * `service_id`: 1
/// * `rate`: 100.0
/// * `memo`: `"Entry {id}"`
/// * `status`: pending
/// * `created_at` / `updated_at`: [`test_now`]
#[must_use]
pub fn sample_entry(
    id: i64,
    employee_id: i64,
    client_id: i64,
    activity_date: NaiveDate,
    duration: f64,
    billable: bool,
) -> entities::time_entry::Model {
    let rate = 100.0;
    entities::time_entry::Model {
        id,
        employee_id,
        client_id,
        service_id: 1,
        activity_date,
        memo: Some(format!("Entry {id}")),
        rate,
        duration,
        billable,
        amount: calculate_amount(rate, duration, billable),
        status: EntryStatus::Pending,
        created_at: test_now(),
        updated_at: test_now(),
    }
}

/// A database with one of everything a time entry needs.
pub struct Fixture {
    /// In-memory database
    pub db: DatabaseConnection,
    /// Employee who logs time
    pub employee: entities::user::Model,
    /// Administrator who reviews and bills
    pub admin: entities::user::Model,
    /// Active client
    pub client: entities::client::Model,
    /// Active service with a default rate of 150
    pub service: entities::service::Model,
}

/// Sets up a complete test environment: one employee, one administrator, one
/// client, and one service with a default rate of 150 effective from 2026-01-01.
pub async fn setup_with_catalog() -> Result<Fixture> {
    let db = setup_test_db().await?;
    let employee = user::create_user(&db, "Ana Employee", "ana@firm.test", UserRole::Employee, test_now()).await?;
    let admin = user::create_user(&db, "Bo Admin", "bo@firm.test", UserRole::Administrator, test_now()).await?;
    let client = client::create_client(&db, "Acme", Some("ap@acme.test".to_string()), None).await?;
    let service = service::create_service(&db, "Consulting", None).await?;
    rate::create_rate(
        &db,
        rate::NewRate {
            service_id: service.id,
            employee_id: None,
            hourly_rate: 150.0,
            effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
        },
    )
    .await?;

    Ok(Fixture {
        db,
        employee,
        admin,
        client,
        service,
    })
}

/// Logs an entry for the fixture employee dated on [`test_now`]'s day.
///
/// A `None` rate resolves to the service's effective rate.
pub async fn create_test_entry(
    fixture: &Fixture,
    rate: Option<f64>,
    duration: f64,
    billable: bool,
) -> Result<entities::time_entry::Model> {
    time_entry::create_time_entry(
        &fixture.db,
        fixture.employee.id,
        NewTimeEntry {
            client_id: fixture.client.id,
            service_id: fixture.service.id,
            activity_date: test_now().date_naive(),
            memo: Some("Test work".to_string()),
            rate,
            duration,
            billable,
        },
        test_now(),
    )
    .await
}

/// Logs a billable entry on `activity_date` worth `amount` at a rate of 100.
pub async fn create_entry_on(
    fixture: &Fixture,
    activity_date: NaiveDate,
    amount: f64,
    now: DateTime<Utc>,
) -> Result<entities::time_entry::Model> {
    time_entry::create_time_entry(
        &fixture.db,
        fixture.employee.id,
        NewTimeEntry {
            client_id: fixture.client.id,
            service_id: fixture.service.id,
            activity_date,
            memo: None,
            rate: Some(100.0),
            duration: amount / 100.0,
            billable: true,
        },
        now,
    )
    .await
}
