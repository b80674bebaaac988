//! Database configuration module for `TimeLedger`.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    AuditLog, BillingRule, Client, EmployeeAllocation, Invoice, InvoiceLineItem, Rate, Service,
    TimeEntry, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/timeledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table the core needs, parents before children.
///
/// Safe to call on an existing database: tables that already exist are left alone.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Client).await?;
    create_table(db, &schema, Service).await?;
    create_table(db, &schema, Rate).await?;
    create_table(db, &schema, TimeEntry).await?;
    create_table(db, &schema, EmployeeAllocation).await?;
    create_table(db, &schema, Invoice).await?;
    create_table(db, &schema, InvoiceLineItem).await?;
    create_table(db, &schema, BillingRule).await?;
    create_table(db, &schema, AuditLog).await?;

    debug!("Database tables ensured");
    Ok(())
}
