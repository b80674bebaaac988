//! Spreadsheet export - Flattens time entries into rows and writes them as CSV.
//!
//! Ids are resolved to display names through an [`ExportLookup`]. The billable flag
//! is written as `Yes`/`No`, and a missing memo is written as an empty cell.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    core::{filter::AdminEntryFilter, time_entry::list_time_entries},
    entities::{Client, Service, User, client, service, time_entry, user},
    errors::{Error, Result},
};

/// One exported time entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Activity date
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Employee name
    #[serde(rename = "Employee")]
    pub employee: String,
    /// Client name
    #[serde(rename = "Client")]
    pub client: String,
    /// Service name
    #[serde(rename = "Service")]
    pub service: String,
    /// Free-text memo, empty when none was given
    #[serde(rename = "Memo")]
    pub memo: String,
    /// Duration in hours
    #[serde(rename = "Hours")]
    pub hours: f64,
    /// Hourly rate
    #[serde(rename = "Rate")]
    pub rate: f64,
    /// Billable flag
    #[serde(rename = "Billable", with = "yes_no")]
    pub billable: bool,
    /// Billed amount
    #[serde(rename = "Amount")]
    pub amount: f64,
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(true),
            "no" => Ok(false),
            other => Err(D::Error::custom(format!("expected Yes or No, got '{other}'"))),
        }
    }
}

/// Display names for the ids referenced by time entries.
#[derive(Debug, Clone, Default)]
pub struct ExportLookup {
    employees: HashMap<i64, String>,
    clients: HashMap<i64, String>,
    services: HashMap<i64, String>,
}

impl ExportLookup {
    /// Builds the lookup from directory records.
    #[must_use]
    pub fn new(users: &[user::Model], clients: &[client::Model], services: &[service::Model]) -> Self {
        Self {
            employees: users.iter().map(|u| (u.id, u.name.clone())).collect(),
            clients: clients.iter().map(|c| (c.id, c.name.clone())).collect(),
            services: services.iter().map(|s| (s.id, s.name.clone())).collect(),
        }
    }

    fn name(names: &HashMap<i64, String>, id: i64) -> String {
        names.get(&id).cloned().unwrap_or_else(|| format!("#{id}"))
    }
}

/// Converts entries into export rows, preserving order.
///
/// Ids missing from `lookup` are written as `#<id>`.
#[must_use]
pub fn flatten_entries<'a, I>(entries: I, lookup: &ExportLookup) -> Vec<ExportRow>
where
    I: IntoIterator<Item = &'a time_entry::Model>,
{
    entries
        .into_iter()
        .map(|entry| ExportRow {
            date: entry.activity_date,
            employee: ExportLookup::name(&lookup.employees, entry.employee_id),
            client: ExportLookup::name(&lookup.clients, entry.client_id),
            service: ExportLookup::name(&lookup.services, entry.service_id),
            memo: entry.memo.clone().unwrap_or_default(),
            hours: entry.duration,
            rate: entry.rate,
            billable: entry.billable,
            amount: entry.amount,
        })
        .collect()
}

/// Writes rows to a binary spreadsheet document and reads them back.
pub trait SpreadsheetExporter {
    /// Encodes `rows` as a document.
    fn export(&self, rows: &[ExportRow]) -> Result<Vec<u8>>;

    /// Decodes a document produced by [`SpreadsheetExporter::export`].
    fn parse(&self, document: &[u8]) -> Result<Vec<ExportRow>>;
}

/// [`SpreadsheetExporter`] producing comma-separated values with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl SpreadsheetExporter for CsvExporter {
    fn export(&self, rows: &[ExportRow]) -> Result<Vec<u8>> {
        export_rows(rows)
    }

    fn parse(&self, document: &[u8]) -> Result<Vec<ExportRow>> {
        parse_entries(document)
    }
}

/// Serializes rows as CSV.
pub fn export_rows(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| Error::Io(err.into_error()))
}

/// Parses CSV produced by [`export_rows`].
pub fn parse_entries(document: &[u8]) -> Result<Vec<ExportRow>> {
    csv::Reader::from_reader(document)
        .deserialize()
        .collect::<std::result::Result<Vec<ExportRow>, _>>()
        .map_err(Into::into)
}

/// Loads the entries matching `filter`, resolves names, and encodes them with `exporter`.
pub async fn export_time_entries<E>(
    db: &DatabaseConnection,
    filter: &AdminEntryFilter,
    exporter: &E,
) -> Result<Vec<u8>>
where
    E: SpreadsheetExporter + Sync,
{
    let entries = list_time_entries(db, filter).await?;
    let users = User::find().all(db).await?;
    let clients = Client::find().all(db).await?;
    let services = Service::find().all(db).await?;

    let rows = flatten_entries(&entries, &ExportLookup::new(&users, &clients, &services));
    let document = exporter.export(&rows)?;
    info!("Exported {} time entries ({} bytes)", rows.len(), document.len());
    Ok(document)
}
