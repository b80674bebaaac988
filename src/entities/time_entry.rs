//! Time entry entity - One block of logged work.
//!
//! `amount` is stored rather than derived on read so that invoices can snapshot it.
//! Owned by the employee who created it; client and service are lookup references.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a time entry. New entries start as `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Awaiting administrator review
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by an administrator
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected by an administrator
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl EntryStatus {
    /// Lowercase name used in storage and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee who logged (and owns) the entry
    pub employee_id: i64,
    /// Client the work was done for
    pub client_id: i64,
    /// Service category of the work
    pub service_id: i64,
    /// Day the work was performed
    pub activity_date: Date,
    /// Free-text description, printed on invoices
    pub memo: Option<String>,
    /// Hourly rate applied
    pub rate: f64,
    /// Hours worked, in (0, 24]
    pub duration: f64,
    /// Whether the time is chargeable to the client
    pub billable: bool,
    /// `rate * duration` rounded to cents when billable, otherwise 0
    pub amount: f64,
    /// Review status
    pub status: EntryStatus,
    /// When the entry was logged; starts the modification window
    pub created_at: DateTimeUtc,
    /// Last write to the entry
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `TimeEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry is owned by one employee
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::EmployeeId",
        to = "super::user::Column::Id"
    )]
    Employee,
    /// Each entry references one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// Each entry references one service
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
