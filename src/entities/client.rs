//! Client entity - The billing counterparty for time entries and invoices.
//!
//! Clients are never hard-deleted; deactivation keeps historical invoice references intact.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client name as printed on invoices
    pub name: String,
    /// Billing contact address
    pub email: Option<String>,
    /// Postal address for invoice documents
    pub address: Option<String>,
    /// Inactive clients are hidden from pickers but keep their history
    pub is_active: bool,
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client has many time entries
    #[sea_orm(has_many = "super::time_entry::Entity")]
    TimeEntries,
    /// One client has many invoices
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::time_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
