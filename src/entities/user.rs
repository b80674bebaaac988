//! User entity - Everyone who can sign in: employees who log time and administrators
//! who review, bill, and report.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role granted at account provisioning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Logs their own time
    #[sea_orm(string_value = "employee")]
    Employee,
    /// Reviews entries, manages rates, issues invoices
    #[sea_orm(string_value = "administrator")]
    Administrator,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login and notification address
    #[sea_orm(unique)]
    pub email: String,
    /// Employee or administrator
    pub role: UserRole,
    /// When the account was provisioned
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee owns many time entries
    #[sea_orm(has_many = "super::time_entry::Entity")]
    TimeEntries,
    /// One employee has a history of allocations
    #[sea_orm(has_many = "super::employee_allocation::Entity")]
    Allocations,
}

impl Related<super::time_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::employee_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
