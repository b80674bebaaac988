//! Audit log entity - Append-only record of who changed what.
//!
//! Rows are written once and never updated or deleted.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of change recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Record created; only `new_values` populated
    #[sea_orm(string_value = "create")]
    Create,
    /// Record changed; both sides populated with changed keys only
    #[sea_orm(string_value = "update")]
    Update,
    /// Record removed; only `old_values` populated
    #[sea_orm(string_value = "delete")]
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Audit log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who made the change
    pub user_id: i64,
    /// Kind of change
    pub action: AuditAction,
    /// Table-level name of the changed record, e.g. `"time_entry"`
    pub entity_type: String,
    /// Identifier of the changed record
    pub entity_id: i64,
    /// Values before the change
    pub old_values: Option<Json>,
    /// Values after the change
    pub new_values: Option<Json>,
    /// When the change happened
    pub timestamp: DateTimeUtc,
}

/// `AuditLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
