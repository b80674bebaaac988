//! Rate entity - Hourly rate for a service, either the service default
//! (`employee_id` is `None`) or an override for one employee.
//!
//! Rows are appended rather than edited; `effective_from` orders the history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rate database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rates")]
pub struct Model {
    /// Unique identifier for the rate
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Service this rate prices
    pub service_id: i64,
    /// Employee override, or None for the service default
    pub employee_id: Option<i64>,
    /// Hourly rate in the company currency
    pub hourly_rate: f64,
    /// Date from which this rate applies
    pub effective_from: Date,
}

/// Defines relationships between Rate and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rate prices one service
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
