//! Employee allocation entity - The share of billable revenue credited to an
//! employee as commission. The row with the latest `effective_from` wins.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee allocation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_allocations")]
pub struct Model {
    /// Unique identifier for the allocation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee the allocation applies to
    pub employee_id: i64,
    /// Commission percentage in [0, 100]
    pub percentage: f64,
    /// Date from which this allocation applies
    pub effective_from: Date,
}

/// Defines relationships between `EmployeeAllocation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each allocation belongs to one employee
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::EmployeeId",
        to = "super::user::Column::Id"
    )]
    Employee,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
