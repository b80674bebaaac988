//! Invoice line item entity - One billed unit, sourced from a time entry or
//! added by hand as an extra charge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Origin of a line item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum LineItemType {
    /// Copied from a billable time entry
    #[sea_orm(string_value = "time_entry")]
    TimeEntry,
    /// Free-form charge such as travel
    #[sea_orm(string_value = "additional_charge")]
    AdditionalCharge,
}

/// Invoice line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning invoice
    pub invoice_id: i64,
    /// Source entry; None for additional charges
    pub time_entry_id: Option<i64>,
    /// Text printed on the invoice
    pub description: String,
    /// Hours for time entries, 1 for additional charges
    pub quantity: f64,
    /// Unit price
    pub rate: f64,
    /// Line total
    pub amount: f64,
    /// Origin of the line
    pub item_type: LineItemType,
}

/// Defines relationships between `InvoiceLineItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
